use crate::alloc::Rebind;
use crate::error::TryReserveError;
use allocator_api2::alloc::Allocator;
use std::ptr::{self, NonNull};
use std::slice;

/// A block of the list: storage for up to `N` elements and the links to
/// its neighbours.
///
/// The live elements always occupy `data[..len]`. Apart from the ghost
/// node, a node linked into a list holds `1..=N` elements.
pub(crate) struct Node<T, const N: usize> {
    pub(crate) next: NonNull<Node<T, N>>,
    pub(crate) prev: NonNull<Node<T, N>>,
    pub(crate) len: usize,
    pub(crate) data: NonNull<T>,
}

impl<T, const N: usize> Node<T, N> {
    /// Create the ghost node of a list: no storage, linked to itself.
    ///
    /// The ghost is the only node not acquired through the list's allocator.
    pub(crate) fn new_ghost() -> NonNull<Self> {
        let ghost = NonNull::from(Box::leak(Box::new(Node {
            next: NonNull::dangling(),
            prev: NonNull::dangling(),
            len: 0,
            data: NonNull::dangling(),
        })));
        // SAFETY: `ghost` was just leaked from a box, so it is valid and unique.
        unsafe {
            (*ghost.as_ptr()).next = ghost;
            (*ghost.as_ptr()).prev = ghost;
        }
        ghost
    }

    /// Free a ghost node created by [`Node::new_ghost`].
    ///
    /// # Safety
    ///
    /// `ghost` must come from [`Node::new_ghost`] and must not be used again.
    pub(crate) unsafe fn free_ghost(ghost: NonNull<Self>) {
        drop(Box::from_raw(ghost.as_ptr()));
    }

    /// Acquire an empty, detached node: the record first, then its element
    /// storage.
    ///
    /// Both are acquired or neither is: if the storage cannot be allocated,
    /// the record is returned to the allocator before the error propagates.
    /// The links of the returned node are dangling.
    pub(crate) fn allocate<A: Allocator>(alloc: &A) -> Result<NonNull<Self>, TryReserveError> {
        let records = Rebind::<Self, A>::new(alloc);
        let elements = Rebind::<T, A>::new(alloc);

        let record = records.allocate(1)?;
        let data = match elements.allocate(N) {
            Ok(data) => data,
            Err(err) => {
                // SAFETY: `record` was allocated above and holds no value.
                unsafe { records.deallocate(record, 1) };
                return Err(err);
            }
        };
        // SAFETY: `record` is freshly allocated for exactly one node.
        unsafe {
            records.construct(
                record,
                Node {
                    next: NonNull::dangling(),
                    prev: NonNull::dangling(),
                    len: 0,
                    data,
                },
            );
        }
        Ok(record)
    }

    /// Release a detached node: drop its live elements, then free its
    /// storage, then its record.
    ///
    /// Storage and record are freed even if an element destructor panics.
    ///
    /// # Safety
    ///
    /// `node` must come from [`Node::allocate`] on an allocator equal to
    /// `alloc`, must be unlinked from every list, and must not be used again.
    pub(crate) unsafe fn release<A: Allocator>(node: NonNull<Self>, alloc: &A) {
        struct Free<'a, T, const N: usize, A: Allocator> {
            node: NonNull<Node<T, N>>,
            alloc: &'a A,
        }

        impl<T, const N: usize, A: Allocator> Drop for Free<'_, T, N, A> {
            fn drop(&mut self) {
                // SAFETY: guaranteed by the caller of `release`.
                unsafe {
                    let data = self.node.as_ref().data;
                    Rebind::<T, A>::new(self.alloc).deallocate(data, N);
                    Rebind::<Node<T, N>, A>::new(self.alloc).deallocate(self.node, 1);
                }
            }
        }

        let free = Free { node, alloc };
        let Node { data, len, .. } = *node.as_ptr();
        (*node.as_ptr()).len = 0;
        Rebind::<T, A>::new(alloc).destroy(data, len);
        drop(free);
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.len == N
    }

    /// Pointer to slot `index` of the storage.
    #[inline]
    pub(crate) unsafe fn slot(&self, index: usize) -> *mut T {
        debug_assert!(index < N);
        self.data.as_ptr().add(index)
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[T] {
        // SAFETY: `data[..len]` always holds live elements.
        unsafe { slice::from_raw_parts(self.data.as_ptr(), self.len) }
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: `data[..len]` always holds live elements.
        unsafe { slice::from_raw_parts_mut(self.data.as_ptr(), self.len) }
    }

    /// Append `value` after the last live element.
    ///
    /// # Safety
    ///
    /// The node must not be full.
    #[inline]
    pub(crate) unsafe fn push(&mut self, value: T) {
        debug_assert!(!self.is_full());
        ptr::write(self.slot(self.len), value);
        self.len += 1;
    }

    /// Remove the last live element.
    ///
    /// # Safety
    ///
    /// The node must not be empty.
    #[inline]
    pub(crate) unsafe fn pop(&mut self) -> T {
        debug_assert!(self.len > 0);
        self.len -= 1;
        ptr::read(self.slot(self.len))
    }

    /// Write `value` at `index`, relocating `data[index..len]` one slot to
    /// the right.
    ///
    /// # Safety
    ///
    /// The node must not be full, and `index <= len`.
    pub(crate) unsafe fn insert(&mut self, index: usize, value: T) {
        debug_assert!(!self.is_full());
        debug_assert!(index <= self.len);
        let hole = self.data.as_ptr().add(index);
        ptr::copy(hole, hole.add(1), self.len - index);
        ptr::write(hole, value);
        self.len += 1;
    }

    /// Take the element at `index`, relocating `data[index + 1..len]` one
    /// slot to the left.
    ///
    /// # Safety
    ///
    /// `index < len`.
    pub(crate) unsafe fn remove(&mut self, index: usize) -> T {
        debug_assert!(index < self.len);
        let hole = self.data.as_ptr().add(index);
        let value = ptr::read(hole);
        ptr::copy(hole.add(1), hole, self.len - index - 1);
        self.len -= 1;
        value
    }
}
