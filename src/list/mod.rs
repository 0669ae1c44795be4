use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::mem;
use std::ops::Range;
use std::ptr::NonNull;

use allocator_api2::alloc::{Allocator, Global};

use crate::alloc::Rebind;
use crate::error::{infallible, TryReserveError};
use crate::list::cursor::{Cursor, CursorMut};
use crate::list::node::Node;
use crate::{Chunks, IntoIter, Iter, IterMut};

pub mod cursor;
pub mod iterator;

mod algorithms;
pub(crate) mod node;

/// The `UnrolledList` is a doubly-linked list of fixed-capacity blocks
/// ("nodes"), each holding up to `N` elements in contiguous storage.
///
/// Pushing and popping at either end is amortized *O*(1); inserting or
/// removing at a cursor costs *O*(`N`) for shifting elements inside one node.
/// There is no constant-time indexing: positions are reached by walking the
/// chain, which costs *O*(number of nodes crossed).
///
/// The `UnrolledList` contains:
/// - a pointer `ghost` to the ghost node, whose `next` is the first node and
///   whose `prev` is the last node (or the ghost itself when the list is
///   empty);
/// - a length field `len`, the total number of elements in all nodes;
/// - the allocator `alloc`, used both for node records and for element
///   storage.
///
/// # Type parameters
///
/// - `T`: the element type;
/// - `N`: the node capacity, the maximum number of elements per node. It must
///   be at least 1, which is checked at compile time;
/// - `A`: the allocator, [`Global`] by default.
///
/// # Naming Conventions
///
/// - `node`: a pointer to a node of the chain, possibly the ghost node;
/// - `offset`: the position of an element inside its node;
/// - `at`: the position of an element in the whole list.
pub struct UnrolledList<T, const N: usize = 10, A: Allocator = Global> {
    ghost: NonNull<Node<T, N>>,
    /// the number of elements in the list
    pub(crate) len: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

// private methods
impl<T, const N: usize, A: Allocator> UnrolledList<T, N, A> {
    const NODE_CAPACITY: usize = {
        assert!(N > 0, "the node capacity of an `UnrolledList` must be at least 1");
        N
    };

    pub(crate) fn ghost_node(&self) -> NonNull<Node<T, N>> {
        self.ghost
    }
    pub(crate) fn front_node(&self) -> NonNull<Node<T, N>> {
        // SAFETY: `ghost.next` is always valid (either `ghost` itself, or the first node
        // of the list).
        unsafe { self.ghost.as_ref().next }
    }
    pub(crate) fn back_node(&self) -> NonNull<Node<T, N>> {
        // SAFETY: `ghost.prev` is always valid (either `ghost` itself, or the last node
        // of the list).
        unsafe { self.ghost.as_ref().prev }
    }

    unsafe fn connect(&mut self, mut prev: NonNull<Node<T, N>>, mut next: NonNull<Node<T, N>>) {
        prev.as_mut().next = next;
        next.as_mut().prev = prev;
    }

    /// Attach a detached node `node` to the chain, between `prev` and `next`.
    ///
    /// It is unsafe because it does not check whether `prev` and `next` belong
    /// to the list, or whether they are adjacent (only in `#[cfg(debug_assertions)]`).
    ///
    /// The element count of the list is not touched: the caller accounts for
    /// the elements of `node`.
    unsafe fn attach_node(
        &mut self,
        prev: NonNull<Node<T, N>>,
        next: NonNull<Node<T, N>>,
        node: NonNull<Node<T, N>>,
    ) {
        #[cfg(debug_assertions)]
        assert_adjacent(prev, next);
        self.connect(prev, node);
        self.connect(node, next);
    }

    /// Unlink `node` from the chain and release it, if it has no element left.
    ///
    /// It is unsafe because it does not check whether `node` belongs to the list.
    unsafe fn prune(&mut self, node: NonNull<Node<T, N>>) {
        debug_assert!(node != self.ghost);
        if node.as_ref().len == 0 {
            self.connect(node.as_ref().prev, node.as_ref().next);
            Node::release(node, &self.alloc);
        }
    }

    /// Unlink `node` from the chain and release it with all its elements.
    ///
    /// It is unsafe because it does not check whether `node` belongs to the list.
    pub(crate) unsafe fn remove_node(&mut self, node: NonNull<Node<T, N>>) {
        debug_assert!(node != self.ghost);
        self.connect(node.as_ref().prev, node.as_ref().next);
        self.len -= node.as_ref().len;
        Node::release(node, &self.alloc);
    }

    /// Insert `item` before the element at `offset` of `node` (or at the back
    /// if `node` is the ghost), and return where the item lands.
    ///
    /// If the target node is full, it is split: a new node is attached right
    /// after it and receives the target's last element, which makes room for
    /// the shift.
    ///
    /// The only failure is the allocation of a new node, which happens before
    /// anything is touched.
    ///
    /// It is unsafe because it does not check whether `node` belongs to the list,
    /// or whether `offset` is a valid position in it.
    pub(crate) unsafe fn insert_at(
        &mut self,
        node: NonNull<Node<T, N>>,
        offset: usize,
        item: T,
    ) -> Result<(NonNull<Node<T, N>>, usize), TryReserveError> {
        if node == self.ghost {
            self.try_push_back(item)?;
            let back = self.back_node();
            return Ok((back, back.as_ref().len - 1));
        }
        debug_assert!(offset < node.as_ref().len);
        if node.as_ref().is_full() {
            let split = Node::allocate(&self.alloc)?;
            self.attach_node(node, node.as_ref().next, split);
            (*split.as_ptr()).push((*node.as_ptr()).pop());
        }
        (*node.as_ptr()).insert(offset, item);
        self.len += 1;
        Ok((node, offset))
    }

    /// Take the element at `offset` of `node`, and return it together with
    /// the position of the element that followed it (the ghost node if it was
    /// the last one).
    ///
    /// A node left without elements is pruned.
    ///
    /// It is unsafe because it does not check whether `node` belongs to the list,
    /// or whether `offset` is a valid position in it.
    pub(crate) unsafe fn remove_at(
        &mut self,
        node: NonNull<Node<T, N>>,
        offset: usize,
    ) -> (T, NonNull<Node<T, N>>, usize) {
        debug_assert!(node != self.ghost);
        let item = (*node.as_ptr()).remove(offset);
        self.len -= 1;
        let next = node.as_ref().next;
        if offset < node.as_ref().len {
            return (item, node, offset);
        }
        self.prune(node);
        (item, next, 0)
    }

    /// Gather the elements of every node strictly between `before` and
    /// `after` into the first of them, releasing the others, and return
    /// that node (or `after` if there is none).
    ///
    /// It is unsafe because it does not check whether `before` and `after`
    /// belong to the list, or whether the elements between them fit in a
    /// single node.
    pub(crate) unsafe fn rejoin(
        &mut self,
        before: NonNull<Node<T, N>>,
        after: NonNull<Node<T, N>>,
    ) -> NonNull<Node<T, N>> {
        let first = before.as_ref().next;
        if first == after {
            return first;
        }
        let mut node = first.as_ref().next;
        while node != after {
            let next = node.as_ref().next;
            let moved = node.as_ref().len;
            debug_assert!(first.as_ref().len + moved <= N);
            std::ptr::copy_nonoverlapping(
                node.as_ref().data.as_ptr(),
                first.as_ref().slot(first.as_ref().len),
                moved,
            );
            (*first.as_ptr()).len += moved;
            (*node.as_ptr()).len = 0;
            self.prune(node);
            node = next;
        }
        first
    }
}

impl<T, const N: usize> UnrolledList<T, N> {
    /// Create an empty `UnrolledList`.
    ///
    /// The ghost node is boxed right away; no other node is allocated until
    /// the first element is inserted.
    ///
    /// # Examples
    /// ```
    /// use unrolled_list::UnrolledList;
    /// let list: UnrolledList<u32> = UnrolledList::new();
    /// assert!(list.is_empty());
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// Create an `UnrolledList` holding `n` clones of `value`.
    ///
    /// The nodes are filled to capacity in order; only the last one may hold
    /// fewer than `N` elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list = UnrolledList::<_, 4>::from_elem('x', 6);
    /// assert_eq!(list.len(), 6);
    /// assert_eq!(list.chunks().map(<[char]>::len).collect::<Vec<_>>(), vec![4, 2]);
    /// ```
    pub fn from_elem(value: T, n: usize) -> Self
    where
        T: Clone,
    {
        Self::from_elem_in(value, n, Global)
    }
}

impl<T, const N: usize, A: Allocator> UnrolledList<T, N, A> {
    /// Create an empty `UnrolledList` that acquires its nodes from `alloc`.
    ///
    /// Only the ghost node is allocated here, and it is boxed on the global
    /// heap rather than taken from `alloc`.
    ///
    /// # Examples
    /// ```
    /// use unrolled_list::{Global, UnrolledList};
    /// let list: UnrolledList<u32, 16, Global> = UnrolledList::new_in(Global);
    /// assert!(list.is_empty());
    /// ```
    pub fn new_in(alloc: A) -> Self {
        let _ = Self::NODE_CAPACITY;
        Self {
            ghost: Node::new_ghost(),
            len: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    /// Like [`UnrolledList::from_elem`], but with the given allocator.
    pub fn from_elem_in(value: T, n: usize, alloc: A) -> Self
    where
        T: Clone,
    {
        infallible(Self::try_from_elem_in(value, n, alloc))
    }

    /// Like [`UnrolledList::from_elem_in`], but return an error if the
    /// allocator fails.
    ///
    /// On failure, every node and element built so far is released before
    /// the error is returned.
    pub fn try_from_elem_in(value: T, n: usize, alloc: A) -> Result<Self, TryReserveError>
    where
        T: Clone,
    {
        let mut list = Self::new_in(alloc);
        if n > 0 {
            list.try_extend(std::iter::repeat(value).take(n))?;
        }
        Ok(list)
    }

    /// Create an `UnrolledList` from the items of `iter`, in order, acquiring
    /// the nodes from `alloc`.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::{Global, UnrolledList};
    ///
    /// let list = UnrolledList::<_, 3>::from_iter_in(1..=5, Global);
    /// assert_eq!(list.chunks().collect::<Vec<_>>(), vec![&[1, 2, 3][..], &[4, 5][..]]);
    /// ```
    pub fn from_iter_in<I: IntoIterator<Item = T>>(iter: I, alloc: A) -> Self {
        infallible(Self::try_from_iter_in(iter, alloc))
    }

    /// Like [`UnrolledList::from_iter_in`], but return an error if the
    /// allocator fails.
    ///
    /// On failure (or if `iter` panics), every node and element built so far
    /// is released.
    pub fn try_from_iter_in<I: IntoIterator<Item = T>>(
        iter: I,
        alloc: A,
    ) -> Result<Self, TryReserveError> {
        let mut list = Self::new_in(alloc);
        list.try_extend(iter)?;
        Ok(list)
    }

    /// Returns a reference to the allocator of the list.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns `true` if both lists acquire memory from equal allocators.
    #[inline]
    pub fn same_allocator(&self, other: &Self) -> bool
    where
        A: PartialEq,
    {
        self.alloc == other.alloc
    }

    /// Returns `true` if the `UnrolledList` is empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<&str> = UnrolledList::new();
    /// assert!(list.is_empty());
    ///
    /// list.push_front("foo");
    /// assert!(!list.is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.front_node() == self.ghost_node()
    }

    /// Returns the number of elements in the `UnrolledList`.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32> = UnrolledList::new();
    ///
    /// list.push_front(2);
    /// assert_eq!(list.len(), 1);
    ///
    /// list.push_back(3);
    /// assert_eq!(list.len(), 2);
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the largest number of elements the list could ever hold,
    /// bounded by how many node records the address space can describe.
    pub fn max_len(&self) -> usize {
        Rebind::<Node<T, N>, A>::max_count().saturating_mul(N)
    }

    /// Returns the number of nodes currently in the chain.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n* / `N`) time at best.
    pub fn node_count(&self) -> usize {
        self.chunks().count()
    }

    /// Removes all elements from the `UnrolledList`, releasing every node.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 2> = UnrolledList::from([1, 2, 3]);
    /// list.clear();
    /// assert_eq!(list.len(), 0);
    /// assert_eq!(list.node_count(), 0);
    /// assert_eq!(list.front(), None);
    /// ```
    pub fn clear(&mut self) {
        /// Releases a detached chain of nodes, from `node` up to `ghost`.
        struct Release<'a, T, const N: usize, A: Allocator> {
            node: NonNull<Node<T, N>>,
            ghost: NonNull<Node<T, N>>,
            alloc: &'a A,
        }

        impl<T, const N: usize, A: Allocator> Release<'_, T, N, A> {
            fn release_all(&mut self) {
                while self.node != self.ghost {
                    // SAFETY: `node` is one of the detached nodes, visited once.
                    unsafe {
                        let node = self.node;
                        self.node = node.as_ref().next;
                        Node::release(node, self.alloc);
                    }
                }
            }
        }

        impl<T, const N: usize, A: Allocator> Drop for Release<'_, T, N, A> {
            fn drop(&mut self) {
                // Only reached with nodes left if an element destructor
                // panicked; a second panic aborts.
                self.release_all();
            }
        }

        let ghost = self.ghost;
        let node = self.front_node();
        // Detach the whole chain first, so that the list is already empty if
        // an element destructor panics.
        unsafe { self.connect(ghost, ghost) };
        self.len = 0;
        Release {
            node,
            ghost,
            alloc: &self.alloc,
        }
        .release_all();
    }

    /// Shortens the list, keeping the first `len` elements and dropping the
    /// rest. Has no effect if `len` is not less than the current length.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 2> = UnrolledList::from([1, 2, 3, 4, 5]);
    /// list.truncate(3);
    /// assert_eq!(list, UnrolledList::from([1, 2, 3]));
    /// assert_eq!(list.node_count(), 2);
    /// ```
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.remove_range(len..self.len);
        }
    }

    /// Provides a reference to the front element, or `None` if the list is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32> = UnrolledList::new();
    /// assert_eq!(list.front(), None);
    ///
    /// list.push_front(1);
    /// assert_eq!(list.front(), Some(&1));
    /// ```
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.iter().next()
    }

    /// Provides a mutable reference to the front element, or `None` if the list
    /// is empty.
    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.iter_mut().next()
    }

    /// Provides a reference to the back element, or `None` if the list is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32> = UnrolledList::new();
    /// assert_eq!(list.back(), None);
    ///
    /// list.push_back(1);
    /// assert_eq!(list.back(), Some(&1));
    /// ```
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.iter().next_back()
    }

    /// Provides a mutable reference to the back element, or `None` if the list
    /// is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32> = UnrolledList::from([1, 2]);
    /// if let Some(x) = list.back_mut() {
    ///     *x = 5;
    /// }
    /// assert_eq!(list.back(), Some(&5));
    /// ```
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.iter_mut().next_back()
    }

    /// Adds an element first in the list.
    ///
    /// If the first node has room, its elements are shifted one slot to make
    /// room at the front; otherwise a new node is attached before it.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(`N`) time.
    ///
    /// # Panics
    ///
    /// Panics (or aborts, see [`std::alloc::handle_alloc_error`]) if a new node
    /// cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32> = UnrolledList::new();
    ///
    /// list.push_front(2);
    /// assert_eq!(list.front().unwrap(), &2);
    ///
    /// list.push_front(1);
    /// assert_eq!(list.front().unwrap(), &1);
    /// ```
    pub fn push_front(&mut self, elt: T) {
        infallible(self.try_push_front(elt))
    }

    /// Like [`UnrolledList::push_front`], but return an error if a new node
    /// cannot be allocated. The list is left untouched on failure, and `elt`
    /// is dropped.
    pub fn try_push_front(&mut self, elt: T) -> Result<(), TryReserveError> {
        let ghost = self.ghost;
        let front = self.front_node();
        // SAFETY: `front` is either the ghost or a valid node of the list.
        unsafe {
            if front != ghost && !front.as_ref().is_full() {
                (*front.as_ptr()).insert(0, elt);
            } else {
                let node = Node::allocate(&self.alloc)?;
                (*node.as_ptr()).push(elt);
                self.attach_node(ghost, front, node);
            }
        }
        self.len += 1;
        Ok(())
    }

    /// Removes the first element and returns it, or `None` if the list is
    /// empty.
    ///
    /// The remaining elements of the first node are shifted one slot to the
    /// left; the node is released if it becomes empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(`N`) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32> = UnrolledList::new();
    /// assert_eq!(list.pop_front(), None);
    ///
    /// list.push_front(1);
    /// list.push_front(3);
    /// assert_eq!(list.pop_front(), Some(3));
    /// assert_eq!(list.pop_front(), Some(1));
    /// assert_eq!(list.pop_front(), None);
    /// ```
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the list is not empty, so the first node holds an element.
        let (item, _, _) = unsafe { self.remove_at(self.front_node(), 0) };
        Some(item)
    }

    /// Appends an element to the back of a list.
    ///
    /// If the last node is full, a new node is attached after it.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Panics
    ///
    /// Panics (or aborts, see [`std::alloc::handle_alloc_error`]) if a new node
    /// cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32> = UnrolledList::new();
    /// list.push_back(1);
    /// list.push_back(3);
    /// assert_eq!(list.back().unwrap(), &3);
    /// ```
    pub fn push_back(&mut self, elt: T) {
        infallible(self.try_push_back(elt))
    }

    /// Like [`UnrolledList::push_back`], but return an error if a new node
    /// cannot be allocated. The list is left untouched on failure, and `elt`
    /// is dropped.
    pub fn try_push_back(&mut self, elt: T) -> Result<(), TryReserveError> {
        let ghost = self.ghost;
        let back = self.back_node();
        // SAFETY: `back` is either the ghost or a valid node of the list.
        unsafe {
            if back != ghost && !back.as_ref().is_full() {
                (*back.as_ptr()).push(elt);
            } else {
                let node = Node::allocate(&self.alloc)?;
                (*node.as_ptr()).push(elt);
                self.attach_node(back, ghost, node);
            }
        }
        self.len += 1;
        Ok(())
    }

    /// Removes the last element from a list and returns it, or `None` if
    /// it is empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32> = UnrolledList::new();
    /// assert_eq!(list.pop_back(), None);
    /// list.push_back(1);
    /// list.push_back(3);
    /// assert_eq!(list.pop_back(), Some(3));
    /// ```
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let back = self.back_node();
        // SAFETY: the list is not empty, so the last node holds an element.
        unsafe {
            let item = (*back.as_ptr()).pop();
            self.len -= 1;
            self.prune(back);
            Some(item)
        }
    }

    /// Provides a cursor at the element with given index.
    ///
    /// By convention, the cursor is at the end position if `at == len`.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list: UnrolledList<i32, 2> = UnrolledList::from([1, 2, 3]);
    /// assert_eq!(list.cursor(2).current(), Some(&3));
    /// assert_eq!(list.cursor(3).current(), None);
    /// ```
    pub fn cursor(&self, at: usize) -> Cursor<'_, T, N, A> {
        assert!(at <= self.len, "Cannot create cursor at a nonexistent index");
        let mut cursor = self.cursor_start();
        cursor
            .seek_to(at)
            .expect("Cannot create cursor at a nonexistent index");
        cursor
    }

    /// Provides a cursor at the first element (`begin`).
    ///
    /// The cursor is at the end position if the list is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let empty: UnrolledList<i32> = UnrolledList::new();
    /// assert_eq!(empty.cursor_start(), empty.cursor_end());
    ///
    /// let list: UnrolledList<i32> = UnrolledList::from([1, 2, 3]);
    /// assert_eq!(list.cursor_start().current(), Some(&1));
    /// ```
    pub fn cursor_start(&self) -> Cursor<'_, T, N, A> {
        Cursor::new(self, self.front_node(), 0, 0)
    }

    /// Provides a cursor at the end position (`end`), one past the last
    /// element.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list: UnrolledList<i32> = UnrolledList::from([1, 2, 3]);
    /// let cursor = list.cursor_end();
    /// assert_eq!(cursor.current(), None);
    /// assert_eq!(cursor.previous(), Some(&3));
    /// ```
    pub fn cursor_end(&self) -> Cursor<'_, T, N, A> {
        Cursor::new(self, self.ghost_node(), 0, self.len)
    }

    /// Provides a cursor with editing operations at the element with given
    /// index.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`
    pub fn cursor_mut(&mut self, at: usize) -> CursorMut<'_, T, N, A> {
        assert!(at <= self.len, "Cannot create cursor at a nonexistent index");
        let mut cursor = self.cursor_start_mut();
        cursor
            .seek_to(at)
            .expect("Cannot create cursor at a nonexistent index");
        cursor
    }

    /// Provides a cursor with editing operations at the first element.
    pub fn cursor_start_mut(&mut self) -> CursorMut<'_, T, N, A> {
        let front = self.front_node();
        CursorMut::new(self, front, 0, 0)
    }

    /// Provides a cursor with editing operations at the end position.
    pub fn cursor_end_mut(&mut self) -> CursorMut<'_, T, N, A> {
        let (ghost, len) = (self.ghost_node(), self.len);
        CursorMut::new(self, ghost, 0, len)
    }

    /// Provides a double-ended iterator over the elements; reverse iteration
    /// is `iter().rev()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list: UnrolledList<i32, 2> = UnrolledList::from([0, 1, 2]);
    ///
    /// let mut iter = list.iter();
    /// assert_eq!(iter.next(), Some(&0));
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next(), Some(&2));
    /// assert_eq!(iter.next(), None);
    ///
    /// assert_eq!(list.iter().rev().collect::<Vec<_>>(), vec![&2, &1, &0]);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, T, N> {
        Iter::new(self)
    }

    /// Provides a double-ended iterator with mutable references.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 2> = UnrolledList::from([0, 1, 2]);
    /// for element in list.iter_mut() {
    ///     *element += 10;
    /// }
    /// assert_eq!(list, UnrolledList::from([10, 11, 12]));
    /// ```
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T, N> {
        IterMut::new(self)
    }

    /// Provides an iterator over the nodes of the list, each seen as the
    /// slice of its live elements, in chain order.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 5> = UnrolledList::new();
    /// list.extend(0..11);
    /// let lens: Vec<usize> = list.chunks().map(<[i32]>::len).collect();
    /// assert_eq!(lens, vec![5, 5, 1]);
    /// ```
    #[inline]
    pub fn chunks(&self) -> Chunks<'_, T, N> {
        Chunks::new(self)
    }

    /// Adds an element at the given index in the list.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(`at` + `N`) time.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 2> = UnrolledList::from([1, 2, 3]);
    ///
    /// list.insert(2, 4);
    /// list.insert(4, 5);
    ///
    /// assert_eq!(list, UnrolledList::from([1, 2, 4, 3, 5]));
    /// ```
    pub fn insert(&mut self, at: usize, elt: T) {
        assert!(
            at <= self.len,
            "Cannot insert at an index outside of the list bounds"
        );
        self.cursor_mut(at).insert(elt);
    }

    /// Like [`UnrolledList::insert`], but return an error if a new node
    /// cannot be allocated. The list is left untouched on failure.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`
    pub fn try_insert(&mut self, at: usize, elt: T) -> Result<(), TryReserveError> {
        assert!(
            at <= self.len,
            "Cannot insert at an index outside of the list bounds"
        );
        self.cursor_mut(at).try_insert(elt)
    }

    /// Inserts `n` clones of `value` at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 2> = UnrolledList::from([1, 2]);
    /// list.insert_n(1, 3, 0);
    /// assert_eq!(list, UnrolledList::from([1, 0, 0, 0, 2]));
    /// ```
    pub fn insert_n(&mut self, at: usize, n: usize, value: T)
    where
        T: Clone,
    {
        assert!(
            at <= self.len,
            "Cannot insert at an index outside of the list bounds"
        );
        self.cursor_mut(at).insert_n(n, value);
    }

    /// Inserts the items of `iter` at the given index, keeping their order.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 2> = UnrolledList::from([1, 5]);
    /// list.insert_iter(1, 2..5);
    /// assert_eq!(list, UnrolledList::from([1, 2, 3, 4, 5]));
    /// ```
    pub fn insert_iter<I: IntoIterator<Item = T>>(&mut self, at: usize, iter: I) {
        assert!(
            at <= self.len,
            "Cannot insert at an index outside of the list bounds"
        );
        self.cursor_mut(at).insert_iter(iter);
    }

    /// Removes the element at the given index and returns it.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(`at` + `N`) time.
    ///
    /// # Panics
    ///
    /// Panics if `at >= len`
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 2> = UnrolledList::from([3, 2, 1]);
    ///
    /// assert_eq!(list.remove(1), 2);
    /// assert_eq!(list.remove(0), 3);
    /// assert_eq!(list.remove(0), 1);
    /// ```
    pub fn remove(&mut self, at: usize) -> T {
        assert!(
            at < self.len,
            "Cannot remove at an index outside of the list bounds"
        );
        self.cursor_mut(at)
            .remove()
            .expect("Cannot remove at an index outside of the list bounds")
    }

    /// Removes the elements in the given range of indices.
    ///
    /// # Panics
    ///
    /// Panics if the range is decreasing or ends after `len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 3> = (0..10).collect();
    /// list.remove_range(2..8);
    /// assert_eq!(list, UnrolledList::from([0, 1, 8, 9]));
    /// ```
    pub fn remove_range(&mut self, range: Range<usize>) {
        assert!(
            range.start <= range.end && range.end <= self.len,
            "Cannot remove a range outside of the list bounds"
        );
        self.cursor_mut(range.start).remove_n(range.end - range.start);
    }

    /// Swaps the contents (and allocators) of two lists in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut a: UnrolledList<i32> = UnrolledList::from([1, 2]);
    /// let mut b: UnrolledList<i32> = UnrolledList::from([3]);
    /// a.swap(&mut b);
    /// assert_eq!(a, UnrolledList::from([3]));
    /// assert_eq!(b, UnrolledList::from([1, 2]));
    /// ```
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }
}

impl<T: Debug, const N: usize, A: Allocator> Debug for UnrolledList<T, N, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, const N: usize> Default for UnrolledList<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(debug_assertions)]
fn assert_adjacent<T, const N: usize>(prev: NonNull<Node<T, N>>, next: NonNull<Node<T, N>>) {
    unsafe {
        assert_eq!(prev.as_ref().next, next);
        assert_eq!(next.as_ref().prev, prev);
    }
}

impl<T, const N: usize, A: Allocator> Drop for UnrolledList<T, N, A> {
    fn drop(&mut self) {
        struct FreeGhost<T, const N: usize>(NonNull<Node<T, N>>);

        impl<T, const N: usize> Drop for FreeGhost<T, N> {
            fn drop(&mut self) {
                // SAFETY: the ghost belongs to the list being dropped.
                unsafe { Node::free_ghost(self.0) }
            }
        }

        let _ghost = FreeGhost(self.ghost);
        self.clear();
    }
}

unsafe impl<T: Send, const N: usize, A: Allocator + Send> Send for UnrolledList<T, N, A> {}

unsafe impl<T: Sync, const N: usize, A: Allocator + Sync> Sync for UnrolledList<T, N, A> {}

// Ensure that `UnrolledList` and its read-only iterators are covariant in their type parameters.
#[allow(dead_code)]
fn assert_covariance() {
    fn a<'a>(x: UnrolledList<&'static str>) -> UnrolledList<&'a str> {
        x
    }
    fn b<'i, 'a>(x: Iter<'i, &'static str, 4>) -> Iter<'i, &'a str, 4> {
        x
    }
    fn c<'a>(x: IntoIter<&'static str>) -> IntoIter<&'a str> {
        x
    }
}

#[cfg(test)]
impl<T, const N: usize, A: Allocator> UnrolledList<T, N, A> {
    /// Walk the chain both ways and check every structural invariant.
    #[track_caller]
    pub(crate) fn check_invariants(&self) {
        let ghost = self.ghost;
        unsafe {
            assert_eq!(ghost.as_ref().len, 0, "the ghost never holds elements");

            let (mut forward, mut nodes) = (0, 0);
            let mut node = self.front_node();
            while node != ghost {
                let len = node.as_ref().len;
                assert!(len >= 1 && len <= N, "node holds {} elements", len);
                assert_eq!(node.as_ref().next.as_ref().prev, node);
                forward += len;
                nodes += 1;
                node = node.as_ref().next;
            }
            assert_eq!(forward, self.len, "forward walk disagrees with len");

            let mut backward = 0;
            let mut node = self.back_node();
            while node != ghost {
                assert_eq!(node.as_ref().prev.as_ref().next, node);
                backward += node.as_ref().len;
                nodes -= 1;
                node = node.as_ref().prev;
            }
            assert_eq!(backward, self.len, "backward walk disagrees with len");
            assert_eq!(nodes, 0);

            assert_eq!(self.is_empty(), self.len == 0);
            assert_eq!(self.front_node() == ghost, self.back_node() == ghost);
        }
    }

    pub(crate) fn node_lens(&self) -> Vec<usize> {
        self.chunks().map(<[T]>::len).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::alloc::testing::{Counters, TestAllocator, Tracked};
    use crate::list::node::Node;
    use crate::list::UnrolledList;
    use crate::TryReserveError;
    use allocator_api2::alloc::{Allocator, Layout};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::fmt::Debug;
    use std::iter::FromIterator;

    fn list_eq<T, const N: usize, A, I>(list: &UnrolledList<T, N, A>, expected: I)
    where
        T: Debug + Clone + Eq,
        A: Allocator,
        I: IntoIterator<Item = T>,
    {
        list.check_invariants();
        assert_eq!(
            Vec::from_iter(list.iter().cloned()),
            Vec::from_iter(expected)
        );
    }

    #[test]
    fn list_create() {
        let mut list = UnrolledList::<i32>::new();
        assert!(list.is_empty());
        list.push_back(1);
        assert!(!list.is_empty());
        assert_eq!(list.pop_back(), Some(1));
        assert!(list.is_empty());
        list.check_invariants();
    }

    #[test]
    fn list_drop() {
        #[derive(Debug)]
        struct DropChecker<'a, T: Copy> {
            value: T,
            dropped: &'a RefCell<Vec<T>>,
        }
        impl<'a, T: Copy> DropChecker<'a, T> {
            fn new(value: T, dropped: &'a RefCell<Vec<T>>) -> Self {
                Self { value, dropped }
            }
        }
        impl<'a, T: Copy> Drop for DropChecker<'a, T> {
            fn drop(&mut self) {
                self.dropped.borrow_mut().push(self.value);
            }
        }
        let dropped = RefCell::new(Vec::<i32>::new());
        let mut list = UnrolledList::<_, 2>::new();
        for value in 1..=5 {
            list.push_back(DropChecker::new(value, &dropped));
        }
        drop(list);
        assert_eq!(dropped.borrow().as_slice(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn clear_survives_panicking_destructor() {
        struct Bomb<'a> {
            value: i32,
            dropped: &'a RefCell<Vec<i32>>,
        }
        impl Drop for Bomb<'_> {
            fn drop(&mut self) {
                self.dropped.borrow_mut().push(self.value);
                if self.value == 2 {
                    panic!("destructor failed");
                }
            }
        }

        let alloc = TestAllocator::new();
        let dropped = RefCell::new(Vec::new());
        let mut list = UnrolledList::<_, 2, _>::new_in(alloc.clone());
        for value in 1..=7 {
            list.push_back(Bomb {
                value,
                dropped: &dropped,
            });
        }
        assert_eq!(alloc.live(), 8);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| list.clear()));
        assert!(result.is_err());
        assert!(list.is_empty());
        assert_eq!(list.node_count(), 0);
        assert_eq!(dropped.borrow().as_slice(), &[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(alloc.live(), 0);
    }

    #[test]
    fn list_push_and_pop() {
        let mut list = UnrolledList::<i32, 3>::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);

        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        assert_eq!(list.pop_front(), None);
        assert_eq!(list.pop_back(), None);

        list.push_back(1);
        assert_eq!(list.back(), Some(&1));
        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
        list.check_invariants();

        list.push_front(1);
        list.push_front(2);
        list.push_back(3);
        assert_eq!(list.back(), Some(&3));
        assert_eq!(list.front(), Some(&2));
        assert_eq!(list.pop_front(), Some(2));
        assert_eq!(list.pop_back(), Some(3));

        assert_eq!(list.front(), Some(&1));
        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        assert!(list.is_empty());
        assert_eq!(list.node_count(), 0);
        list.check_invariants();
    }

    #[test]
    fn push_back_fills_nodes_in_order() {
        let mut list = UnrolledList::<i32, 5>::new();
        for i in 0..11 {
            list.push_back(i);
            list.check_invariants();
        }
        assert_eq!(list.node_lens(), vec![5, 5, 1]);
        list_eq(&list, 0..11);
        assert_eq!(
            Vec::from_iter(list.iter().rev().copied()),
            Vec::from_iter((0..11).rev())
        );
    }

    #[test]
    fn push_front_shifts_then_allocates() {
        let mut list = UnrolledList::<i32, 3>::new();
        for i in 0..7 {
            list.push_front(i);
            list.check_invariants();
        }
        // [6] [5 4 3] [2 1 0]
        assert_eq!(list.node_lens(), vec![1, 3, 3]);
        list_eq(&list, (0..7).rev());
    }

    #[test]
    fn pop_prunes_empty_nodes() {
        let mut list = UnrolledList::<i32, 2>::from_iter(0..5);
        assert_eq!(list.node_lens(), vec![2, 2, 1]);
        assert_eq!(list.pop_back(), Some(4));
        assert_eq!(list.node_lens(), vec![2, 2]);
        assert_eq!(list.pop_front(), Some(0));
        assert_eq!(list.node_lens(), vec![1, 2]);
        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.node_lens(), vec![2]);
        list_eq(&list, 2..4);
    }

    #[test]
    fn list_insert_and_remove() {
        let mut list = UnrolledList::<i32, 4>::from_iter(0..10);
        list.insert(5, 10);
        list_eq(&list, (0..5).chain(Some(10)).chain(5..10));

        assert_eq!(list.remove(10), 9);
        assert_eq!(list.back(), Some(&8));
        list_eq(&list, (0..5).chain(Some(10)).chain(5..9));

        list.insert(0, 11);
        assert_eq!(list.front(), Some(&11));
        list_eq(&list, (11..=11).chain((0..5).chain(Some(10)).chain(5..9)));

        assert_eq!(list.remove(0), 11);
        assert_eq!(list.front(), Some(&0));
        list_eq(&list, (0..5).chain(Some(10)).chain(5..9));

        list.insert(10, 12);
        assert_eq!(list.back(), Some(&12));
        list_eq(&list, (0..5).chain(Some(10)).chain(5..9).chain(Some(12)));
    }

    #[test]
    fn insert_splits_full_node() {
        let mut list = UnrolledList::<i32, 3>::from([1, 2, 3, 4, 5, 6]);
        assert_eq!(list.node_lens(), vec![3, 3]);

        // the last element of the full node moves into a new node after it
        list.insert(1, 10);
        assert_eq!(list.node_lens(), vec![3, 1, 3]);
        list_eq(&list, vec![1, 10, 2, 3, 4, 5, 6]);

        // inserting before the last slot of a full node
        list.insert(6, 20);
        assert_eq!(list.node_lens(), vec![3, 1, 3, 1]);
        list_eq(&list, vec![1, 10, 2, 3, 4, 5, 20, 6]);

        // a node with room just shifts
        list.insert(3, 30);
        assert_eq!(list.node_lens(), vec![3, 2, 3, 1]);
        list_eq(&list, vec![1, 10, 2, 30, 3, 4, 5, 20, 6]);
    }

    #[test]
    fn remove_range_and_truncate() {
        let mut list = UnrolledList::<i32, 3>::from_iter(0..12);
        list.remove_range(4..4);
        list_eq(&list, 0..12);
        list.remove_range(1..7);
        list_eq(&list, (0..1).chain(7..12));
        list.truncate(2);
        list_eq(&list, vec![0, 7]);
        list.remove_range(0..2);
        assert!(list.is_empty());
        list.check_invariants();
    }

    #[test]
    fn scenario_erase_front() {
        let mut list = UnrolledList::<i32>::from([10, 20, 30]);
        assert_eq!(list.cursor_start_mut().remove(), Some(10));
        assert_eq!(list.len(), 2);
        assert_eq!(list.front(), Some(&20));
        list_eq(&list, vec![20, 30]);
    }

    #[test]
    fn from_elem_builds_full_nodes() {
        let list = UnrolledList::<_, 4>::from_elem(7u8, 10);
        assert_eq!(list.node_lens(), vec![4, 4, 2]);
        list_eq(&list, std::iter::repeat(7u8).take(10));

        let empty = UnrolledList::<_, 4>::from_elem(7u8, 0);
        assert!(empty.is_empty());
        empty.check_invariants();
    }

    #[test]
    fn max_len_is_bounded() {
        let list = UnrolledList::<u64, 8>::new();
        let records = isize::MAX as usize / std::mem::size_of::<Node<u64, 8>>();
        assert_eq!(list.max_len(), records * 8);
    }

    #[test]
    fn swap_lists() {
        let mut a = UnrolledList::<i32, 2>::from_iter(0..5);
        let mut b = UnrolledList::<i32, 2>::new();
        a.swap(&mut b);
        a.check_invariants();
        assert!(a.is_empty());
        list_eq(&b, 0..5);
    }

    #[test]
    fn allocator_counts_nodes() {
        let alloc = TestAllocator::new();
        let counters = Counters::new();
        let mut list = UnrolledList::<Tracked, 5, _>::new_in(alloc.clone());
        for i in 0..11 {
            list.push_back(counters.track(i));
        }
        assert_eq!(list.node_lens(), vec![5, 5, 1]);
        assert_eq!(alloc.allocations_of(Layout::new::<Node<Tracked, 5>>()), 3);
        assert_eq!(alloc.allocations_of(Layout::array::<Tracked>(5).unwrap()), 3);
        assert_eq!(alloc.allocations(), 6);
        assert!(list.same_allocator(&UnrolledList::new_in(alloc.clone())));

        drop(list);
        assert_eq!(counters.built(), 11);
        assert_eq!(counters.dropped(), 11);
        assert_eq!(alloc.live(), 0);
    }

    #[test]
    fn push_failure_leaves_list_untouched() {
        let alloc = TestAllocator::new();
        let mut list = UnrolledList::<i32, 2, _>::new_in(alloc.clone());
        list.push_back(1);
        list.push_back(2);

        // no room in the last node, and no node can be allocated
        alloc.fail_after(0);
        assert!(matches!(
            list.try_push_back(3),
            Err(TryReserveError::AllocError { .. })
        ));
        assert!(list.try_push_front(0).is_err());
        list_eq(&list, vec![1, 2]);
        assert_eq!(alloc.live(), 2);

        // the record is granted but the storage is refused
        alloc.fail_after(1);
        assert!(list.try_push_back(3).is_err());
        assert!(list.try_insert(1, 9).is_err());
        list_eq(&list, vec![1, 2]);
        assert_eq!(alloc.live(), 2);

        alloc.never_fail();
        assert!(list.try_push_back(3).is_ok());
        list_eq(&list, vec![1, 2, 3]);
    }

    #[test]
    fn range_construction_failure_releases_everything() {
        let alloc = TestAllocator::new();
        let counters = Counters::new();
        // two complete nodes, then the third record is refused
        alloc.fail_after(4);
        let result = UnrolledList::<Tracked, 3, _>::try_from_iter_in(
            (0..10).map(|i| counters.track(i)),
            alloc.clone(),
        );
        assert!(result.is_err());
        assert_eq!(alloc.allocations(), 4);
        assert_eq!(alloc.live(), 0);
        assert_eq!(counters.built(), counters.dropped());

        // the storage of the third node is refused
        alloc.fail_after(5);
        let result = UnrolledList::<Tracked, 3, _>::try_from_elem_in(
            counters.track(1),
            8,
            alloc.clone(),
        );
        assert!(result.is_err());
        assert_eq!(alloc.live(), 0);
        assert_eq!(counters.built(), counters.dropped());
    }

    #[test]
    fn range_construction_panic_releases_everything() {
        let alloc = TestAllocator::new();
        let counters = Counters::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            UnrolledList::<Tracked, 3, _>::from_iter_in(
                (0..10).map(|i| {
                    if i == 7 {
                        panic!("element construction failed");
                    }
                    counters.track(i)
                }),
                alloc.clone(),
            )
        }));
        assert!(result.is_err());
        assert_eq!(counters.built(), 7);
        assert_eq!(counters.dropped(), 7);
        assert_eq!(alloc.live(), 0);
    }

    #[test]
    fn list_len() {
        let mut list = UnrolledList::<i32, 3>::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);

        list.push_back(1);
        assert_eq!(list.len(), 1);

        list.pop_front();
        assert_eq!(list.len(), 0);

        list.extend(0..5);
        assert_eq!(list.len(), 5);

        list.remove(3);
        assert_eq!(list.len(), 4);

        list.insert_iter(3, 5..7);
        assert_eq!(list.len(), 6);

        list.insert_n(0, 3, 9);
        assert_eq!(list.len(), 9);

        list.clear();
        assert_eq!(list.len(), 0);
        list.check_invariants();
    }

    #[test]
    fn zero_sized_elements() {
        let mut list = UnrolledList::<(), 4>::new();
        for _ in 0..9 {
            list.push_back(());
        }
        assert_eq!(list.node_lens(), vec![4, 4, 1]);
        list.insert(2, ());
        assert_eq!(list.remove(0), ());
        assert_eq!(list.len(), 9);
        list.check_invariants();
    }

    mod model {
        use super::*;
        use proptest::prelude::*;

        #[derive(Clone, Debug)]
        enum Op {
            PushBack(u8),
            PushFront(u8),
            PopBack,
            PopFront,
            Insert(usize, u8),
            Remove(usize),
            RemoveRange(usize, usize),
            Truncate(usize),
            Clear,
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                4 => any::<u8>().prop_map(Op::PushBack),
                3 => any::<u8>().prop_map(Op::PushFront),
                2 => Just(Op::PopBack),
                2 => Just(Op::PopFront),
                4 => (any::<usize>(), any::<u8>()).prop_map(|(at, v)| Op::Insert(at, v)),
                3 => any::<usize>().prop_map(Op::Remove),
                1 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::RemoveRange(a, b)),
                1 => any::<usize>().prop_map(Op::Truncate),
                1 => Just(Op::Clear),
            ]
        }

        fn run<const N: usize>(ops: &[Op]) {
            let mut list = UnrolledList::<u8, N>::new();
            let mut model = VecDeque::new();
            for op in ops {
                match *op {
                    Op::PushBack(v) => {
                        list.push_back(v);
                        model.push_back(v);
                    }
                    Op::PushFront(v) => {
                        list.push_front(v);
                        model.push_front(v);
                    }
                    Op::PopBack => assert_eq!(list.pop_back(), model.pop_back()),
                    Op::PopFront => assert_eq!(list.pop_front(), model.pop_front()),
                    Op::Insert(at, v) => {
                        let at = at % (model.len() + 1);
                        list.insert(at, v);
                        model.insert(at, v);
                    }
                    Op::Remove(at) => {
                        if !model.is_empty() {
                            let at = at % model.len();
                            assert_eq!(Some(list.remove(at)), model.remove(at));
                        }
                    }
                    Op::RemoveRange(a, b) => {
                        let a = a % (model.len() + 1);
                        let b = a + b % (model.len() - a + 1);
                        list.remove_range(a..b);
                        model.drain(a..b).for_each(drop);
                    }
                    Op::Truncate(len) => {
                        let len = len % (model.len() + 1);
                        list.truncate(len);
                        model.truncate(len);
                    }
                    Op::Clear => {
                        list.clear();
                        model.clear();
                    }
                }
                list.check_invariants();
                assert_eq!(list.len(), model.len());
                assert!(list.iter().eq(model.iter()));
                assert!(list.iter().rev().eq(model.iter().rev()));
                assert_eq!(list.front(), model.front());
                assert_eq!(list.back(), model.back());
            }
        }

        proptest! {
            #[test]
            fn model_capacity_1(ops in prop::collection::vec(op(), 0..200)) {
                run::<1>(&ops);
            }

            #[test]
            fn model_capacity_2(ops in prop::collection::vec(op(), 0..200)) {
                run::<2>(&ops);
            }

            #[test]
            fn model_capacity_5(ops in prop::collection::vec(op(), 0..300)) {
                run::<5>(&ops);
            }

            #[test]
            fn model_capacity_16(ops in prop::collection::vec(op(), 0..300)) {
                run::<16>(&ops);
            }
        }
    }
}
