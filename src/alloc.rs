//! Allocator adapters.
//!
//! An [`UnrolledList`](crate::UnrolledList) takes one user-supplied
//! [`Allocator`] and uses it for two kinds of memory with independent
//! lifetimes: the element storage of a node (an array of `N` elements) and
//! the node record itself (links and bookkeeping). [`Rebind`] is a typed view
//! of the allocator for one of these purposes, so that a single strategy
//! serves both.

use crate::error::TryReserveError;
use allocator_api2::alloc::{Allocator, Layout};
use std::marker::PhantomData;
use std::mem;
use std::ptr::{self, NonNull};

/// A view of an allocator `A` that hands out arrays of `U`.
///
/// Zero-sized requests never reach the allocator; they are answered with a
/// dangling, well-aligned pointer.
pub(crate) struct Rebind<'a, U, A: Allocator> {
    alloc: &'a A,
    _marker: PhantomData<fn() -> U>,
}

impl<'a, U, A: Allocator> Rebind<'a, U, A> {
    pub(crate) fn new(alloc: &'a A) -> Self {
        Self {
            alloc,
            _marker: PhantomData,
        }
    }

    fn layout(n: usize) -> Result<Layout, TryReserveError> {
        Layout::array::<U>(n).map_err(|_| TryReserveError::CapacityOverflow)
    }

    /// The largest number of `U` a single allocation can describe.
    pub(crate) fn max_count() -> usize {
        match mem::size_of::<U>() {
            0 => usize::MAX,
            size => isize::MAX as usize / size,
        }
    }

    /// Allocate uninitialized room for `n` values of `U`.
    pub(crate) fn allocate(&self, n: usize) -> Result<NonNull<U>, TryReserveError> {
        let layout = Self::layout(n)?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }
        match self.alloc.allocate(layout) {
            Ok(block) => Ok(block.cast()),
            Err(_) => Err(TryReserveError::AllocError { layout }),
        }
    }

    /// Return room for `n` values of `U` to the allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must come from [`Rebind::allocate`] with the same `n` on an
    /// allocator equal to this one, and all values in it must have been
    /// destroyed already.
    pub(crate) unsafe fn deallocate(&self, ptr: NonNull<U>, n: usize) {
        // `allocate` already validated this layout for the same `n`.
        if let Ok(layout) = Self::layout(n) {
            if layout.size() != 0 {
                self.alloc.deallocate(ptr.cast(), layout);
            }
        }
    }

    /// Move `value` into the uninitialized slot `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for writes and must not hold a live value.
    #[inline]
    pub(crate) unsafe fn construct(&self, ptr: NonNull<U>, value: U) {
        ptr::write(ptr.as_ptr(), value);
    }

    /// Drop the live values in `ptr[..len]` in place.
    ///
    /// # Safety
    ///
    /// The `len` slots starting at `ptr` must hold live values, which are
    /// dead after this call.
    #[inline]
    pub(crate) unsafe fn destroy(&self, ptr: NonNull<U>, len: usize) {
        ptr::drop_in_place(ptr::slice_from_raw_parts_mut(ptr.as_ptr(), len));
    }
}


#[cfg(test)]
mod tests {
    use super::testing::TestAllocator;
    use super::Rebind;
    use crate::error::TryReserveError;
    use allocator_api2::alloc::Layout;

    #[test]
    fn rebind_allocate_and_deallocate() {
        let alloc = TestAllocator::new();
        let words = Rebind::<u64, _>::new(&alloc);

        let ptr = words.allocate(4).unwrap();
        assert_eq!(alloc.allocations_of(Layout::array::<u64>(4).unwrap()), 1);
        unsafe {
            for i in 0..4 {
                words.construct(std::ptr::NonNull::new_unchecked(ptr.as_ptr().add(i)), i as u64);
            }
            assert_eq!(*ptr.as_ptr().add(3), 3);
            words.destroy(ptr, 4);
            words.deallocate(ptr, 4);
        }
        assert_eq!(alloc.live(), 0);
    }

    #[test]
    fn rebind_zero_sized() {
        let alloc = TestAllocator::new();
        let units = Rebind::<(), _>::new(&alloc);
        let ptr = units.allocate(16).unwrap();
        unsafe { units.deallocate(ptr, 16) };
        assert_eq!(alloc.allocations(), 0);
        assert_eq!(Rebind::<(), TestAllocator>::max_count(), usize::MAX);
    }

    #[test]
    fn rebind_refused() {
        let alloc = TestAllocator::new();
        alloc.fail_after(0);
        let words = Rebind::<u32, _>::new(&alloc);
        assert_eq!(
            words.allocate(2),
            Err(TryReserveError::AllocError {
                layout: Layout::array::<u32>(2).unwrap()
            })
        );
        assert_eq!(
            words.allocate(usize::MAX),
            Err(TryReserveError::CapacityOverflow)
        );
    }
}
