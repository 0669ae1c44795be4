use crate::error::{infallible, TryReserveError};
use crate::list::node::Node;
use crate::list::UnrolledList;
use allocator_api2::alloc::{Allocator, Global};
use std::fmt;
use std::iter::{FromIterator, FusedIterator};
use std::marker::PhantomData;
use std::ptr::NonNull;

/// An iterator over the elements of an `UnrolledList`.
///
/// The front half of the iterating range starts at element `offset` of node
/// `front`; the back half ends right before element `end` of node `back`.
/// The number `len` of remaining elements tells when both halves meet.
///
/// Though the `Iter` does not hold a reference from the list,
/// it actually *borrows* (immutably) from the list, so a phantom
/// marker of `&'a T` is added to protect the list from being
/// written.
///
/// # Examples
///
/// ```compile_fail
/// use unrolled_list::UnrolledList;
///
/// let mut list: UnrolledList<i32> = UnrolledList::from([1, 2, 3]);
/// let mut iter = list.iter();
///
/// // Won't compile, because list is already borrowed immutably.
/// list.push_back(4);
/// println!("{:?}", iter.next());
/// ```
pub struct Iter<'a, T, const N: usize> {
    front: NonNull<Node<T, N>>,
    offset: usize,
    back: NonNull<Node<T, N>>,
    end: usize,
    len: usize,
    _marker: PhantomData<&'a T>,
}

impl<'a, T, const N: usize> Iter<'a, T, N> {
    pub(crate) fn new<A: Allocator>(list: &'a UnrolledList<T, N, A>) -> Self {
        Self {
            front: list.front_node(),
            offset: 0,
            back: list.ghost_node(),
            end: 0,
            len: list.len(),
            _marker: PhantomData,
        }
    }
}

impl<'a, T, const N: usize> Clone for Iter<'a, T, N> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, T: fmt::Debug, const N: usize> fmt::Debug for Iter<'a, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T, const N: usize> Iterator for Iter<'a, T, N> {
    type Item = &'a T;

    /// Return the element at `(front, offset)` and step past it, moving to
    /// the next node once `front` is exhausted.
    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        // SAFETY: `len > 0`, so `(front, offset)` designates a live element of
        // the list.
        let node = unsafe { self.front.as_ref() };
        let item = &node.as_slice()[self.offset];
        self.offset += 1;
        if self.offset == node.len {
            self.front = node.next;
            self.offset = 0;
        }
        self.len -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    fn last(mut self) -> Option<Self::Item>
    where
        Self: Sized,
    {
        self.next_back()
    }
}

impl<'a, T, const N: usize> DoubleEndedIterator for Iter<'a, T, N> {
    /// Step back before `(back, end)` and return the element there, moving
    /// to the previous node once `back` is exhausted.
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        // SAFETY: `len > 0`, so there is a live element before `(back, end)`.
        unsafe {
            if self.end == 0 {
                self.back = self.back.as_ref().prev;
                self.end = self.back.as_ref().len;
            }
            self.end -= 1;
            self.len -= 1;
            Some(&self.back.as_ref().as_slice()[self.end])
        }
    }
}

impl<'a, T, const N: usize> ExactSizeIterator for Iter<'a, T, N> {}

impl<'a, T, const N: usize> FusedIterator for Iter<'a, T, N> {}

/// A mutable iterator over the elements of an `UnrolledList`.
///
/// Though the `IterMut` does not hold a reference from the list,
/// it actually *borrows* (mutably) from the list, so a phantom
/// marker of `&'a mut T` is added to protect the list from
/// being read.
///
/// # Examples
///
/// `UnrolledList` is not readable after an `IterMut` is created.
/// ```compile_fail
/// use unrolled_list::UnrolledList;
///
/// let mut list: UnrolledList<i32> = UnrolledList::from([1, 2, 3]);
/// let mut iter = list.iter_mut();
/// println!("{:?}", list.back());
/// println!("{:?}", iter.next());
/// ```
pub struct IterMut<'a, T, const N: usize> {
    front: NonNull<Node<T, N>>,
    offset: usize,
    back: NonNull<Node<T, N>>,
    end: usize,
    len: usize,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T, const N: usize> IterMut<'a, T, N> {
    pub(crate) fn new<A: Allocator>(list: &'a mut UnrolledList<T, N, A>) -> Self {
        Self {
            front: list.front_node(),
            offset: 0,
            back: list.ghost_node(),
            end: 0,
            len: list.len(),
            _marker: PhantomData,
        }
    }
}

impl<'a, T: fmt::Debug, const N: usize> fmt::Debug for IterMut<'a, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let iter = Iter::<'_, T, N> {
            front: self.front,
            offset: self.offset,
            back: self.back,
            end: self.end,
            len: self.len,
            _marker: PhantomData,
        };
        f.debug_tuple("IterMut").field(&iter).finish()
    }
}

impl<'a, T, const N: usize> Iterator for IterMut<'a, T, N> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        // SAFETY: `len > 0`, so `(front, offset)` designates a live element of
        // the list, which is yielded only once.
        let node = unsafe { self.front.as_ref() };
        let item = unsafe { &mut *node.slot(self.offset) };
        self.offset += 1;
        if self.offset == node.len {
            self.front = node.next;
            self.offset = 0;
        }
        self.len -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    fn last(mut self) -> Option<Self::Item>
    where
        Self: Sized,
    {
        self.next_back()
    }
}

impl<'a, T, const N: usize> DoubleEndedIterator for IterMut<'a, T, N> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        // SAFETY: `len > 0`, so there is a live element before `(back, end)`,
        // which is yielded only once.
        unsafe {
            if self.end == 0 {
                self.back = self.back.as_ref().prev;
                self.end = self.back.as_ref().len;
            }
            self.end -= 1;
            self.len -= 1;
            Some(&mut *self.back.as_ref().slot(self.end))
        }
    }
}

impl<'a, T, const N: usize> ExactSizeIterator for IterMut<'a, T, N> {}

impl<'a, T, const N: usize> FusedIterator for IterMut<'a, T, N> {}

/// An iterator over the nodes of an `UnrolledList`, each seen as the slice of
/// its live elements.
///
/// It uses a pair of nodes `start..end` to represent a half-open subrange
/// of the chain, where `start` is inclusive and `end` is not.
///
/// This `struct` is created by [`UnrolledList::chunks`].
pub struct Chunks<'a, T, const N: usize> {
    start: NonNull<Node<T, N>>,
    end: NonNull<Node<T, N>>,
    _marker: PhantomData<&'a T>,
}

impl<'a, T, const N: usize> Chunks<'a, T, N> {
    pub(crate) fn new<A: Allocator>(list: &'a UnrolledList<T, N, A>) -> Self {
        Self {
            start: list.front_node(),
            end: list.ghost_node(),
            _marker: PhantomData,
        }
    }
}

impl<'a, T, const N: usize> Clone for Chunks<'a, T, N> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, T: fmt::Debug, const N: usize> fmt::Debug for Chunks<'a, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T, const N: usize> Iterator for Chunks<'a, T, N> {
    type Item = &'a [T];

    /// Return the slice of `start` and reset the iterating range to
    /// `(start.next)..end`, or return `None` if `start..end` is already empty.
    fn next(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: `start..end` is always a valid range of a list,
        // and it is not empty here, so it is safe.
        let current = unsafe { self.start.as_ref() };
        self.start = current.next;
        Some(current.as_slice())
    }

    fn last(mut self) -> Option<Self::Item>
    where
        Self: Sized,
    {
        self.next_back()
    }
}

impl<'a, T, const N: usize> DoubleEndedIterator for Chunks<'a, T, N> {
    /// Reset the iterating range to `start..(end.prev)` and return the slice
    /// of `end.prev`, or return `None` if `start..end` is already empty.
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: `start..end` is always a valid range of a list,
        // and it is not empty here, so it is safe.
        self.end = unsafe { self.end.as_ref().prev };
        let current = unsafe { self.end.as_ref() };
        Some(current.as_slice())
    }
}

impl<'a, T, const N: usize> FusedIterator for Chunks<'a, T, N> {}

/// An owning iterator over the elements of an `UnrolledList`.
///
/// This `struct` is created by the [`into_iter`] method on [`UnrolledList`]
/// (provided by the `IntoIterator` trait). See its documentation for more.
///
/// [`into_iter`]: UnrolledList::into_iter
pub struct IntoIter<T, const N: usize = 10, A: Allocator = Global> {
    list: UnrolledList<T, N, A>,
}

impl<T: fmt::Debug, const N: usize, A: Allocator> fmt::Debug for IntoIter<T, N, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter")
            .field("list", &self.list)
            .finish()
    }
}

impl<T, const N: usize, A: Allocator> Iterator for IntoIter<T, N, A> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.list.len;
        (len, Some(len))
    }

    fn last(mut self) -> Option<Self::Item>
    where
        Self: Sized,
    {
        self.next_back()
    }
}

impl<T, const N: usize, A: Allocator> DoubleEndedIterator for IntoIter<T, N, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.list.pop_back()
    }
}

impl<T, const N: usize, A: Allocator> ExactSizeIterator for IntoIter<T, N, A> {}

impl<T, const N: usize, A: Allocator> FusedIterator for IntoIter<T, N, A> {}

impl<T, const N: usize, A: Allocator> IntoIterator for UnrolledList<T, N, A> {
    type Item = T;
    type IntoIter = IntoIter<T, N, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self }
    }
}

impl<'a, T, const N: usize, A: Allocator> IntoIterator for &'a UnrolledList<T, N, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const N: usize, A: Allocator> IntoIterator for &'a mut UnrolledList<T, N, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, const N: usize> FromIterator<T> for UnrolledList<T, N> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_iter_in(iter, Global)
    }
}

impl<T, const N: usize, const K: usize> From<[T; K]> for UnrolledList<T, N> {
    /// Build a list from an array, filling the nodes in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list: UnrolledList<i32, 2> = UnrolledList::from([1, 2, 3]);
    /// assert_eq!(list.chunks().collect::<Vec<_>>(), vec![&[1, 2][..], &[3][..]]);
    /// ```
    fn from(array: [T; K]) -> Self {
        Self::from_iter(IntoIterator::into_iter(array))
    }
}

impl<T, const N: usize> From<Vec<T>> for UnrolledList<T, N> {
    fn from(vec: Vec<T>) -> Self {
        Self::from_iter(vec)
    }
}

/// Truncates a list back to `len` elements on drop, unless the extension
/// that grew it was committed.
struct ExtendGuard<'a, T, const N: usize, A: Allocator> {
    list: &'a mut UnrolledList<T, N, A>,
    len: usize,
    committed: bool,
}

impl<T, const N: usize, A: Allocator> Drop for ExtendGuard<'_, T, N, A> {
    fn drop(&mut self) {
        if !self.committed {
            self.list.truncate(self.len);
        }
    }
}

impl<T, const N: usize, A: Allocator> UnrolledList<T, N, A> {
    /// Append the items of `iter` to the back of the list, or return an
    /// error if a new node cannot be allocated.
    ///
    /// Either every item is appended or none is: on failure (or if `iter`
    /// panics), the items already appended are dropped again.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 2> = UnrolledList::from([1]);
    /// assert!(list.try_extend(2..5).is_ok());
    /// assert_eq!(list, UnrolledList::from([1, 2, 3, 4]));
    /// ```
    pub fn try_extend<I: IntoIterator<Item = T>>(
        &mut self,
        iter: I,
    ) -> Result<(), TryReserveError> {
        let len = self.len;
        let mut guard = ExtendGuard {
            list: self,
            len,
            committed: false,
        };
        for item in iter {
            guard.list.try_push_back(item)?;
        }
        guard.committed = true;
        Ok(())
    }
}

impl<T, const N: usize, A: Allocator> Extend<T> for UnrolledList<T, N, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        infallible(self.try_extend(iter))
    }
}

impl<'a, T: 'a + Copy, const N: usize, A: Allocator> Extend<&'a T> for UnrolledList<T, N, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied())
    }
}

unsafe impl<T: Sync, const N: usize> Send for Iter<'_, T, N> {}

unsafe impl<T: Sync, const N: usize> Sync for Iter<'_, T, N> {}

unsafe impl<T: Send, const N: usize> Send for IterMut<'_, T, N> {}

unsafe impl<T: Sync, const N: usize> Sync for IterMut<'_, T, N> {}

unsafe impl<T: Sync, const N: usize> Send for Chunks<'_, T, N> {}

unsafe impl<T: Sync, const N: usize> Sync for Chunks<'_, T, N> {}

#[cfg(test)]
mod tests {
    use crate::alloc::testing::TestAllocator;
    use crate::UnrolledList;
    use std::fmt::Debug;
    use std::iter::FromIterator;

    #[test]
    fn test_iter() {
        macro_rules! test_iter {
            ($FN:ident, $ITER:ident $(, $REV:ident)?) => {
                fn $FN<T, I, const N: usize>(input: I, mid: usize)
                where
                    T: Eq + Debug + Clone,
                    I: IntoIterator<Item = T>,
                {
                    #[allow(unused_mut)]
                    let mut vec = Vec::from_iter(input);
                    #[allow(unused_mut)]
                    let mut list = UnrolledList::<T, N>::from_iter(vec.clone());
                    let len = vec.len();
                    let mut iter = list.$ITER() $( .$REV() )?;
                    for (i, item) in vec.$ITER() $( .$REV() )?.enumerate() {
                        assert_eq!(iter.next(), Some(item));
                        assert_eq!(iter.len(), len - i - 1);
                    }
                    assert_eq!(iter.next(), None);
                    assert_eq!(iter.next(), None);
                    assert_eq!(iter.next_back(), None);
                    assert_eq!(iter.len(), 0);

                    let mut iter = list.$ITER() $( .$REV() )?;
                    for (i, item) in vec.$ITER() $( .$REV() )? .take(mid).enumerate() {
                        assert_eq!(iter.next(), Some(item));
                        assert_eq!(iter.len(), len - i - 1);
                    }
                    let mut iter = iter.rev();
                    for (i, item) in vec.$ITER() $( .$REV() )? .skip(mid).rev().enumerate() {
                        assert_eq!(iter.next(), Some(item));
                        assert_eq!(iter.len(), len - mid - i - 1);
                    }
                    assert_eq!(iter.next(), None);
                    assert_eq!(iter.next(), None);
                    assert_eq!(iter.next_back(), None);
                    assert_eq!(iter.len(), 0);
                }
            };
        }
        test_iter!(test_iter, iter);
        test_iter!(test_iter_mut, iter_mut);
        test_iter!(test_back_iter, iter, rev);
        test_iter!(test_back_iter_mut, iter_mut, rev);

        fn test_case<T, I, const N: usize>(input: I, mid: usize)
        where
            T: Eq + Debug + Clone,
            I: IntoIterator<Item = T> + Clone,
        {
            test_iter::<T, I, N>(input.clone(), mid);
            test_iter_mut::<T, I, N>(input.clone(), mid);
            test_back_iter::<T, I, N>(input.clone(), mid);
            test_back_iter_mut::<T, I, N>(input, mid);
        }
        fn test_capacity<const N: usize>() {
            test_case::<_, _, N>(0..10, 10);
            test_case::<_, _, N>(0..10, 8);
            test_case::<_, _, N>(0..10, 5);
            test_case::<_, _, N>(0..10, 2);
            test_case::<_, _, N>(0..10, 0);
            test_case::<_, _, N>(0..2, 2);
            test_case::<_, _, N>(0..2, 1);
            test_case::<_, _, N>(0..2, 0);
            test_case::<_, _, N>(0..1, 1);
            test_case::<_, _, N>(0..1, 0);
            test_case::<_, _, N>(0..0, 0);
        }
        test_capacity::<1>();
        test_capacity::<3>();
        test_capacity::<10>();
    }

    #[test]
    fn iter_over_partially_filled_nodes() {
        let mut list = UnrolledList::<i32, 4>::from_iter(0..12);
        list.remove(1);
        list.remove(5);
        list.remove(9);
        // [0 2 3] [4 5 7] [8 9 10]
        assert_eq!(list.node_lens(), vec![3, 3, 3]);
        let expected = vec![0, 2, 3, 4, 5, 7, 8, 9, 10];
        assert_eq!(Vec::from_iter(list.iter().copied()), expected);
        assert_eq!(
            Vec::from_iter(list.iter().rev().copied()),
            expected.iter().rev().copied().collect::<Vec<_>>()
        );

        // both ends meet inside a node
        let mut iter = list.iter();
        assert_eq!(iter.next(), Some(&0));
        assert_eq!(iter.next_back(), Some(&10));
        assert_eq!(iter.nth(3), Some(&5));
        assert_eq!(iter.next_back(), Some(&9));
        assert_eq!(iter.next_back(), Some(&8));
        assert_eq!(iter.next(), Some(&7));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn chunks_follow_the_chain() {
        let list = UnrolledList::<i32, 5>::from_iter(0..11);
        let chunks = Vec::from_iter(list.chunks());
        assert_eq!(chunks, vec![&[0, 1, 2, 3, 4][..], &[5, 6, 7, 8, 9][..], &[10][..]]);
        let last = list.chunks().rev().next();
        assert_eq!(last, Some(&[10][..]));
        assert_eq!(list.chunks().last(), last);
        assert_eq!(list.node_count(), 3);
        assert_eq!(UnrolledList::<i32, 5>::new().chunks().next(), None);
    }

    #[test]
    fn into_iter_both_ends() {
        let list = UnrolledList::<String, 2>::from_iter((0..5).map(|i| i.to_string()));
        let mut iter = list.into_iter();
        assert_eq!(iter.len(), 5);
        assert_eq!(iter.next().as_deref(), Some("0"));
        assert_eq!(iter.next_back().as_deref(), Some("4"));
        assert_eq!(iter.len(), 3);
        assert_eq!(Vec::from_iter(iter), vec!["1", "2", "3"]);
    }

    #[test]
    fn extend_failure_restores_contents() {
        let alloc = TestAllocator::new();
        let mut list = UnrolledList::<i32, 2, _>::from_iter_in(0..3, alloc.clone());
        assert_eq!(alloc.live(), 4);

        // room for one more element, then one more node, then nothing
        alloc.fail_after(2);
        assert!(list.try_extend(10..20).is_err());
        list.check_invariants();
        assert_eq!(Vec::from_iter(list.iter().copied()), vec![0, 1, 2]);
        assert_eq!(alloc.live(), 4);

        alloc.never_fail();
        list.extend(&[7, 8]);
        assert_eq!(Vec::from_iter(&list), vec![&0, &1, &2, &7, &8]);
    }

    #[test]
    fn build_from_containers() {
        let from_vec: UnrolledList<u8, 3> = UnrolledList::from(vec![1, 2, 3, 4]);
        let from_array: UnrolledList<u8, 3> = UnrolledList::from([1, 2, 3, 4]);
        assert_eq!(from_vec, from_array);
        assert_eq!(from_vec.node_lens(), vec![3, 1]);

        let mut list: UnrolledList<u8, 3> = UnrolledList::new();
        for x in &mut list {
            *x += 1;
        }
        assert!(list.is_empty());
        list.extend(from_vec);
        for x in &mut list {
            *x *= 2;
        }
        assert_eq!(Vec::from_iter(list), vec![2, 4, 6, 8]);
    }
}
