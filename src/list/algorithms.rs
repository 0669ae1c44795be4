use crate::error::{infallible, TryReserveError};
use crate::list::UnrolledList;
use allocator_api2::alloc::Allocator;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::iter;

/// Two lists are equal if they hold equal elements in the same order,
/// however those elements are spread over their nodes.
impl<T: PartialEq, const N: usize, A: Allocator> PartialEq for UnrolledList<T, N, A> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other)
    }
}

impl<T: Eq, const N: usize, A: Allocator> Eq for UnrolledList<T, N, A> {}

impl<T: PartialOrd, const N: usize, A: Allocator> PartialOrd for UnrolledList<T, N, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other)
    }
}

impl<T: Ord, const N: usize, A: Allocator> Ord for UnrolledList<T, N, A> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other)
    }
}

impl<T: Hash, const N: usize, A: Allocator> Hash for UnrolledList<T, N, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for elt in self {
            elt.hash(state);
        }
        self.len().hash(state);
    }
}

impl<T: Clone, const N: usize, A: Allocator + Clone> Clone for UnrolledList<T, N, A> {
    /// Build an element-wise copy in a fresh chain, using a clone of the
    /// allocator.
    fn clone(&self) -> Self {
        infallible(self.try_clone())
    }

    /// Replace the contents of `self` with a copy of `source`.
    ///
    /// See [`UnrolledList::try_clone_from`].
    fn clone_from(&mut self, source: &Self) {
        infallible(self.try_clone_from(source))
    }
}

impl<T: Clone, const N: usize, A: Allocator> UnrolledList<T, N, A> {
    /// Like [`Clone::clone`], but return an error if a node cannot be
    /// allocated. Nothing is leaked on failure.
    pub fn try_clone(&self) -> Result<Self, TryReserveError>
    where
        A: Clone,
    {
        self.try_clone_in(self.allocator().clone())
    }

    /// Build an element-wise copy of the list whose nodes come from `alloc`.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::{Global, UnrolledList};
    ///
    /// let list: UnrolledList<i32, 2> = UnrolledList::from([1, 2, 3]);
    /// let copy = list.clone_in(Global);
    /// assert_eq!(list, copy);
    /// ```
    pub fn clone_in<B: Allocator>(&self, alloc: B) -> UnrolledList<T, N, B> {
        infallible(self.try_clone_in(alloc))
    }

    /// Like [`UnrolledList::clone_in`], but return an error if a node cannot
    /// be allocated. Nothing is leaked on failure.
    pub fn try_clone_in<B: Allocator>(
        &self,
        alloc: B,
    ) -> Result<UnrolledList<T, N, B>, TryReserveError> {
        UnrolledList::try_from_iter_in(self.iter().cloned(), alloc)
    }

    /// Replace the contents of `self` with a copy of `source`, adopting the
    /// allocator of `source`.
    ///
    /// The copy is completed in a separate chain before anything is
    /// exchanged, so `self` is left untouched if the copy fails (or an
    /// element's `clone` panics). The old contents are released afterwards.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let source: UnrolledList<i32, 2> = UnrolledList::from([1, 2, 3]);
    /// let mut list: UnrolledList<i32, 2> = UnrolledList::from([7; 9]);
    /// assert!(list.try_clone_from(&source).is_ok());
    /// assert_eq!(list, source);
    /// ```
    pub fn try_clone_from(&mut self, source: &Self) -> Result<(), TryReserveError>
    where
        A: Clone,
    {
        let mut fresh = source.try_clone()?;
        self.swap(&mut fresh);
        Ok(())
    }

    /// Replace the contents of the list by `n` clones of `value`.
    ///
    /// See [`UnrolledList::assign_iter`].
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 2> = UnrolledList::from([1, 2, 3]);
    /// list.assign_n(5, 0);
    /// assert_eq!(list, UnrolledList::from([0; 5]));
    /// ```
    pub fn assign_n(&mut self, n: usize, value: T) {
        infallible(self.try_assign_n(n, value))
    }

    /// Like [`UnrolledList::assign_n`], but return an error if a new node
    /// cannot be allocated.
    pub fn try_assign_n(&mut self, n: usize, value: T) -> Result<(), TryReserveError> {
        self.try_assign_iter(iter::repeat(value).take(n))
    }
}

impl<T, const N: usize, A: Allocator> UnrolledList<T, N, A> {
    /// Replace the contents of the list by the items of `iter`.
    ///
    /// The existing elements are overwritten position by position, in place;
    /// the surplus elements are then dropped (if `iter` is shorter) or the
    /// remaining items are appended (if it is longer).
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 2> = UnrolledList::from([1, 2, 3, 4, 5]);
    /// list.assign_iter(10..13);
    /// assert_eq!(list, UnrolledList::from([10, 11, 12]));
    ///
    /// list.assign_iter(20..25);
    /// assert_eq!(list, UnrolledList::from([20, 21, 22, 23, 24]));
    /// ```
    pub fn assign_iter<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        infallible(self.try_assign_iter(iter))
    }

    /// Like [`UnrolledList::assign_iter`], but return an error if a new node
    /// cannot be allocated for the appended items.
    ///
    /// On failure, the items appended so far are dropped again; the elements
    /// overwritten in place keep their new values.
    pub fn try_assign_iter<I: IntoIterator<Item = T>>(
        &mut self,
        iter: I,
    ) -> Result<(), TryReserveError> {
        let mut iter = iter.into_iter();
        let mut assigned = 0;
        for slot in self.iter_mut() {
            match iter.next() {
                Some(item) => *slot = item,
                None => break,
            }
            assigned += 1;
        }
        self.truncate(assigned);
        self.try_extend(iter)
    }

    /// Returns `true` if the `UnrolledList` contains an element equal to the given value.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32> = UnrolledList::new();
    ///
    /// list.push_back(0);
    /// list.push_back(1);
    /// list.push_back(2);
    ///
    /// assert_eq!(list.contains(&0), true);
    /// assert_eq!(list.contains(&10), false);
    /// ```
    pub fn contains(&self, x: &T) -> bool
    where
        T: PartialEq<T>,
    {
        self.iter().any(|e| e == x)
    }
}
