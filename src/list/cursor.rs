use crate::error::{infallible, TryReserveError};
use crate::list::node::Node;
use crate::list::UnrolledList;
use allocator_api2::alloc::Allocator;
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Formatter;
use std::iter;
use std::ptr::NonNull;

/// A cursor over an `UnrolledList`.
///
/// A `Cursor` is like an iterator, except that it can freely seek back-and-forth.
/// It designates an element by the node holding it and the offset inside that
/// node.
///
/// In a list with length *n*, there are *n* + 1 valid locations for the cursor,
/// indexed by 0, 1, ..., *n*, where *n* is the end position (the ghost node of
/// the list).
///
/// # Examples
///
/// Here is a simple example showing how the cursors work. (Node boundaries are
/// denoted by `]`, and the end position by `#`).
/// ```
/// use unrolled_list::UnrolledList;
///
/// // Create a list: [ A B] C D] #]
/// let list: UnrolledList<char, 2> = UnrolledList::from(['A', 'B', 'C', 'D']);
///
/// // Create a cursor at start: [|A B] C D] #] (index = 0)
/// let mut cursor = list.cursor_start();
/// assert_eq!(cursor.current(), Some(&'A'));
///
/// // Move cursor forward, across a node boundary: [ A B]|C D] #] (index = 2)
/// assert!(cursor.seek_forward(2).is_ok());
/// assert_eq!(cursor.current(), Some(&'C'));
///
/// // Create a cursor in the end: [ A B] C D]|#] (index = 4)
/// let mut cursor = list.cursor_end();
/// assert_eq!(cursor.current(), None);
/// assert!(cursor.move_next().is_err());
///
/// // Move cursor backward: [ A B] C|D] #] (index = 3)
/// assert!(cursor.move_prev().is_ok());
/// assert_eq!(cursor.current(), Some(&'D'));
/// ```
pub struct Cursor<'a, T, const N: usize, A: Allocator> {
    index: usize,
    pub(crate) node: NonNull<Node<T, N>>,
    pub(crate) offset: usize,
    pub(crate) list: &'a UnrolledList<T, N, A>,
}

impl<'a, T, const N: usize, A: Allocator> Clone for Cursor<'a, T, N, A> {
    fn clone(&self) -> Self {
        Cursor::new(self.list, self.node, self.offset, self.index)
    }
}

/// Compare cursors by their position.
///
/// Only cursors that belong to the same list and designate the same node and
/// offset are considered equal.
///
/// # Examples
/// ```
/// use unrolled_list::UnrolledList;
///
/// let list: UnrolledList<i32> = UnrolledList::from([1, 2, 3]);
/// let cursor1 = list.cursor_start();
/// let mut cursor2 = cursor1.clone();
/// // The same list, and the same position.
/// assert_eq!(cursor1, cursor2);
///
/// cursor2.move_next().unwrap();
/// // The same list, but different positions.
/// assert_ne!(cursor1, cursor2);
///
/// let another_list = list.clone();
/// let cursor3 = another_list.cursor_start();
/// // Different lists.
/// assert_ne!(cursor1, cursor3);
/// ```
impl<'a, T, const N: usize, A: Allocator> PartialEq for Cursor<'a, T, N, A> {
    fn eq(&self, other: &Self) -> bool {
        self.same_list_with(other) && self.node == other.node && self.offset == other.offset
    }
}

impl<'a, T, const N: usize, A: Allocator> Eq for Cursor<'a, T, N, A> {}

/// Compare cursors by their position.
///
/// Only cursors that belong to the same list can compare, so it is
/// `PartialOrd` but not `Ord`.
///
/// # Examples
/// ```
/// use unrolled_list::UnrolledList;
///
/// let list: UnrolledList<i32> = UnrolledList::from([1, 2, 3]);
/// let cursor1 = list.cursor_start();
/// let cursor2 = list.cursor(2);
/// // They belong to the same list, can compare.
/// assert!(cursor1 < cursor2);
///
/// let another_list = list.clone();
/// let cursor3 = another_list.cursor_end();
/// // They belong to different lists, cannot compare.
/// assert_eq!(cursor1.partial_cmp(&cursor3), None);
/// ```
impl<'a, T, const N: usize, A: Allocator> PartialOrd for Cursor<'a, T, N, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if !self.same_list_with(other) {
            return None;
        }
        Some(self.index.cmp(&other.index))
    }
}

/// A cursor over an `UnrolledList` with editing operations.
///
/// A `CursorMut` is like an iterator, except that it can freely seek back-and-forth,
/// and can safely mutate the list during iteration. This is because the lifetime of
/// its yielded references is tied to its own lifetime, instead of just the underlying
/// list. This means cursors cannot yield multiple elements at once.
///
/// Editing through the cursor keeps it valid: after [`CursorMut::insert`] it
/// designates the inserted element, and after [`CursorMut::remove`] it
/// designates the element that followed the removed one.
///
/// # Examples
///
/// ```compile_fail
/// use unrolled_list::UnrolledList;
///
/// let mut list: UnrolledList<i32> = UnrolledList::from([1, 2, 3]);
/// let mut cursor = list.cursor_start_mut();
/// println!("{:?}", list.back());
/// println!("{:?}", cursor.current());
/// ```
pub struct CursorMut<'a, T, const N: usize, A: Allocator> {
    index: usize,
    pub(crate) node: NonNull<Node<T, N>>,
    pub(crate) offset: usize,
    pub(crate) list: &'a mut UnrolledList<T, N, A>,
}

macro_rules! impl_cursor {
    ($CURSOR:ident) => {
        // Private methods
        impl<'a, T, const N: usize, A: Allocator> $CURSOR<'a, T, N, A> {
            pub(crate) fn is_end(&self) -> bool {
                self.node == self.list.ghost_node()
            }

            /// Move forward by up to `steps` elements, crossing the remainder of
            /// a node in one hop, and return how many steps were left when the
            /// end position was reached.
            fn hop_forward(&mut self, mut steps: usize) -> usize {
                while steps > 0 && !self.is_end() {
                    // SAFETY: a non-ghost node of the list is valid.
                    let (len, next) = unsafe { (self.node.as_ref().len, self.node.as_ref().next) };
                    let rest = len - self.offset;
                    if steps < rest {
                        self.offset += steps;
                        self.index += steps;
                        return 0;
                    }
                    steps -= rest;
                    self.index += rest;
                    self.node = next;
                    self.offset = 0;
                }
                steps
            }

            /// Move backward by up to `steps` elements, crossing a whole node in
            /// one hop, and return how many steps were left when the first
            /// element was reached.
            fn hop_backward(&mut self, mut steps: usize) -> usize {
                loop {
                    if steps <= self.offset {
                        self.offset -= steps;
                        self.index -= steps;
                        return 0;
                    }
                    steps -= self.offset;
                    self.index -= self.offset;
                    self.offset = 0;
                    if self.index == 0 {
                        return steps;
                    }
                    // SAFETY: the cursor is not at the first element, so the
                    // previous node is a valid non-ghost node.
                    unsafe {
                        self.node = self.node.as_ref().prev;
                        self.offset = self.node.as_ref().len;
                    }
                }
            }
        }

        impl<'a, T, const N: usize, A: Allocator> $CURSOR<'a, T, N, A> {
            /// Return the index of the cursor
            pub fn index(&self) -> usize {
                self.index
            }

            /// Returns `true` if the `UnrolledList` is empty. See [`UnrolledList::is_empty`].
            pub fn is_empty(&self) -> bool {
                self.list.is_empty()
            }

            /// Move the cursor to the next position, or return an error
            /// when it is already at the end position.
            ///
            /// Stepping past the last element of a node lands on the first
            /// element of the following node.
            ///
            /// This operation should compute in *O*(*1*) time.
            ///
            /// # Examples
            ///
            /// ```
            /// use unrolled_list::UnrolledList;
            ///
            /// let list: UnrolledList<i32, 2> = UnrolledList::from([1, 2, 3]);
            /// let mut cursor = list.cursor(1);
            ///
            /// assert!(cursor.move_next().is_ok());
            /// assert_eq!(cursor.current(), Some(&3));
            /// assert!(cursor.move_next().is_ok());
            ///
            /// // Forbid to move past the end position
            /// assert!(cursor.move_next().is_err());
            ///
            /// // the cursor is still at the end position
            /// assert_eq!(cursor.previous(), Some(&3));
            /// ```
            pub fn move_next(&mut self) -> Result<(), &'static str> {
                match self.hop_forward(1) {
                    0 => Ok(()),
                    _ => Err("`move_next` past the end of the list"),
                }
            }

            /// Move the cursor to the previous position, or return an error
            /// when it is already at the first element.
            ///
            /// Stepping back from the first element of a node lands on the
            /// last live element of the previous node.
            ///
            /// This operation should compute in *O*(*1*) time.
            ///
            /// # Examples
            ///
            /// ```
            /// use unrolled_list::UnrolledList;
            ///
            /// let mut list: UnrolledList<i32, 4> = UnrolledList::from([1, 2, 3, 4, 5]);
            /// list.remove(3); // [1, 2, 3] [5]
            ///
            /// let mut cursor = list.cursor(3);
            /// assert_eq!(cursor.current(), Some(&5));
            /// assert!(cursor.move_prev().is_ok());
            /// assert_eq!(cursor.current(), Some(&3));
            ///
            /// cursor.move_to_start();
            /// // Forbid to move before the first element
            /// assert!(cursor.move_prev().is_err());
            ///
            /// // The cursor is still at the first element
            /// assert_eq!(cursor.current(), Some(&1));
            /// ```
            pub fn move_prev(&mut self) -> Result<(), &'static str> {
                match self.hop_backward(1) {
                    0 => Ok(()),
                    _ => Err("`move_prev` before the start of the list"),
                }
            }

            /// Move forward the cursor by given steps, or return the number
            /// of steps taken when the walk would pass the end position.
            ///
            /// If an error occurs, the cursor will stay at the end position.
            ///
            /// This operation should compute in *O*(*n* / `N`) time at best,
            /// since the rest of a node is crossed at once.
            ///
            /// # Examples
            ///
            /// ```
            /// use unrolled_list::UnrolledList;
            ///
            /// let list: UnrolledList<i32, 2> = UnrolledList::from([1, 2, 3]);
            /// let mut cursor = list.cursor_start();
            ///
            /// // The cursor is at the first element
            /// assert_eq!(cursor.current(), Some(&1));
            ///
            /// // Forbid to move past the end position
            /// assert_eq!(cursor.seek_forward(5), Err(3));
            ///
            /// // the cursor is now at the end position
            /// assert_eq!(cursor.previous(), Some(&3));
            /// ```
            pub fn seek_forward(&mut self, steps: usize) -> Result<(), usize> {
                match self.hop_forward(steps) {
                    0 => Ok(()),
                    left => Err(steps - left),
                }
            }

            /// Move backward the cursor by given steps, or return the number
            /// of steps taken when the walk would pass the first element.
            ///
            /// If an error occurs, the cursor will stay at the first element.
            ///
            /// # Examples
            ///
            /// ```
            /// use unrolled_list::UnrolledList;
            ///
            /// let list: UnrolledList<i32, 2> = UnrolledList::from([1, 2, 3]);
            /// let mut cursor = list.cursor_end();
            ///
            /// // the cursor is at the end position
            /// assert_eq!(cursor.previous(), Some(&3));
            ///
            /// // Forbid to move before the first element
            /// assert_eq!(cursor.seek_backward(5), Err(3));
            ///
            /// // the cursor is now at the first element
            /// assert_eq!(cursor.current(), Some(&1));
            /// ```
            pub fn seek_backward(&mut self, steps: usize) -> Result<(), usize> {
                match self.hop_backward(steps) {
                    0 => Ok(()),
                    left => Err(steps - left),
                }
            }

            /// Move the cursor to the given position `target`, or return an error
            /// when `target > len`.
            ///
            /// If an error occurs, the cursor will stay put.
            ///
            /// The walk starts from whichever of the start, the end and the
            /// current position is nearest to `target`.
            ///
            /// # Examples
            ///
            /// ```
            /// use unrolled_list::UnrolledList;
            ///
            /// let list: UnrolledList<i32, 2> = UnrolledList::from([1, 2, 3]);
            /// let mut cursor = list.cursor_start();
            ///
            /// // The cursor is at the first element
            /// assert_eq!(cursor.current(), Some(&1));
            ///
            /// // Move cursor to a valid place (at the third element)
            /// assert!(cursor.seek_to(2).is_ok());
            /// assert_eq!(cursor.current(), Some(&3));
            ///
            /// // Forbid to move to a invalid place
            /// assert!(cursor.seek_to(5).is_err());
            ///
            /// // The cursor is still at the third element
            /// assert_eq!(cursor.current(), Some(&3));
            /// ```
            pub fn seek_to(&mut self, target: usize) -> Result<(), usize> {
                let len = self.list.len();
                if target > len {
                    return Err(target - len);
                }
                // current=c, target=t, end=#
                if target >= self.index {
                    if target - self.index <= len - target {
                        // [    c-->t     #]
                        self.hop_forward(target - self.index);
                    } else {
                        // [ c     t<--#]
                        self.move_to_end();
                        self.hop_backward(len - target);
                    }
                } else if self.index - target <= target {
                    // [    t<--c     #]
                    self.hop_backward(self.index - target);
                } else {
                    // [-->t      c #]
                    self.move_to_start();
                    self.hop_forward(target);
                }
                debug_assert_eq!(self.index, target);
                Ok(())
            }

            /// Set the cursor to the start of the list (i.e. the first element).
            ///
            /// This operation should compute in *O*(*1*) time.
            #[inline]
            pub fn move_to_start(&mut self) {
                self.index = 0;
                self.node = self.list.front_node();
                self.offset = 0;
            }

            /// Set the cursor to the end position of the list.
            ///
            /// This operation should compute in *O*(*1*) time.
            ///
            /// # Examples
            ///
            /// ```
            /// use unrolled_list::UnrolledList;
            ///
            /// let list: UnrolledList<i32> = UnrolledList::from([1, 2, 3]);
            /// let mut cursor = list.cursor_start();
            /// cursor.move_to_end();
            ///
            /// assert_eq!(cursor.current(), None);
            /// assert_eq!(cursor.previous(), Some(&3));
            /// ```
            #[inline]
            pub fn move_to_end(&mut self) {
                self.index = self.list.len();
                self.node = self.list.ghost_node();
                self.offset = 0;
            }

            /// Return an immutable reference to the element at the cursor,
            /// or `None` if it is located at the end position.
            ///
            /// # Examples
            ///
            /// ```
            /// use unrolled_list::UnrolledList;
            ///
            /// let list: UnrolledList<i32, 2> = UnrolledList::from([1, 2, 3]);
            /// assert_eq!(list.cursor(0).current(), Some(&1));
            /// assert_eq!(list.cursor(1).current(), Some(&2));
            /// assert_eq!(list.cursor(2).current(), Some(&3));
            /// assert_eq!(list.cursor(3).current(), None);
            /// ```
            pub fn current(&self) -> Option<&T> {
                if self.is_end() {
                    return None;
                }
                // SAFETY: a non-ghost node holds a live element at `offset`.
                unsafe { Some(&self.node.as_ref().as_slice()[self.offset]) }
            }

            /// Return an immutable reference to the element before the cursor,
            /// or `None` if it is located at the first element.
            ///
            /// This is useful where using the cursor as a reversed cursor.
            pub fn previous(&self) -> Option<&T> {
                if self.index == 0 {
                    return None;
                }
                // SAFETY: the cursor is not at the first element, so either the
                // current node has an element before `offset`, or the previous
                // node is a non-ghost node.
                unsafe {
                    if self.offset > 0 {
                        Some(&self.node.as_ref().as_slice()[self.offset - 1])
                    } else {
                        self.node.as_ref().prev.as_ref().as_slice().last()
                    }
                }
            }
        }

        impl<'a, T: fmt::Debug, const N: usize, A: Allocator> fmt::Debug for $CURSOR<'a, T, N, A> {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($CURSOR))
                    .field("list", &self.list)
                    .field("index", &self.index)
                    .field("offset", &self.offset)
                    .field("current", &self.current())
                    .finish()
            }
        }
    };
}

impl_cursor!(CursorMut);
impl_cursor!(Cursor);

impl<'a, T, const N: usize, A: Allocator> Cursor<'a, T, N, A> {
    pub(crate) fn new(
        list: &'a UnrolledList<T, N, A>,
        node: NonNull<Node<T, N>>,
        offset: usize,
        index: usize,
    ) -> Self {
        Self {
            index,
            node,
            offset,
            list,
        }
    }

    fn same_list_with(&self, other: &Self) -> bool {
        std::ptr::eq(self.list, other.list)
    }
}

impl<'a, T, const N: usize, A: Allocator> CursorMut<'a, T, N, A> {
    pub(crate) fn new(
        list: &'a mut UnrolledList<T, N, A>,
        node: NonNull<Node<T, N>>,
        offset: usize,
        index: usize,
    ) -> Self {
        Self {
            index,
            node,
            offset,
            list,
        }
    }
}

// Methods that do not change the layout of the list.
impl<'a, T, const N: usize, A: Allocator> CursorMut<'a, T, N, A> {
    /// Return a mutable reference to the element at the cursor,
    /// or `None` if it is located at the end position.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 2> = UnrolledList::from([1, 2, 3]);
    ///
    /// // Create a cursor and mutate the element at it.
    /// let mut cursor = list.cursor_mut(2);
    /// if let Some(x) = cursor.current_mut() {
    ///     *x *= 10;
    /// }
    /// assert_eq!(list, UnrolledList::from([1, 2, 30]));
    /// ```
    pub fn current_mut(&mut self) -> Option<&mut T> {
        if self.is_end() {
            return None;
        }
        let offset = self.offset;
        // SAFETY: a non-ghost node holds a live element at `offset`, and the
        // cursor borrows the list exclusively.
        unsafe { Some(&mut self.node.as_mut().as_mut_slice()[offset]) }
    }

    /// Re-borrow the mutable cursor as a short-lived immutable one.
    pub fn as_cursor(&self) -> Cursor<'_, T, N, A> {
        Cursor::new(self.list, self.node, self.offset, self.index)
    }

    /// Convert the mutable cursor to an immutable one.
    pub fn into_cursor(self) -> Cursor<'a, T, N, A> {
        Cursor::new(self.list, self.node, self.offset, self.index)
    }

    /// Temporarily view the list via an immutable reference.
    ///
    /// This is useful where the list is not able to read while a
    /// mutable cursor is created and being used.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32> = UnrolledList::from([1, 2, 3]);
    /// let mut cursor = list.cursor_start_mut();
    ///
    /// // Temporarily view the list
    /// assert_eq!(cursor.view().back(), Some(&3));
    ///
    /// cursor.insert(4);
    /// assert_eq!(list, UnrolledList::from([4, 1, 2, 3]));
    /// ```
    pub fn view(&self) -> &UnrolledList<T, N, A> {
        self.list
    }
}

/// Rolls back a bulk insertion that did not run to completion.
///
/// The cursor sits right after the `inserted` elements; on drop, unless the
/// insertion was committed, they are removed again. The nodes split on the
/// way all lie between `before` and `after`, which the insertion never
/// touches, so the elements left there are gathered back into one node.
struct InsertGuard<'c, 'a, T, const N: usize, A: Allocator> {
    cursor: &'c mut CursorMut<'a, T, N, A>,
    before: NonNull<Node<T, N>>,
    after: NonNull<Node<T, N>>,
    offset: usize,
    inserted: usize,
    committed: bool,
}

impl<'c, 'a, T, const N: usize, A: Allocator> InsertGuard<'c, 'a, T, N, A> {
    fn new(cursor: &'c mut CursorMut<'a, T, N, A>) -> Self {
        let node = cursor.node;
        // SAFETY: the cursor designates a valid node of the list.
        let (before, after) = unsafe {
            if cursor.is_end() {
                (node.as_ref().prev, node)
            } else {
                (node.as_ref().prev, node.as_ref().next)
            }
        };
        Self {
            offset: cursor.offset,
            cursor,
            before,
            after,
            inserted: 0,
            committed: false,
        }
    }
}

impl<T, const N: usize, A: Allocator> Drop for InsertGuard<'_, '_, T, N, A> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for _ in 0..self.inserted {
            let _ = self.cursor.move_prev();
            self.cursor.remove();
        }
        if self.cursor.is_end() {
            return;
        }
        // SAFETY: `before` and `after` are still linked, and the nodes between
        // them hold exactly the elements of the node the insertion began in.
        unsafe {
            self.cursor.node = self.cursor.list.rejoin(self.before, self.after);
        }
        self.cursor.offset = self.offset;
    }
}

// Methods that might change the layout of the list.
impl<'a, T, const N: usize, A: Allocator> CursorMut<'a, T, N, A> {
    /// Add an element before the cursor position, and move the cursor
    /// onto it.
    ///
    /// If the node at the cursor is full, it is split first: a new node
    /// receives its last element.
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
    /// let mut list: UnrolledList<i32, 2> = UnrolledList::from([1, 2, 3]);
    /// let mut cursor = list.cursor_mut(1);
    ///
    /// cursor.insert(4); // becomes [1, 4, 2, 3]
    /// assert_eq!(cursor.index(), 1);
    /// assert_eq!(cursor.current(), Some(&4));
    ///
    /// cursor.move_to_end();
    /// cursor.insert(5); // becomes [1, 4, 2, 3, 5]
    /// assert_eq!(cursor.index(), 4);
    /// assert_eq!(cursor.current(), Some(&5));
    ///
    /// assert_eq!(list, UnrolledList::from([1, 4, 2, 3, 5]));
    /// ```
    pub fn insert(&mut self, item: T) {
        infallible(self.try_insert(item))
    }

    /// Like [`CursorMut::insert`], but return an error if a new node cannot
    /// be allocated. Neither the list nor the cursor is changed on failure.
    pub fn try_insert(&mut self, item: T) -> Result<(), TryReserveError> {
        // SAFETY: `(node, offset)` is a valid position of the list.
        let (node, offset) = unsafe { self.list.insert_at(self.node, self.offset, item)? };
        self.node = node;
        self.offset = offset;
        Ok(())
    }

    /// Insert `n` clones of `value` before the cursor position, and move the
    /// cursor onto the first of them (it stays put if `n == 0`).
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<char, 3> = UnrolledList::from(['a', 'b']);
    /// let mut cursor = list.cursor_mut(1);
    /// cursor.insert_n(4, '-');
    /// assert_eq!(cursor.index(), 1);
    /// assert_eq!(cursor.current(), Some(&'-'));
    ///
    /// assert_eq!(list, UnrolledList::from(['a', '-', '-', '-', '-', 'b']));
    /// ```
    pub fn insert_n(&mut self, n: usize, value: T)
    where
        T: Clone,
    {
        infallible(self.try_insert_n(n, value))
    }

    /// Like [`CursorMut::insert_n`], but return an error if a new node cannot
    /// be allocated. The list is left as it was on failure.
    pub fn try_insert_n(&mut self, n: usize, value: T) -> Result<(), TryReserveError>
    where
        T: Clone,
    {
        if n == 0 {
            return Ok(());
        }
        self.try_insert_iter(iter::repeat(value).take(n))
    }

    /// Insert the items of `iter`, in order, before the cursor position, and
    /// move the cursor onto the first of them (it stays put if `iter` is empty).
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 2> = UnrolledList::from([0, 9]);
    /// let mut cursor = list.cursor_mut(1);
    /// cursor.insert_iter(1..4);
    /// assert_eq!(cursor.current(), Some(&1));
    ///
    /// assert_eq!(list, UnrolledList::from([0, 1, 2, 3, 9]));
    /// ```
    pub fn insert_iter<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        infallible(self.try_insert_iter(iter))
    }

    /// Like [`CursorMut::insert_iter`], but return an error if a new node
    /// cannot be allocated.
    ///
    /// Either every item is inserted or none is: if allocation fails (or the
    /// iterator panics), the items already inserted are removed again and
    /// the nodes split on the way are joined back, so the list is left as it
    /// was.
    pub fn try_insert_iter<I: IntoIterator<Item = T>>(
        &mut self,
        iter: I,
    ) -> Result<(), TryReserveError> {
        let mut guard = InsertGuard::new(self);
        for item in iter {
            guard.cursor.try_insert(item)?;
            guard.inserted += 1;
            let _ = guard.cursor.move_next();
        }
        guard.committed = true;
        let inserted = guard.inserted;
        guard.cursor.hop_backward(inserted);
        Ok(())
    }

    /// Remove the element at the cursor and return it, or return `None`
    /// if the cursor is at the end position. After removal, the cursor
    /// designates the element that followed the removed one.
    ///
    /// A node left without elements is released.
    ///
    /// This operation should compute in *O*(`N`) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 3> = (0..10).collect();
    /// let mut cursor = list.cursor_mut(5);
    ///
    /// assert_eq!(cursor.remove(), Some(5)); // becomes [0, 1, 2, 3, 4, 6, 7, 8, 9]
    /// assert_eq!(cursor.index(), 5);
    /// assert_eq!(cursor.current(), Some(&6));
    ///
    /// cursor.move_to_start();
    /// assert_eq!(cursor.remove(), Some(0)); // becomes [1, 2, 3, 4, 6, 7, 8, 9]
    /// assert_eq!(cursor.index(), 0);
    /// assert_eq!(cursor.current(), Some(&1));
    ///
    /// cursor.move_to_end();
    /// assert_eq!(cursor.remove(), None);
    /// assert_eq!(cursor.index(), 8);
    /// assert_eq!(cursor.current(), None);
    ///
    /// assert_eq!(list, UnrolledList::from([1, 2, 3, 4, 6, 7, 8, 9]));
    /// ```
    pub fn remove(&mut self) -> Option<T> {
        if self.is_end() {
            return None;
        }
        // SAFETY: `(node, offset)` designates a live element of the list.
        let (item, node, offset) = unsafe { self.list.remove_at(self.node, self.offset) };
        self.node = node;
        self.offset = offset;
        Some(item)
    }

    /// Remove `n` elements starting at the cursor. Afterwards the cursor
    /// designates the element that followed the last removed one.
    ///
    /// Nodes entirely covered by the range are released at once.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `n` elements follow the cursor.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 3> = (0..10).collect();
    /// let mut cursor = list.cursor_mut(2);
    /// cursor.remove_n(6);
    /// assert_eq!(cursor.current(), Some(&8));
    ///
    /// assert_eq!(list, UnrolledList::from([0, 1, 8, 9]));
    /// ```
    pub fn remove_n(&mut self, n: usize) {
        assert!(
            n <= self.list.len() - self.index,
            "Cannot remove past the end of the list"
        );
        let mut left = n;
        while left > 0 {
            // SAFETY: `left` elements follow the cursor, so it is not at the
            // end position and `node` is a valid non-ghost node.
            let (len, next) = unsafe { (self.node.as_ref().len, self.node.as_ref().next) };
            if self.offset == 0 && len <= left {
                let node = self.node;
                self.node = next;
                left -= len;
                // SAFETY: `node` is a node of the list, and the cursor has moved off it.
                unsafe { self.list.remove_node(node) };
            } else {
                self.remove();
                left -= 1;
            }
        }
    }
}

unsafe impl<T: Sync, const N: usize, A: Allocator + Sync> Send for Cursor<'_, T, N, A> {}

unsafe impl<T: Sync, const N: usize, A: Allocator + Sync> Sync for Cursor<'_, T, N, A> {}

unsafe impl<T: Send, const N: usize, A: Allocator + Send> Send for CursorMut<'_, T, N, A> {}

unsafe impl<T: Sync, const N: usize, A: Allocator + Sync> Sync for CursorMut<'_, T, N, A> {}
