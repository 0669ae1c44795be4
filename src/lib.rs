//! This crate provides an unrolled linked list: a doubly-linked list whose
//! nodes each hold a small fixed-capacity array of elements.
//!
//! The [`UnrolledList`] keeps the cheap insertion and removal of a linked
//! list, while touching far fewer nodes (and allocations) than a list of one
//! element per node. Pushing and popping at either end is cheap; inserting or
//! removing at a cursor costs *O*(`N`) for shifting elements inside a single
//! node. There is no random access: positions are reached by walking.
//!
//! Here is a quick example showing how the list works.
//!
//! ```
//! use unrolled_list::UnrolledList;
//!
//! // at most 3 elements per node
//! let mut list: UnrolledList<i32, 3> = UnrolledList::from([1, 2, 3, 4]);
//! assert_eq!(list.chunks().collect::<Vec<_>>(), vec![&[1, 2, 3][..], &[4][..]]);
//!
//! let mut cursor = list.cursor_start_mut();
//!
//! cursor.insert(0); // insert 0 at the beginning of the list
//! assert_eq!(cursor.current(), Some(&0));
//! assert_eq!(cursor.view(), &UnrolledList::from([0, 1, 2, 3, 4]));
//!
//! cursor.seek_to(3).unwrap(); // move the cursor to position 3, and remove it.
//! assert_eq!(cursor.remove(), Some(3));
//! assert_eq!(cursor.view(), &UnrolledList::from([0, 1, 2, 4]));
//! ```
//!
//! # Memory Layout
//!
//! The memory layout of the list is like the following graph:
//! ```text
//!          ┌──────────────────────────────────────────────────────────────┐
//!          ↓                                              (Ghost) Node   │
//!    ╔═══════════╗           ╔═══════════╗                 ┌───────────┐  │
//!    ║   next    ║ ────────→ ║   next    ║ ──→ ┄┄ ───────→ │   next    │ ─┘
//!    ╟───────────╢           ╟───────────╢                 ├───────────┤
//! ┌─ ║   prev    ║ ←──────── ║   prev    ║ ←── ┄┄ ←─────── │   prev    │
//! │  ╟───────────╢           ╟───────────╢                 ├───────────┤
//! │  ║    len    ║           ║    len    ║                 │   len 0   │
//! │  ╟───────────╢           ╟───────────╢                 ├───────────┤
//! │  ║   data    ║           ║   data    ║                 ┊ No storage┊
//! │  ╚═════╪═════╝           ╚═════╪═════╝                 └╌╌╌╌╌╌╌╌╌╌╌┘
//! │        ↓                       ↓                           ↑   ↑
//! │  [T T T _ _ ... _]       [T T _ _ _ ... _]                 │   │
//! │   storage for N           storage for N                    │   │
//! └────────────────────────────────────────────────────────────┘   │
//! ╔═══════════╗                                                    │
//! ║   ghost   ║ ───────────────────────────────────────────────────┘
//! ╟───────────╢
//! ║    len    ║
//! ╟───────────╢
//! ║   alloc   ║
//! ╚═══════════╝
//!  UnrolledList
//! ```
//!
//! Each node holds:
//! - the `next` and `prev` pointers to its neighbours (or to the ghost node at
//!   either end of the chain);
//! - `len`, the number of live elements, which occupy `data[..len]`;
//! - `data`, the storage for up to `N` elements.
//!
//! The node record and its storage are two allocations from the same
//! [`Allocator`], acquired together and released together. A node is released
//! as soon as its last element is removed, so every node in the chain holds
//! between 1 and `N` elements.
//!
//! The ghost node carries no storage; it marks the end position of the list,
//! so that an empty list needs no allocation from the list's allocator.
//!
//! # Allocators
//!
//! The list is generic over an [`Allocator`] from the [`allocator_api2`]
//! crate, [`Global`] by default. Every allocating operation comes in two
//! flavours: the plain one (`push_back`, `insert`, `extend`, ...) which aborts
//! through [`std::alloc::handle_alloc_error`] when memory runs out, and a
//! `try_` one which returns a [`TryReserveError`] and leaves the list as it
//! was.
//!
//! ```
//! use unrolled_list::{Global, TryReserveError, UnrolledList};
//!
//! let mut list = UnrolledList::<u8, 16, Global>::new_in(Global);
//! list.try_push_back(1)?;
//! list.try_extend(2..=5)?;
//! assert_eq!(list.len(), 5);
//! # Ok::<(), TryReserveError>(())
//! ```
//!
//! # Iteration
//!
//! Iterating over a list is by the [`Iter`] and [`IterMut`] iterators. These are
//! double-ended iterators, so reverse traversal is `iter().rev()`. [`Chunks`]
//! walks the nodes themselves, one slice of live elements per node.
//!
//! ## Examples
//!
//! ```
//! use unrolled_list::UnrolledList;
//! use std::iter::FromIterator;
//!
//! let mut list: UnrolledList<i32, 2> = UnrolledList::from([1, 2, 3]);
//! let mut iter = list.iter();
//! assert_eq!(iter.next(), Some(&1));
//! assert_eq!(iter.next_back(), Some(&3));
//! assert_eq!(iter.next(), Some(&2));
//! assert_eq!(iter.next(), None);
//!
//! list.iter_mut().for_each(|item| *item *= 2);
//! assert_eq!(Vec::from_iter(list), vec![2, 4, 6]);
//! ```
//!
//! # Cursors
//!
//! The cursors [`Cursor`] and [`CursorMut`] designate a position in the list
//! as a node and an offset inside it. In a list with length *n*, there are
//! *n* + 1 valid locations for the cursor, indexed by 0, 1, ..., *n*, where *n*
//! is the end position.
//!
//! [`CursorMut`] provides the ways to mutate the list in any position:
//! - [`insert`], [`insert_n`], [`insert_iter`]: insert items before the cursor;
//! - [`remove`], [`remove_n`]: remove items at the cursor.
//!
//! ## Examples
//!
//! ```
//! use unrolled_list::UnrolledList;
//! use std::iter::FromIterator;
//!
//! let mut list: UnrolledList<i32, 2> = UnrolledList::from([1, 2, 3, 4]);
//!
//! let mut cursor = list.cursor_start_mut();
//!
//! cursor.insert(5); // becomes [5, 1, 2, 3, 4], points to 5
//! assert_eq!(cursor.current(), Some(&5));
//!
//! assert!(cursor.seek_forward(3).is_ok());
//! assert_eq!(cursor.remove(), Some(3)); // becomes [5, 1, 2, 4], points to 4
//! assert_eq!(cursor.current(), Some(&4));
//!
//! assert_eq!(Vec::from_iter(list), vec![5, 1, 2, 4]);
//! ```
//!
//! [`Cursor`]: crate::list::cursor::Cursor
//! [`CursorMut`]: crate::list::cursor::CursorMut
//! [`insert`]: crate::list::cursor::CursorMut::insert
//! [`insert_n`]: crate::list::cursor::CursorMut::insert_n
//! [`insert_iter`]: crate::list::cursor::CursorMut::insert_iter
//! [`remove`]: crate::list::cursor::CursorMut::remove
//! [`remove_n`]: crate::list::cursor::CursorMut::remove_n

pub use allocator_api2;
#[doc(no_inline)]
pub use allocator_api2::alloc::{AllocError, Allocator, Global};

#[doc(inline)]
pub use error::TryReserveError;
#[doc(inline)]
pub use list::iterator::{Chunks, IntoIter, Iter, IterMut};
#[doc(inline)]
pub use list::UnrolledList;

pub mod list;

mod alloc;
mod error;
