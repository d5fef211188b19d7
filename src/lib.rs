//! An ordered map based on a red-black tree.
//!
//! Entries are kept in ascending order under a caller-supplied comparator (see the `compare`
//! crate). Insertion, removal and lookup take `O(log n)` time. Nodes live in an arena, so
//! positions can be held as [`Handle`](map/struct.Handle.html)s and walked with
//! [`Cursor`](map/struct.Cursor.html)s in both directions.

#![deny(missing_docs)]
#![deny(elided_lifetimes_in_paths)]

mod error;
mod node;

pub mod map;

#[cfg(feature = "ordered_iter")]
mod ordered_iter;

#[cfg(feature = "quickcheck")]
mod quickcheck;

pub use error::Error;
pub use map::Map;
