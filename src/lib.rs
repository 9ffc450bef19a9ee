//! A dynamic, rank-queryable string index: a B+ tree of run-length-encoded
//! leaves that can be mutated one run at a time while supporting `O(log n)`
//! positional rank queries, making it possible to build the Burrows-Wheeler
//! Transform of a growing collection of strings incrementally rather than
//! via an upfront suffix sort.
//!
//! The public surface is intentionally small: [`Rope`] owns the structure,
//! [`RopeConfig`] tunes its fan-out and leaf size at construction time, and
//! [`Symbol`] is the crate's six-letter alphabet newtype. Insertion and
//! rank queries live on `Rope` itself; single-string and multi-string BWT
//! construction are free functions in [`rlo`] and [`multi`] since they are
//! built entirely out of `Rope`'s public operations. [`LeafIter`] walks the
//! rope's [`Leaf`] blocks in order without copying their contents.

mod alphabet;
mod config;
mod iter;
mod pool;
mod rle;
pub mod multi;
pub mod rlo;
mod tree;

pub use alphabet::{InvalidSymbol, Symbol, SENTINEL, SIGMA};
pub use config::RopeConfig;
pub use iter::LeafIter;
pub use rle::Leaf;
pub use tree::Rope;
