//! Self-balancing binary search tree that uses a color bit to ensure that the tree remains
//! approximately balanced during insertions and deletions.
//!
//! The tree follows the CLRS formulation: every node knows its parent, absent links point at a
//! per-tree black sentinel, and deleting a node with two children overwrites it with its
//! successor's value and unlinks the successor instead. Nodes live in an arena and links are
//! handles into it, so the parent back-references never own anything.

mod join;
mod node;
mod set;
mod tree;

pub use self::set::{RedBlackSet, RedBlackSetIntoIter, RedBlackSetIter};
use std::error;
use std::fmt;
use std::result;

/// Errors reported by `RedBlackSet`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// The value to remove is not in the set.
    NotFound,
    /// The two sets passed to a merge have overlapping key ranges.
    InvalidMerge,
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound => write!(f, "value not present in tree"),
            Error::InvalidMerge => write!(f, "merged trees have overlapping key ranges"),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
