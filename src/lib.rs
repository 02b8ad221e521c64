//! An ordered multiset backed by a red black tree, with a black-height join of two
//! range-disjoint trees.
//!
//! # Examples
//!
//! ```
//! use rbtree_join::red_black_tree::RedBlackSet;
//!
//! let mut lower: RedBlackSet<u32> = (0..8).collect();
//! let upper: RedBlackSet<u32> = (100..200).collect();
//!
//! lower.merge(upper).unwrap();
//! assert_eq!(lower.len(), 108);
//! assert_eq!(lower.max(), Some(&199));
//! assert!(lower.contains(&7) && lower.contains(&100));
//! assert!(lower.is_valid());
//! ```

pub mod arena;
pub mod red_black_tree;
pub mod stack;
