use crate::arena::Entry;
use crate::red_black_tree::node::{Node, Side};
use crate::red_black_tree::tree::Tree;
use crate::red_black_tree::{Error, Result};
use crate::stack::Stack;
use log::debug;
use std::mem;

impl<T> Tree<T>
where
    T: Ord,
{
    /// Joins `other` into `self`. The key ranges of the two trees must be strictly disjoint; the
    /// tree holding the lower range may be either one. On success `self` holds every value of both
    /// trees and `other` is gone. On `Error::InvalidMerge` `self` is untouched.
    ///
    /// The smaller tree (by black-height) is hung under a placeholder node that replaces the
    /// first black node of matching black-height on the bigger tree's boundary spine. The
    /// placeholder is rebalanced like a fresh insertion and then deleted, which pulls the
    /// boundary value into its slot.
    ///
    /// Only the tree with fewer values has its nodes moved between arenas; when that is `self`,
    /// the two trees trade places first.
    pub fn merge(&mut self, mut other: Tree<T>) -> Result<()> {
        if other.root == other.nil {
            return Ok(());
        }
        if self.root == self.nil {
            *self = other;
            return Ok(());
        }

        let mut other_is_upper =
            if self.value(self.maximum(self.root)) < other.value(other.minimum(other.root)) {
                true
            } else if other.value(other.maximum(other.root)) < self.value(self.minimum(self.root)) {
                false
            } else {
                return Err(Error::InvalidMerge);
            };
        if other.len > self.len {
            mem::swap(self, &mut other);
            other_is_upper = !other_is_upper;
        }

        let other_black_height = other.black_height;
        let other_root = self.adopt(other);

        let (small_root, small_height, big_root, big_height, small_is_upper) =
            if self.black_height >= other_black_height {
                (other_root, other_black_height, self.root, self.black_height, other_is_upper)
            } else {
                (self.root, self.black_height, other_root, other_black_height, !other_is_upper)
            };
        debug!(
            "merging black-height {} tree {} black-height {} tree",
            small_height,
            if small_is_upper { "above" } else { "below" },
            big_height,
        );

        self.root = big_root;
        self.black_height = big_height;

        let spine = if small_is_upper { Side::Right } else { Side::Left };
        let splice = self.descend_to_black_height(spine, small_height);

        let placeholder = self.arena.allocate(Node::new(None, self.nil));
        self.len += 1;
        self.transplant(splice, placeholder);

        let (left, right) = if small_is_upper {
            (splice, small_root)
        } else {
            (small_root, splice)
        };
        self.arena[placeholder].left = left;
        self.arena[placeholder].right = right;
        self.arena[left].parent = placeholder;
        self.arena[right].parent = placeholder;

        self.insert_fixup(placeholder);
        self.delete_node(placeholder);

        debug_assert_eq!(self.black_height, self.spine_black_height());
        debug!("merged tree has {} values, black-height {}", self.len, self.black_height);
        Ok(())
    }

    /// Walks down the `side` spine to the first black node whose subtree has black-height
    /// `target`.
    fn descend_to_black_height(&self, side: Side, target: usize) -> Entry {
        let mut curr = self.root;
        let mut height = self.black_height;
        while curr != self.nil {
            if !self.is_red(curr) {
                if height == target {
                    break;
                }
                height -= 1;
            }
            curr = self.child(curr, side);
        }
        curr
    }

    /// Moves every node of `other` into this tree's arena, relinking them against this tree's
    /// sentinel. Returns the entry of the moved root, which is left detached.
    fn adopt(&mut self, mut other: Tree<T>) -> Entry {
        let mut root = self.nil;
        let mut pending = Stack::new();
        pending.push((other.root, self.nil, Side::Left));

        while let Some((old, parent, side)) = pending.pop() {
            let Node {
                value,
                color,
                left,
                right,
                ..
            } = other.arena.free(&old);
            let mut node = Node::new(value, self.nil);
            node.color = color;
            node.parent = parent;
            let new = self.arena.allocate(node);

            if parent == self.nil {
                root = new;
            } else {
                self.arena[parent].set_child(side, new);
            }
            if left != other.nil {
                pending.push((left, new, Side::Left));
            }
            if right != other.nil {
                pending.push((right, new, Side::Right));
            }
        }

        self.len += other.len;
        root
    }
}

#[cfg(test)]
mod tests {
    use crate::red_black_tree::tree::{Tree, DEFAULT_CHUNK_SIZE};
    use crate::red_black_tree::Error;

    fn tree_from<I>(values: I) -> Tree<u32>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut tree = Tree::new(DEFAULT_CHUNK_SIZE);
        for value in values {
            tree.insert(value);
        }
        tree
    }

    fn sorted(tree: &Tree<u32>) -> Vec<u32> {
        tree.in_order().into_iter().cloned().collect()
    }

    #[test]
    fn test_merge_single_nodes() {
        let mut lower = tree_from(vec![5]);
        lower.merge(tree_from(vec![10])).unwrap();
        assert_eq!(sorted(&lower), vec![5, 10]);
        assert_eq!(lower.len, 2);
        assert_eq!(lower.black_height, 1);
        assert!(lower.is_valid());
    }

    #[test]
    fn test_merge_lower_into_upper() {
        let mut upper = tree_from(vec![10]);
        upper.merge(tree_from(vec![5])).unwrap();
        assert_eq!(sorted(&upper), vec![5, 10]);
        assert!(upper.is_valid());
    }

    #[test]
    fn test_merge_small_upper_into_big() {
        let mut big = tree_from(0..100);
        big.merge(tree_from(200..203)).unwrap();
        let expected: Vec<u32> = (0..100).chain(200..203).collect();
        assert_eq!(sorted(&big), expected);
        assert!(big.is_valid());
    }

    #[test]
    fn test_merge_small_lower_into_big() {
        let mut big = tree_from(100..200);
        big.merge(tree_from(0..3)).unwrap();
        let expected: Vec<u32> = (0..3).chain(100..200).collect();
        assert_eq!(sorted(&big), expected);
        assert!(big.is_valid());
    }

    #[test]
    fn test_merge_big_into_small() {
        let mut small = tree_from(vec![1, 2]);
        let big = tree_from(10..300);
        let entry = big.search(&150);
        small.merge(big).unwrap();
        let expected: Vec<u32> = vec![1, 2].into_iter().chain(10..300).collect();
        assert_eq!(sorted(&small), expected);
        assert_eq!(small.len, expected.len());
        assert!(small.is_valid());

        // The larger tree's nodes stay where they were allocated.
        assert_eq!(small.value(entry), Some(&150));
        assert_eq!(small.arena.len(), small.len + 1);
    }

    #[test]
    fn test_merge_equal_black_heights() {
        let mut lower = tree_from(0..7);
        let upper = tree_from(7..14);
        assert_eq!(lower.black_height, upper.black_height);
        lower.merge(upper).unwrap();
        assert_eq!(sorted(&lower), (0..14).collect::<Vec<u32>>());
        assert!(lower.is_valid());
    }

    #[test]
    fn test_merge_with_empty() {
        let mut tree = tree_from(vec![1, 2, 3]);
        tree.merge(tree_from(vec![])).unwrap();
        assert_eq!(sorted(&tree), vec![1, 2, 3]);

        let mut empty = tree_from(vec![]);
        empty.merge(tree).unwrap();
        assert_eq!(sorted(&empty), vec![1, 2, 3]);
        assert!(empty.is_valid());
    }

    #[test]
    fn test_merge_overlapping_ranges() {
        let mut tree = tree_from(vec![1, 5, 9]);
        assert_eq!(tree.merge(tree_from(vec![4, 12])), Err(Error::InvalidMerge));
        assert_eq!(tree.merge(tree_from(vec![9, 12])), Err(Error::InvalidMerge));
        assert_eq!(sorted(&tree), vec![1, 5, 9]);
        assert!(tree.is_valid());
    }

    #[test]
    fn test_merged_tree_stays_usable() {
        let mut tree = tree_from(0..50);
        tree.merge(tree_from(50..60)).unwrap();
        for value in (0..60).step_by(3) {
            let node = tree.search(&value);
            assert!(tree.delete_node(node).is_some());
            assert!(tree.is_valid());
        }
        tree.insert(1000);
        assert!(tree.is_valid());
        assert_eq!(tree.len, 41);
    }
}
