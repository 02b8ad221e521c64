use crate::red_black_tree::tree::{Tree, TreeIntoIter, TreeIter, DEFAULT_CHUNK_SIZE};
use crate::red_black_tree::{Error, Result};
use serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::iter::FromIterator;
use std::marker::PhantomData;
use std::result;

/// An ordered multiset implemented using a red black tree.
///
/// A red black tree is a self-balancing binary search tree that colors every node red or black
/// and keeps the number of black nodes equal on every root-to-leaf path, which bounds the height
/// by `2 * log2(n + 1)`. Equal values are kept side by side.
///
/// # Examples
///
/// ```
/// use rbtree_join::red_black_tree::RedBlackSet;
///
/// let mut set = RedBlackSet::new();
/// set.insert(0);
/// set.insert(3);
///
/// assert_eq!(set.len(), 2);
///
/// assert_eq!(set.min(), Some(&0));
/// assert_eq!(set.successor(&0), Some(&3));
///
/// assert_eq!(set.remove(&0), Ok(0));
/// assert!(set.remove(&1).is_err());
/// ```
pub struct RedBlackSet<T> {
    tree: Tree<T>,
}

impl<T> RedBlackSet<T> {
    /// Constructs a new, empty `RedBlackSet<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_join::red_black_tree::RedBlackSet;
    ///
    /// let set: RedBlackSet<u32> = RedBlackSet::new();
    /// ```
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Constructs a new, empty `RedBlackSet<T>` whose node arena grows `chunk_size` nodes at a
    /// time.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_join::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::with_chunk_size(16);
    /// set.extend(0..100);
    /// assert_eq!(set.len(), 100);
    /// ```
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        RedBlackSet {
            tree: Tree::new(chunk_size),
        }
    }

    /// Returns the number of elements in the set, counting duplicates.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_join::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// set.insert(1);
    /// assert_eq!(set.len(), 2);
    /// ```
    pub fn len(&self) -> usize {
        self.tree.len
    }

    /// Returns `true` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_join::red_black_tree::RedBlackSet;
    ///
    /// let set: RedBlackSet<u32> = RedBlackSet::new();
    /// assert!(set.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.tree.len == 0
    }

    /// Clears the set, removing all values.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_join::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// set.insert(2);
    /// set.clear();
    /// assert_eq!(set.is_empty(), true);
    /// ```
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the minimum value of the set, or `None` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_join::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// assert_eq!(set.min(), None);
    /// set.insert(3);
    /// set.insert(1);
    /// assert_eq!(set.min(), Some(&1));
    /// ```
    pub fn min(&self) -> Option<&T> {
        self.tree.value(self.tree.minimum(self.tree.root))
    }

    /// Returns the maximum value of the set, or `None` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_join::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(3);
    /// set.insert(1);
    /// assert_eq!(set.max(), Some(&3));
    /// ```
    pub fn max(&self) -> Option<&T> {
        self.tree.value(self.tree.maximum(self.tree.root))
    }

    /// Returns the number of black nodes on any path from the root to a leaf. An empty set has
    /// black-height zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_join::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// assert_eq!(set.black_height(), 0);
    /// set.insert(1);
    /// assert_eq!(set.black_height(), 1);
    /// ```
    pub fn black_height(&self) -> usize {
        self.tree.black_height
    }

    /// Returns the number of links on the longest path from the root to a leaf. Empty and
    /// single-element sets have height zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_join::red_black_tree::RedBlackSet;
    ///
    /// let set: RedBlackSet<u32> = (1..=7).collect();
    /// assert!(set.height() <= 3);
    /// ```
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Returns the values of the set in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_join::red_black_tree::RedBlackSet;
    ///
    /// let set: RedBlackSet<u32> = vec![2, 3, 1].into_iter().collect();
    /// assert_eq!(set.in_order(), vec![&1, &2, &3]);
    /// ```
    pub fn in_order(&self) -> Vec<&T> {
        self.tree.in_order()
    }

    /// Returns the values of the set with every node before its subtrees.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_join::red_black_tree::RedBlackSet;
    ///
    /// let set: RedBlackSet<u32> = vec![10, 20, 30].into_iter().collect();
    /// assert_eq!(set.pre_order(), vec![&20, &10, &30]);
    /// ```
    pub fn pre_order(&self) -> Vec<&T> {
        self.tree.pre_order()
    }

    /// Returns the values of the set with every node after its subtrees.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_join::red_black_tree::RedBlackSet;
    ///
    /// let set: RedBlackSet<u32> = vec![10, 20, 30].into_iter().collect();
    /// assert_eq!(set.post_order(), vec![&10, &30, &20]);
    /// ```
    pub fn post_order(&self) -> Vec<&T> {
        self.tree.post_order()
    }

    /// Returns an iterator over the set in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_join::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// set.insert(2);
    ///
    /// let mut iterator = set.iter();
    /// assert_eq!(iterator.next(), Some(&1));
    /// assert_eq!(iterator.next(), Some(&2));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> RedBlackSetIter<'_, T> {
        RedBlackSetIter {
            tree_iter: self.tree.iter(),
        }
    }
}

impl<T> RedBlackSet<T>
where
    T: Ord,
{
    /// Inserts a value into the set. Inserting a value that is already present keeps both
    /// copies.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_join::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// set.insert(1);
    /// assert!(set.contains(&1));
    /// assert_eq!(set.in_order(), vec![&1, &1]);
    /// ```
    pub fn insert(&mut self, value: T) {
        self.tree.insert(value);
    }

    /// Removes one occurrence of a value from the set and returns it. Returns
    /// `Error::NotFound` without modifying the set if the value is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_join::red_black_tree::{Error, RedBlackSet};
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// assert_eq!(set.remove(&1), Ok(1));
    /// assert_eq!(set.remove(&1), Err(Error::NotFound));
    /// ```
    pub fn remove<V>(&mut self, value: &V) -> Result<T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let node = self.tree.search(value);
        if node == self.tree.nil {
            return Err(Error::NotFound);
        }
        self.tree.delete_node(node).ok_or(Error::NotFound)
    }

    /// Checks if a value exists in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_join::red_black_tree::RedBlackSet;
    ///
    /// let mut set = RedBlackSet::new();
    /// set.insert(1);
    /// assert!(!set.contains(&0));
    /// assert!(set.contains(&1));
    /// ```
    pub fn contains<V>(&self, value: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.search(value) != self.tree.nil
    }

    /// Returns the minimum value in the right subtree of the node holding `value`. Returns `None`
    /// if `value` is not in the set or its node has no right subtree, even when a larger value
    /// sits higher up in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_join::red_black_tree::RedBlackSet;
    ///
    /// let set: RedBlackSet<u32> = vec![1, 3, 5].into_iter().collect();
    /// assert_eq!(set.pre_order(), vec![&3, &1, &5]);
    /// assert_eq!(set.successor(&3), Some(&5));
    /// assert_eq!(set.successor(&1), None);
    /// assert_eq!(set.successor(&5), None);
    /// assert_eq!(set.successor(&2), None);
    /// ```
    pub fn successor<V>(&self, value: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let node = self.tree.search(value);
        self.tree.value(self.tree.successor(node))
    }

    /// Moves every value of `other` into the set. The nodes of the smaller of the two sets are
    /// moved into the arena of the larger one, and the trees are joined along a single spine, so
    /// the cost is linear in the smaller set and logarithmic in the larger. Every value of one
    /// set must be strictly less than every value of the other; either set may hold the lower
    /// range. Returns `Error::InvalidMerge` and leaves
    /// `self` unchanged if the ranges overlap. `other` is consumed in both cases.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_join::red_black_tree::{Error, RedBlackSet};
    ///
    /// let mut lower: RedBlackSet<u32> = (0..10).collect();
    /// let upper: RedBlackSet<u32> = (10..20).collect();
    /// lower.merge(upper).unwrap();
    /// assert_eq!(lower.len(), 20);
    /// assert!(lower.is_valid());
    ///
    /// let overlapping: RedBlackSet<u32> = vec![5].into_iter().collect();
    /// assert_eq!(lower.merge(overlapping), Err(Error::InvalidMerge));
    /// ```
    pub fn merge(&mut self, other: Self) -> Result<()> {
        self.tree.merge(other.tree)
    }

    /// Returns `true` if the set satisfies every red black tree invariant: the root and the
    /// sentinel are black, no red node has a red child, every path carries the same number of
    /// black nodes, and the values are in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_join::red_black_tree::RedBlackSet;
    ///
    /// let set: RedBlackSet<u32> = (0..100).collect();
    /// assert!(set.is_valid());
    /// ```
    pub fn is_valid(&self) -> bool {
        self.tree.is_valid()
    }
}

impl<T> IntoIterator for RedBlackSet<T> {
    type Item = T;
    type IntoIter = RedBlackSetIntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        RedBlackSetIntoIter {
            tree_iter: self.tree.into_iter(),
        }
    }
}

impl<'a, T> IntoIterator for &'a RedBlackSet<T>
where
    T: 'a,
{
    type Item = &'a T;
    type IntoIter = RedBlackSetIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An owning iterator for `RedBlackSet<T>`.
///
/// This iterator traverses the elements of the set in ascending order and yields owned entries.
pub struct RedBlackSetIntoIter<T> {
    tree_iter: TreeIntoIter<T>,
}

impl<T> Iterator for RedBlackSetIntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.tree_iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.tree_iter.size_hint()
    }
}

/// An iterator for `RedBlackSet<T>`.
///
/// This iterator traverses the elements of the set in ascending order and yields immutable
/// references.
pub struct RedBlackSetIter<'a, T> {
    tree_iter: TreeIter<'a, T>,
}

impl<'a, T> Iterator for RedBlackSetIter<'a, T>
where
    T: 'a,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.tree_iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.tree_iter.size_hint()
    }
}

impl<T> Default for RedBlackSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for RedBlackSet<T>
where
    T: Ord,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut set = RedBlackSet::new();
        set.extend(iter);
        set
    }
}

impl<T> Extend<T> for RedBlackSet<T>
where
    T: Ord,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T> fmt::Debug for RedBlackSet<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> PartialEq for RedBlackSet<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T> Eq for RedBlackSet<T> where T: Eq {}

impl<T> Serialize for RedBlackSet<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

struct RedBlackSetVisitor<T> {
    marker: PhantomData<T>,
}

impl<'de, T> Visitor<'de> for RedBlackSetVisitor<T>
where
    T: Deserialize<'de> + Ord,
{
    type Value = RedBlackSet<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence of values")
    }

    fn visit_seq<A>(self, mut seq: A) -> result::Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut set = RedBlackSet::new();
        while let Some(value) = seq.next_element()? {
            set.insert(value);
        }
        Ok(set)
    }
}

impl<'de, T> Deserialize<'de> for RedBlackSet<T>
where
    T: Deserialize<'de> + Ord,
{
    fn deserialize<D>(deserializer: D) -> result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(RedBlackSetVisitor {
            marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::RedBlackSet;
    use crate::red_black_tree::Error;
    use serde_test::{assert_tokens, Token};

    #[test]
    fn test_len_empty() {
        let set: RedBlackSet<u32> = RedBlackSet::new();
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_is_empty() {
        let set: RedBlackSet<u32> = RedBlackSet::new();
        assert!(set.is_empty());
    }

    #[test]
    fn test_min_max_empty() {
        let set: RedBlackSet<u32> = RedBlackSet::new();
        assert_eq!(set.min(), None);
        assert_eq!(set.max(), None);
        assert_eq!(set.successor(&0), None);
    }

    #[test]
    fn test_insert() {
        let mut set = RedBlackSet::new();
        set.insert(1);
        assert!(set.contains(&1));
        assert_eq!(set.black_height(), 1);
    }

    #[test]
    fn test_insert_duplicate() {
        let mut set = RedBlackSet::new();
        set.insert(1);
        set.insert(1);
        assert_eq!(set.len(), 2);
        assert_eq!(set.remove(&1), Ok(1));
        assert!(set.contains(&1));
        assert_eq!(set.remove(&1), Ok(1));
        assert!(!set.contains(&1));
    }

    #[test]
    fn test_remove() {
        let mut set = RedBlackSet::new();
        set.insert(1);
        assert_eq!(set.remove(&1), Ok(1));
        assert!(!set.contains(&1));
    }

    #[test]
    fn test_remove_missing() {
        let mut set: RedBlackSet<u32> = vec![1, 2, 3].into_iter().collect();
        assert_eq!(set.remove(&99), Err(Error::NotFound));
        assert_eq!(set.len(), 3);
        assert!(set.is_valid());
    }

    #[test]
    fn test_remove_all_leaves_empty_set() {
        let mut set: RedBlackSet<u32> = (0..32).collect();
        for value in (0..32).rev() {
            assert_eq!(set.remove(&value), Ok(value));
            assert!(set.is_valid());
        }
        assert!(set.is_empty());
        assert_eq!(set.black_height(), 0);
        assert_eq!(set.min(), None);
        assert_eq!(set.successor(&0), None);
    }

    #[test]
    fn test_min_max() {
        let mut set = RedBlackSet::new();
        set.insert(1);
        set.insert(3);
        set.insert(5);

        assert_eq!(set.min(), Some(&1));
        assert_eq!(set.max(), Some(&5));
    }

    #[test]
    fn test_successor() {
        let set: RedBlackSet<u32> = vec![10, 20, 30, 40, 50].into_iter().collect();
        assert_eq!(set.pre_order(), vec![&20, &10, &40, &30, &50]);
        assert_eq!(set.successor(&20), Some(&30));
        assert_eq!(set.successor(&40), Some(&50));
        assert_eq!(set.successor(&10), None);
        assert_eq!(set.successor(&30), None);
        assert_eq!(set.successor(&50), None);
        assert_eq!(set.successor(&25), None);
    }

    #[test]
    fn test_successor_of_leaf_without_right_subtree() {
        let set: RedBlackSet<u32> = (1..=7).collect();
        assert_eq!(set.pre_order(), vec![&2, &1, &4, &3, &6, &5, &7]);
        assert_eq!(set.successor(&3), None);
        assert_eq!(set.successor(&1), None);
        assert_eq!(set.successor(&2), Some(&3));
        assert_eq!(set.successor(&4), Some(&5));
        assert_eq!(set.successor(&6), Some(&7));
    }

    #[test]
    fn test_borrowed_lookups() {
        let mut set: RedBlackSet<String> = vec!["b", "a", "c"]
            .into_iter()
            .map(String::from)
            .collect();
        assert!(set.contains("a"));
        assert!(!set.contains("d"));
        assert_eq!(set.successor("b").map(String::as_str), Some("c"));
        assert_eq!(set.remove("a"), Ok(String::from("a")));
        assert_eq!(set.remove("a"), Err(Error::NotFound));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_traversals_of_three() {
        let set: RedBlackSet<u32> = vec![10, 20, 30].into_iter().collect();
        assert_eq!(set.in_order(), vec![&10, &20, &30]);
        assert_eq!(set.pre_order(), vec![&20, &10, &30]);
        assert_eq!(set.post_order(), vec![&10, &30, &20]);
    }

    #[test]
    fn test_merge() {
        let mut lower: RedBlackSet<u32> = vec![5].into_iter().collect();
        let upper: RedBlackSet<u32> = vec![10].into_iter().collect();
        assert_eq!(lower.merge(upper), Ok(()));
        assert_eq!(lower.in_order(), vec![&5, &10]);
        assert_eq!(lower.black_height(), 1);
        assert!(lower.is_valid());
    }

    #[test]
    fn test_merge_small_receiver_adopts_into_larger() {
        let mut small: RedBlackSet<u32> = vec![1000, 1001].into_iter().collect();
        let big: RedBlackSet<u32> = (0..300).collect();
        let entry = big.tree.search(&150);
        assert_eq!(small.merge(big), Ok(()));

        assert_eq!(small.tree.value(entry), Some(&150));
        assert_eq!(small.len(), 302);
        assert_eq!(small.tree.arena.len(), small.len() + 1);
        assert_eq!(small.min(), Some(&0));
        assert_eq!(small.max(), Some(&1001));
        assert!(small.is_valid());
    }

    #[test]
    fn test_merge_overlapping() {
        let mut lower: RedBlackSet<u32> = (0..10).collect();
        let upper: RedBlackSet<u32> = (5..15).collect();
        assert_eq!(lower.merge(upper), Err(Error::InvalidMerge));
        assert_eq!(lower, (0..10).collect::<RedBlackSet<u32>>());
    }

    #[test]
    fn test_clear() {
        let mut set: RedBlackSet<u32> = (0..10).collect();
        set.clear();
        assert!(set.is_empty());
        set.insert(1);
        assert_eq!(set.in_order(), vec![&1]);
    }

    #[test]
    fn test_into_iter() {
        let mut set = RedBlackSet::new();
        set.insert(1);
        set.insert(5);
        set.insert(3);

        assert_eq!(set.into_iter().collect::<Vec<u32>>(), vec![1, 3, 5]);
    }

    #[test]
    fn test_iter() {
        let mut set = RedBlackSet::new();
        set.insert(1);
        set.insert(5);
        set.insert(3);

        let iter = set.iter();
        assert_eq!(iter.size_hint(), (3, Some(3)));
        assert_eq!(iter.collect::<Vec<&u32>>(), vec![&1, &3, &5]);
    }

    #[test]
    fn test_debug() {
        let set: RedBlackSet<u32> = vec![2, 1].into_iter().collect();
        assert_eq!(format!("{:?}", set), "{1, 2}");
    }

    #[test]
    fn test_serde_tokens() {
        let set: RedBlackSet<u32> = vec![3, 1, 2].into_iter().collect();
        assert_tokens(
            &set,
            &[
                Token::Seq { len: Some(3) },
                Token::U32(1),
                Token::U32(2),
                Token::U32(3),
                Token::SeqEnd,
            ],
        );
    }
}
