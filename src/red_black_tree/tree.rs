use crate::arena::{Entry, TypedArena};
use crate::red_black_tree::node::{Color, Node, Side};
use crate::stack::Stack;
use log::trace;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::mem;
use std::vec;

pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Red black tree in the CLRS formulation: parent links, a per-tree sentinel and
/// value-splice deletion. All nodes, the sentinel included, live in `arena`.
pub struct Tree<T> {
    pub arena: TypedArena<Node<T>>,
    pub nil: Entry,
    pub root: Entry,
    pub black_height: usize,
    pub len: usize,
    chunk_size: usize,
}

impl<T> Tree<T> {
    pub fn new(chunk_size: usize) -> Self {
        let mut arena = TypedArena::new(chunk_size);
        let nil = arena.allocate_with(Node::sentinel);
        Tree {
            arena,
            nil,
            root: nil,
            black_height: 0,
            len: 0,
            chunk_size,
        }
    }

    pub fn clear(&mut self) {
        *self = Tree::new(self.chunk_size);
    }

    pub fn value(&self, node: Entry) -> Option<&T> {
        self.arena[node].value.as_ref()
    }

    pub fn color(&self, node: Entry) -> Color {
        self.arena[node].color
    }

    pub fn is_red(&self, node: Entry) -> bool {
        self.color(node) == Color::Red
    }

    // The sentinel stays black no matter what a fixup asks for.
    pub fn set_color(&mut self, node: Entry, color: Color) {
        if node != self.nil {
            self.arena[node].color = color;
        }
    }

    pub fn parent(&self, node: Entry) -> Entry {
        self.arena[node].parent
    }

    pub fn child(&self, node: Entry, side: Side) -> Entry {
        self.arena[node].child(side)
    }

    /// The side of its parent that `node` hangs from.
    fn side_of(&self, node: Entry) -> Side {
        if self.child(self.parent(node), Side::Left) == node {
            Side::Left
        } else {
            Side::Right
        }
    }

    fn extreme(&self, mut node: Entry, side: Side) -> Entry {
        while node != self.nil && self.child(node, side) != self.nil {
            node = self.child(node, side);
        }
        node
    }

    /// Leftmost node of the subtree rooted at `node`, or the sentinel if the subtree is empty.
    pub fn minimum(&self, node: Entry) -> Entry {
        self.extreme(node, Side::Left)
    }

    pub fn maximum(&self, node: Entry) -> Entry {
        self.extreme(node, Side::Right)
    }

    /// Minimum of the right subtree of `node`, or the sentinel if `node` has no right subtree.
    /// Deletion relies on this for nodes with two children.
    pub fn successor(&self, node: Entry) -> Entry {
        if node == self.nil {
            return node;
        }
        self.minimum(self.child(node, Side::Right))
    }

    /// Puts `new` into the slot `old` occupies under its parent. `new` may be the sentinel, in
    /// which case the sentinel's parent is written so that deletion fixup can climb from it.
    pub fn transplant(&mut self, old: Entry, new: Entry) {
        let parent = self.parent(old);
        if parent == self.nil {
            self.root = new;
        } else {
            let side = self.side_of(old);
            self.arena[parent].set_child(side, new);
        }
        self.arena[new].parent = parent;
    }

    /// Rotates the subtree rooted at `node` towards `side`: a left rotation lifts the right
    /// child into `node`'s slot and vice versa. In-order sequence is preserved.
    ///
    /// ```text
    ///        |                              |
    ///        y      rotate(y, Right)        x
    ///       / \     --------------->       / \
    ///      x   c    <---------------      a   y
    ///     / \       rotate(x, Left)          / \
    ///    a   b                              b   c
    /// ```
    pub fn rotate(&mut self, node: Entry, side: Side) {
        let other = side.opposite();
        let lifted = self.child(node, other);
        let inner = self.child(lifted, side);

        self.arena[node].set_child(other, inner);
        if inner != self.nil {
            self.arena[inner].parent = node;
        }

        self.transplant(node, lifted);

        self.arena[lifted].set_child(side, node);
        self.arena[node].parent = lifted;
        trace!("rotated {:?} at {:?}", side, node);
    }

    /// Restores the red black invariants after `node` was linked in as a red node.
    pub fn insert_fixup(&mut self, mut node: Entry) {
        while self.is_red(self.parent(node)) {
            let parent = self.parent(node);
            let grandparent = self.parent(parent);
            let side = self.side_of(parent);
            let uncle = self.child(grandparent, side.opposite());

            if self.is_red(uncle) {
                trace!("insert fixup: red uncle, pushing violation to {:?}", grandparent);
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grandparent, Color::Red);
                node = grandparent;
                continue;
            }

            if node == self.child(parent, side.opposite()) {
                trace!("insert fixup: zig-zag at {:?}", parent);
                node = parent;
                self.rotate(node, side);
            }

            trace!("insert fixup: straight line at {:?}", node);
            let parent = self.parent(node);
            let grandparent = self.parent(parent);
            self.set_color(parent, Color::Black);
            self.set_color(grandparent, Color::Red);
            self.rotate(grandparent, side.opposite());
        }

        if self.is_red(self.root) {
            self.set_color(self.root, Color::Black);
            self.black_height += 1;
        }
    }

    /// Unlinks `node` by value-splice and returns the value it held. A node with two children
    /// takes over its successor's value and the successor is the node that is freed.
    pub fn delete_node(&mut self, node: Entry) -> Option<T> {
        let spliced = if self.child(node, Side::Left) == self.nil
            || self.child(node, Side::Right) == self.nil
        {
            node
        } else {
            self.successor(node)
        };

        let orphan = if self.child(spliced, Side::Left) != self.nil {
            self.child(spliced, Side::Left)
        } else {
            self.child(spliced, Side::Right)
        };

        self.transplant(spliced, orphan);
        let Node { value, color, .. } = self.arena.free(&spliced);
        self.len -= 1;

        let removed = if spliced != node {
            mem::replace(&mut self.arena[node].value, value)
        } else {
            value
        };

        if color == Color::Black {
            self.delete_fixup(orphan);
        }
        removed
    }

    /// Absorbs the extra black left at `node` after a black node was spliced out.
    pub fn delete_fixup(&mut self, mut node: Entry) {
        let mut absorbed = false;

        while node != self.root && !self.is_red(node) {
            let parent = self.parent(node);
            let side = self.side_of(node);
            let mut sibling = self.child(parent, side.opposite());

            if self.is_red(sibling) {
                trace!("delete fixup: red sibling {:?}", sibling);
                self.set_color(sibling, Color::Black);
                self.set_color(parent, Color::Red);
                self.rotate(parent, side);
                sibling = self.child(parent, side.opposite());
            }

            let near = self.child(sibling, side);
            let far = self.child(sibling, side.opposite());
            if !self.is_red(near) && !self.is_red(far) {
                trace!("delete fixup: black nephews, moving up to {:?}", parent);
                self.set_color(sibling, Color::Red);
                node = parent;
                continue;
            }

            if !self.is_red(far) {
                trace!("delete fixup: red near nephew {:?}", near);
                self.set_color(near, Color::Black);
                self.set_color(sibling, Color::Red);
                self.rotate(sibling, side.opposite());
                sibling = self.child(parent, side.opposite());
            }

            trace!("delete fixup: red far nephew under {:?}", sibling);
            let parent_color = self.color(parent);
            let far = self.child(sibling, side.opposite());
            self.set_color(sibling, parent_color);
            self.set_color(parent, Color::Black);
            self.set_color(far, Color::Black);
            self.rotate(parent, side);
            node = self.root;
            absorbed = true;
        }

        // The extra black reached the root without meeting a red node, so every path lost one.
        let shrank = node == self.root && !absorbed && !self.is_red(node);
        self.set_color(node, Color::Black);
        if shrank {
            debug_assert!(self.black_height > 0);
            self.black_height -= 1;
        }
    }

    pub fn in_order_entries(&self) -> Vec<Entry> {
        let mut stack = Stack::new();
        let mut order = Vec::with_capacity(self.len);
        let mut curr = self.root;
        loop {
            while curr != self.nil {
                stack.push(curr);
                curr = self.child(curr, Side::Left);
            }
            match stack.pop() {
                Some(node) => {
                    order.push(node);
                    curr = self.child(node, Side::Right);
                },
                None => break,
            }
        }
        order
    }

    pub fn pre_order_entries(&self) -> Vec<Entry> {
        let mut stack = Stack::new();
        let mut order = Vec::with_capacity(self.len);
        let mut curr = self.root;
        loop {
            while curr != self.nil {
                order.push(curr);
                stack.push(curr);
                curr = self.child(curr, Side::Left);
            }
            match stack.pop() {
                Some(node) => curr = self.child(node, Side::Right),
                None => break,
            }
        }
        order
    }

    // Each node sits on the stack twice: once to schedule its children and once, flagged, to be
    // emitted after both subtrees.
    pub fn post_order_entries(&self) -> Vec<Entry> {
        let mut stack = Stack::new();
        let mut order = Vec::with_capacity(self.len);
        if self.root != self.nil {
            stack.push((self.root, false));
        }
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                order.push(node);
                continue;
            }
            stack.push((node, true));
            for &side in &[Side::Right, Side::Left] {
                let child = self.child(node, side);
                if child != self.nil {
                    stack.push((child, false));
                }
            }
        }
        order
    }

    fn values(&self, entries: Vec<Entry>) -> Vec<&T> {
        entries
            .into_iter()
            .filter_map(|node| self.value(node))
            .collect()
    }

    pub fn in_order(&self) -> Vec<&T> {
        self.values(self.in_order_entries())
    }

    pub fn pre_order(&self) -> Vec<&T> {
        self.values(self.pre_order_entries())
    }

    pub fn post_order(&self) -> Vec<&T> {
        self.values(self.post_order_entries())
    }

    /// Number of links on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let mut stack = Stack::new();
        let mut height: usize = 0;
        if self.root != self.nil {
            stack.push((self.root, 0));
        }
        while let Some((node, depth)) = stack.pop() {
            height = height.max(depth);
            for &side in &[Side::Left, Side::Right] {
                let child = self.child(node, side);
                if child != self.nil {
                    stack.push((child, depth + 1));
                }
            }
        }
        height
    }

    /// Black nodes on the leftmost path, which equals the black-height of a valid tree.
    pub fn spine_black_height(&self) -> usize {
        let mut count = 0;
        let mut curr = self.root;
        while curr != self.nil {
            if !self.is_red(curr) {
                count += 1;
            }
            curr = self.child(curr, Side::Left);
        }
        count
    }

    pub fn iter(&self) -> TreeIter<'_, T> {
        TreeIter {
            tree: self,
            stack: Stack::new(),
            curr: self.root,
            remaining: self.len,
        }
    }
}

impl<T> Tree<T>
where
    T: Ord,
{
    /// Returns the node holding `value`, or the sentinel if there is none.
    pub fn search<V>(&self, value: &V) -> Entry
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut curr = self.root;
        while let Some(curr_value) = self.value(curr) {
            match value.cmp(curr_value.borrow()) {
                Ordering::Equal => break,
                Ordering::Less => curr = self.child(curr, Side::Left),
                Ordering::Greater => curr = self.child(curr, Side::Right),
            }
        }
        curr
    }

    /// Links `value` in as a red leaf and rebalances. Equal values descend to the right.
    pub fn insert(&mut self, value: T) -> Entry {
        let mut parent = self.nil;
        let mut side = Side::Left;
        let mut curr = self.root;
        while let Some(curr_value) = self.value(curr) {
            parent = curr;
            side = if value < *curr_value {
                Side::Left
            } else {
                Side::Right
            };
            curr = self.child(curr, side);
        }

        let node = self.arena.allocate(Node::new(Some(value), self.nil));
        self.arena[node].parent = parent;
        if parent == self.nil {
            self.root = node;
        } else {
            self.arena[parent].set_child(side, node);
        }
        self.len += 1;

        self.insert_fixup(node);
        node
    }

    /// Checks the five red black invariants, the parent links, the cached black-height and the
    /// cached length.
    pub fn is_valid(&self) -> bool {
        if self.is_red(self.nil) || self.is_red(self.root) {
            return false;
        }
        if self.root != self.nil && self.parent(self.root) != self.nil {
            return false;
        }

        let mut black_heights: HashMap<Entry, usize> = HashMap::new();
        black_heights.insert(self.nil, 0);
        let order = self.post_order_entries();
        for &node in &order {
            let left = self.child(node, Side::Left);
            let right = self.child(node, Side::Right);
            if self.value(node).is_none() {
                return false;
            }
            for &child in &[left, right] {
                if child != self.nil && self.parent(child) != node {
                    return false;
                }
                if self.is_red(node) && self.is_red(child) {
                    return false;
                }
            }
            let (left_height, right_height) = match (black_heights.get(&left), black_heights.get(&right)) {
                (Some(&left_height), Some(&right_height)) => (left_height, right_height),
                _ => return false,
            };
            if left_height != right_height {
                return false;
            }
            let own = if self.is_red(node) { 0 } else { 1 };
            black_heights.insert(node, left_height + own);
        }

        let sorted = self.in_order().windows(2).all(|pair| pair[0] <= pair[1]);
        sorted
            && order.len() == self.len
            && black_heights.get(&self.root) == Some(&self.black_height)
    }
}

impl<T> IntoIterator for Tree<T> {
    type Item = T;
    type IntoIter = TreeIntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        let order = self.in_order_entries();
        TreeIntoIter {
            arena: self.arena,
            order: order.into_iter(),
        }
    }
}

/// An owning in-order iterator that frees nodes as it goes.
pub struct TreeIntoIter<T> {
    arena: TypedArena<Node<T>>,
    order: vec::IntoIter<Entry>,
}

impl<T> Iterator for TreeIntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let arena = &mut self.arena;
        self.order.next().and_then(|node| arena.free(&node).value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

/// A lazy in-order iterator over borrowed values.
pub struct TreeIter<'a, T> {
    tree: &'a Tree<T>,
    stack: Stack<Entry>,
    curr: Entry,
    remaining: usize,
}

impl<'a, T> Iterator for TreeIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        while self.curr != tree.nil {
            self.stack.push(self.curr);
            self.curr = tree.child(self.curr, Side::Left);
        }
        let node = self.stack.pop()?;
        self.curr = tree.child(node, Side::Right);
        self.remaining -= 1;
        tree.value(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
