use crate::arena::Entry;

/// An enum representing the color of a node in a red black tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Color {
    Red,
    Black,
}

/// Which child slot of a node a link lives in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A node of a red black tree stored in the tree's arena.
///
/// The links are handles into the same arena and never own their target. The sentinel is an
/// ordinary node with no value that is always black; every absent child, and the parent of the
/// root, points at it.
pub struct Node<T> {
    pub value: Option<T>,
    pub color: Color,
    pub parent: Entry,
    pub left: Entry,
    pub right: Entry,
}

impl<T> Node<T> {
    /// A fresh red node whose links all point at `nil`.
    pub fn new(value: Option<T>, nil: Entry) -> Self {
        Node {
            value,
            color: Color::Red,
            parent: nil,
            left: nil,
            right: nil,
        }
    }

    pub fn sentinel(nil_slot: Entry) -> Self {
        Node {
            value: None,
            color: Color::Black,
            parent: nil_slot,
            left: nil_slot,
            right: nil_slot,
        }
    }

    pub fn child(&self, side: Side) -> Entry {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn set_child(&mut self, side: Side, child: Entry) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }
}
