//! LIFO stack with a single-step undo of the last pop.

/// A last-in, first-out stack used to drive the iterative tree traversals.
///
/// Besides the usual operations, the stack remembers the element returned by the most recent
/// `pop` so that it can be put back with `revert`. Any later `push` or `pop` replaces that
/// memory, so `revert` only ever undoes the latest pop. Popping requires `T: Copy`: the
/// traversals only ever stack arena entries and small tuples of them, so keeping the popped
/// element around costs a bitwise copy.
///
/// # Examples
///
/// ```
/// use rbtree_join::stack::Stack;
///
/// let mut s = Stack::new();
/// s.push(0);
/// s.push(1);
///
/// assert_eq!(s.pop(), Some(1));
/// assert!(s.revert());
/// assert_eq!(s.pop(), Some(1));
/// assert_eq!(s.pop(), Some(0));
/// assert!(s.is_empty());
/// ```
pub struct Stack<T> {
    items: Vec<T>,
    last_popped: Option<T>,
}

impl<T> Stack<T> {
    /// Constructs a new, empty `Stack<T>`.
    pub fn new() -> Self {
        Stack {
            items: Vec::new(),
            last_popped: None,
        }
    }

    /// Pushes an item onto the stack.
    pub fn push(&mut self, value: T) {
        self.last_popped = None;
        self.items.push(value);
    }

    /// Returns a reference to the top of the stack without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    /// Returns the number of elements in the stack.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the stack holds no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Stack<T>
where
    T: Copy,
{
    /// Removes and returns the top of the stack, or `None` if the stack is empty.
    pub fn pop(&mut self) -> Option<T> {
        self.last_popped = self.items.pop();
        self.last_popped
    }

    /// Restores the element removed by the most recent `pop`. Returns `false` if there is
    /// nothing to restore, either because nothing was popped or because the stack was mutated
    /// again since.
    pub fn revert(&mut self) -> bool {
        match self.last_popped.take() {
            Some(value) => {
                self.items.push(value);
                true
            },
            None => false,
        }
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}
