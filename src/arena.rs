//! Chunked slab that owns every node of a tree and hands out stable entries.

use std::mem;
use std::ops::{Index, IndexMut};
use std::vec::Vec;

/// A stable reference to an object stored in a `TypedArena<T>`.
///
/// Entries are plain indices: copying one never copies or owns the object it refers to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Entry {
    chunk_index: usize,
    block_index: usize,
}

enum Block<T> {
    Occupied(T),
    Vacant(Option<Entry>),
}

/// An allocator for a single type of object that addresses its objects by `Entry`.
///
/// Objects are stored in fixed-size chunks, so growing the arena never moves an existing object
/// and never invalidates an entry. Freed blocks are threaded onto a free list and recycled by
/// later allocations. All remaining objects are dropped when the arena is dropped.
pub struct TypedArena<T> {
    head: Option<Entry>,
    chunks: Vec<Vec<Block<T>>>,
    chunk_size: usize,
    len: usize,
    capacity: usize,
}

impl<T> TypedArena<T> {
    fn is_valid_entry(&self, entry: &Entry) -> bool {
        entry.chunk_index < self.chunks.len()
            && entry.block_index < self.chunks[entry.chunk_index].len()
    }

    /// Constructs a new, empty `TypedArena<T>` that holds `chunk_size` objects per chunk.
    pub fn new(chunk_size: usize) -> Self {
        TypedArena {
            head: None,
            chunks: Vec::new(),
            chunk_size: chunk_size.max(1),
            len: 0,
            capacity: 0,
        }
    }

    /// Stores `value` in the arena and returns its entry.
    pub fn allocate(&mut self, value: T) -> Entry {
        if self.len == self.capacity {
            self.chunks.push(Vec::with_capacity(self.chunk_size));
            self.capacity += self.chunk_size;
        }
        self.len += 1;

        match self.head.take() {
            None => {
                let chunk_count = self.chunks.len();
                let last_chunk = &mut self.chunks[chunk_count - 1];
                last_chunk.push(Block::Occupied(value));
                Entry {
                    chunk_index: chunk_count - 1,
                    block_index: last_chunk.len() - 1,
                }
            }
            Some(entry) => {
                let vacant_block = mem::replace(
                    &mut self.chunks[entry.chunk_index][entry.block_index],
                    Block::Occupied(value),
                );
                match vacant_block {
                    Block::Vacant(next_entry) => {
                        self.head = next_entry;
                        entry
                    }
                    Block::Occupied(_) => panic!("Expected a vacant block on the free list."),
                }
            }
        }
    }

    /// Stores the value built by `f` and returns its entry. `f` receives the entry the value
    /// will live at, which lets self-referential objects point at their own slot.
    pub fn allocate_with<F>(&mut self, f: F) -> Entry
    where
        F: FnOnce(Entry) -> T,
    {
        let entry = match self.head {
            Some(entry) => entry,
            None if self.len == self.capacity => Entry {
                chunk_index: self.chunks.len(),
                block_index: 0,
            },
            None => {
                let chunk_index = self.chunks.len() - 1;
                Entry {
                    chunk_index,
                    block_index: self.chunks[chunk_index].len(),
                }
            }
        };
        let allocated = self.allocate(f(entry));
        debug_assert_eq!(allocated, entry);
        allocated
    }

    /// Removes the object referred to by `entry` from the arena and returns it.
    ///
    /// # Panics
    ///
    /// Panics if `entry` does not refer to an occupied block.
    pub fn free(&mut self, entry: &Entry) -> T {
        if !self.is_valid_entry(entry) {
            panic!("Error: attempting to free invalid block.");
        }
        let old_block = mem::replace(
            &mut self.chunks[entry.chunk_index][entry.block_index],
            Block::Vacant(self.head),
        );
        match old_block {
            Block::Vacant(next_entry) => {
                self.chunks[entry.chunk_index][entry.block_index] = Block::Vacant(next_entry);
                panic!("Error: attempting to free vacant block.");
            }
            Block::Occupied(value) => {
                self.len -= 1;
                self.head = Some(*entry);
                value
            }
        }
    }

    /// Returns a reference to the object behind `entry`, or `None` if the block is vacant or
    /// out of bounds.
    pub fn get(&self, entry: &Entry) -> Option<&T> {
        if !self.is_valid_entry(entry) {
            return None;
        }
        match self.chunks[entry.chunk_index][entry.block_index] {
            Block::Occupied(ref value) => Some(value),
            Block::Vacant(_) => None,
        }
    }

    /// Returns a mutable reference to the object behind `entry`, or `None` if the block is
    /// vacant or out of bounds.
    pub fn get_mut(&mut self, entry: &Entry) -> Option<&mut T> {
        if !self.is_valid_entry(entry) {
            return None;
        }
        match self.chunks[entry.chunk_index][entry.block_index] {
            Block::Occupied(ref mut value) => Some(value),
            Block::Vacant(_) => None,
        }
    }

    /// Returns the number of live objects in the arena.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the arena holds no live objects.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Index<Entry> for TypedArena<T> {
    type Output = T;

    fn index(&self, entry: Entry) -> &Self::Output {
        self.get(&entry).expect("Error: entry out of bounds.")
    }
}

impl<T> IndexMut<Entry> for TypedArena<T> {
    fn index_mut(&mut self, entry: Entry) -> &mut Self::Output {
        self.get_mut(&entry).expect("Error: entry out of bounds.")
    }
}

#[cfg(test)]
mod tests {
    use super::{Entry, TypedArena};

    #[test]
    #[should_panic]
    fn test_free_invalid_block() {
        let mut arena: TypedArena<u32> = TypedArena::new(16);
        arena.free(&Entry {
            chunk_index: 0,
            block_index: 0,
        });
    }

    #[test]
    #[should_panic]
    fn test_double_free() {
        let mut arena = TypedArena::new(16);
        let entry = arena.allocate(0);
        arena.free(&entry);
        arena.free(&entry);
    }

    #[test]
    fn test_allocate_spills_into_new_chunk() {
        let mut arena = TypedArena::new(2);
        arena.allocate('a');
        arena.allocate('b');
        assert_eq!(
            arena.allocate('c'),
            Entry {
                chunk_index: 1,
                block_index: 0,
            }
        );
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn test_free_recycles_most_recent_block() {
        let mut arena = TypedArena::new(4);
        let first = arena.allocate(1);
        let second = arena.allocate(2);
        assert_eq!(arena.free(&first), 1);
        assert_eq!(arena.free(&second), 2);
        assert!(arena.is_empty());

        assert_eq!(arena.allocate(3), second);
        assert_eq!(arena.allocate(4), first);
        assert_eq!(arena[first], 4);
    }

    #[test]
    fn test_allocate_with_sees_own_entry() {
        let mut arena = TypedArena::new(2);
        arena.allocate(None);
        let second = arena.allocate_with(Some);
        assert_eq!(arena[second], Some(second));

        let third = arena.allocate_with(Some);
        assert_eq!(third.chunk_index, 1);
        assert_eq!(arena[third], Some(third));

        arena.free(&second);
        let recycled = arena.allocate_with(Some);
        assert_eq!(recycled, second);
        assert_eq!(arena[recycled], Some(second));
    }

    #[test]
    fn test_get_vacant_block() {
        let mut arena = TypedArena::new(4);
        let entry = arena.allocate(0);
        arena.free(&entry);
        assert_eq!(arena.get(&entry), None);
        assert_eq!(arena.get_mut(&entry), None);
    }

    #[test]
    fn test_index_mut() {
        let mut arena = TypedArena::new(4);
        let entry = arena.allocate(1);
        arena[entry] += 1;
        assert_eq!(arena.get(&entry), Some(&2));
    }
}
