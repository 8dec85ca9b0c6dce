//! Flat node storage addressed by integer handles.

pub type ArenaIndex = usize;

#[derive(Debug, Clone)]
pub struct Arena<T> {
    store: Vec<T>,
}

impl<T> Arena<T> {
    /// Creates a new Arena.
    pub fn new() -> Self {
        Self { store: Vec::new() }
    }

    /// Creates a new Arena with space for `capacity` amount of elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: Vec::with_capacity(capacity),
        }
    }

    /// Adds the item to the arena.
    pub fn add(&mut self, item: T) -> ArenaIndex {
        let index = self.store.len();
        self.store.push(item);
        index
    }

    /// Returns the number of stored items.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Iterates over the stored items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.store.iter()
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::ops::Index<ArenaIndex> for Arena<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    fn index(&self, index: ArenaIndex) -> &Self::Output {
        &self.store[index]
    }
}
