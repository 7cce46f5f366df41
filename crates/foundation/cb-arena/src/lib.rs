//! Indexed arena allocators
//!
//! Tree nodes and symbols live in `la-arena` arenas and are referred to by
//! [`Idx`] handles. [`IndexPool`] and [`SlotVec`] add what `la-arena` does not
//! offer: slots that can be freed and handed out again, which the variable
//! universe needs when a program is removed and compiled again.

pub use la_arena::{Arena, ArenaMap, Idx};

/// Pool of `u32` indices where freed indices are reused before the pool grows
#[derive(Debug, Clone, Default)]
pub struct IndexPool {
    next: u32,
    free: Vec<u32>,
}

impl IndexPool {
    /// Create an empty pool
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out an index, preferring the most recently released one
    pub fn allocate(&mut self) -> u32 {
        if let Some(index) = self.free.pop() {
            return index;
        }
        let index = self.next;
        self.next += 1;
        index
    }

    /// Give `index` back to the pool
    pub fn release(&mut self, index: u32) {
        debug_assert!(index < self.next, "index {index} was never allocated");
        debug_assert!(!self.free.contains(&index), "index {index} released twice");
        self.free.push(index);
    }

    /// Number of indices ever created; never shrinks
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.next
    }

    /// Number of indices currently handed out
    #[must_use]
    pub fn live(&self) -> u32 {
        self.next - self.free.len() as u32
    }
}

/// Vector of optional slots addressed through an [`IndexPool`]
#[derive(Debug, Clone)]
pub struct SlotVec<T> {
    slots: Vec<Option<T>>,
    pool: IndexPool,
}

impl<T> SlotVec<T> {
    /// Create an empty slot vector
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            pool: IndexPool::new(),
        }
    }

    /// Store `value` in a free slot and return its index
    pub fn insert(&mut self, value: T) -> u32 {
        let index = self.pool.allocate();
        let slot = index as usize;
        if slot == self.slots.len() {
            self.slots.push(Some(value));
        } else {
            self.slots[slot] = Some(value);
        }
        index
    }

    /// Empty the slot at `index`, returning what it held
    pub fn remove(&mut self, index: u32) -> Option<T> {
        let value = self.slots.get_mut(index as usize)?.take()?;
        self.pool.release(index);
        Some(value)
    }

    /// Value stored at `index`, if the slot is occupied
    #[must_use]
    pub fn get(&self, index: u32) -> Option<&T> {
        self.slots.get(index as usize)?.as_ref()
    }

    /// Number of occupied slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.pool.live() as usize
    }

    /// Whether no slot is occupied
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots ever allocated
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterate over occupied slots with their indices
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|value| (index as u32, value)))
    }
}

impl<T> Default for SlotVec<T> {
    fn default() -> Self {
        Self::new()
    }
}
