//! Capacity-bounded tree array with a free list.
//!
//! Index 0 is the null sentinel: it is taken out of the free list by the
//! first [`TreeBuffer::create_item`] call after construction and never holds a
//! live tree.

use xxhash_rust::xxh32::Xxh32;

use crate::tree_instance::TreeInstance;

const CHECKSUM_SEED: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeBuffer {
    items: Vec<TreeInstance>,
    unused: Vec<u32>,
    /// `free[i]` is set exactly when `i` is on the free list.
    free: Vec<bool>,
}

impl TreeBuffer {
    /// Creates a zeroed buffer whose free list holds every slot, lowest first.
    pub fn new(capacity: u32) -> Self {
        Self {
            items: vec![TreeInstance::default(); capacity as usize],
            unused: (0..capacity).rev().collect(),
            free: vec![true; capacity as usize],
        }
    }

    /// Creates a zeroed buffer with the sentinel taken and an empty free
    /// list. Callers populate records and then call
    /// [`TreeBuffer::recalculate_unused`].
    pub fn with_sentinel(capacity: u32) -> Self {
        let mut buffer = Self::new(capacity);
        buffer.create_item();
        buffer.clear_unused();
        buffer
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.items.len() as u32
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn create_item(&mut self) -> Option<u32> {
        let index = self.unused.pop()?;
        self.free[index as usize] = false;
        Some(index)
    }

    /// Returns `index` to the free list and zeroes its record.
    pub fn release_item(&mut self, index: u32) {
        debug_assert!(index != 0, "the null sentinel cannot be released");
        self.items[index as usize] = TreeInstance::default();
        if !self.free[index as usize] {
            self.free[index as usize] = true;
            self.unused.push(index);
        }
    }

    pub fn clear_unused(&mut self) {
        self.unused.clear();
        self.free.fill(false);
    }

    /// Rebuilds the free list from record flags. Cached counts from before a
    /// load or resize are never trusted.
    pub fn recalculate_unused(&mut self) {
        self.clear_unused();
        for index in (1..self.len()).rev() {
            if !self.items[index as usize].is_occupied() {
                self.free[index as usize] = true;
                self.unused.push(index);
            }
        }
    }

    pub fn unused_count(&self) -> u32 {
        self.unused.len() as u32
    }

    #[inline]
    pub fn is_unused(&self, index: u32) -> bool {
        self.free.get(index as usize).copied().unwrap_or(false)
    }

    #[inline]
    pub fn get(&self, index: u32) -> &TreeInstance {
        &self.items[index as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, index: u32) -> &mut TreeInstance {
        &mut self.items[index as usize]
    }

    pub fn items(&self) -> &[TreeInstance] {
        &self.items
    }

    /// Indices of occupied trees, excluding the sentinel.
    pub fn occupied(&self) -> impl Iterator<Item = u32> + '_ {
        self.items
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, tree)| tree.is_occupied())
            .map(|(i, _)| i as u32)
    }

    pub fn occupied_count(&self) -> u32 {
        self.occupied().count() as u32
    }

    /// xxHash32 over every record, in index order.
    pub fn checksum(&self) -> u32 {
        let mut hasher = Xxh32::new(CHECKSUM_SEED);
        for tree in &self.items {
            hasher.update(&tree.to_bytes());
        }
        hasher.digest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree_instance::TreeFlags;

    #[test]
    fn test_first_created_item_is_sentinel() {
        let mut buffer = TreeBuffer::new(4);
        assert_eq!(buffer.create_item(), Some(0));
        assert_eq!(buffer.create_item(), Some(1));
    }

    #[test]
    fn test_with_sentinel_has_empty_free_list() {
        let buffer = TreeBuffer::with_sentinel(8);
        assert_eq!(buffer.len(), 8);
        assert_eq!(buffer.unused_count(), 0);
    }

    #[test]
    fn test_recalculate_unused_skips_sentinel_and_occupied() {
        let mut buffer = TreeBuffer::with_sentinel(6);
        buffer.get_mut(2).flags = TreeFlags::CREATED.bits();
        buffer.get_mut(4).flags = TreeFlags::CREATED.bits();
        buffer.recalculate_unused();

        assert_eq!(buffer.unused_count(), 3);
        assert!(!buffer.is_unused(0));
        assert!(buffer.is_unused(1));
        assert!(!buffer.is_unused(2));
        assert!(buffer.is_unused(3));
        assert!(buffer.is_unused(5));
        // Lowest free index is handed out first.
        assert_eq!(buffer.create_item(), Some(1));
    }

    #[test]
    fn test_release_item_zeroes_record() {
        let mut buffer = TreeBuffer::with_sentinel(4);
        let tree = buffer.get_mut(3);
        tree.flags = TreeFlags::CREATED.bits();
        tree.pos_x = 12;
        buffer.release_item(3);
        assert_eq!(*buffer.get(3), TreeInstance::default());
        assert!(buffer.is_unused(3));
    }

    #[test]
    fn test_free_bitmap_tracks_free_list() {
        let mut buffer = TreeBuffer::new(4);
        assert!(buffer.is_unused(0));
        assert_eq!(buffer.create_item(), Some(0));
        assert!(!buffer.is_unused(0));

        let index = buffer.create_item().unwrap();
        assert!(!buffer.is_unused(index));
        buffer.release_item(index);
        buffer.release_item(index);
        assert!(buffer.is_unused(index));
        assert_eq!(buffer.unused_count(), 3);

        buffer.clear_unused();
        assert!((0..4).all(|i| !buffer.is_unused(i)));
        assert!(!buffer.is_unused(99));
    }

    #[test]
    fn test_occupied_iterates_live_trees_only() {
        let mut buffer = TreeBuffer::with_sentinel(5);
        buffer.get_mut(1).flags = 1;
        buffer.get_mut(3).flags = 1;
        let live: Vec<u32> = buffer.occupied().collect();
        assert_eq!(live, vec![1, 3]);
        assert_eq!(buffer.occupied_count(), 2);
    }

    #[test]
    fn test_checksum_changes_with_content() {
        let mut buffer = TreeBuffer::with_sentinel(16);
        let before = buffer.checksum();
        assert_eq!(before, buffer.clone().checksum());
        buffer.get_mut(9).pos_z = -3;
        assert_ne!(before, buffer.checksum());
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_access_panics() {
        let buffer = TreeBuffer::new(4);
        let _ = buffer.get(4);
    }
}
