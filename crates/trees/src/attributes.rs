//! Packed per-tree side table: one override bit and one scale byte per slot.
//!
//! Both arrays are sized from the tree buffer capacity by
//! [`PackedAttributeStore::initialize`] and must be re-initialized whenever
//! the buffer is reallocated. Indexing past the capacity panics: it means the
//! buffer was resized without re-initializing this store.

use crate::config::{DEFAULT_MIN_SCALE_FACTOR, FLAG_WORD_BITS, SCALE_BASELINE, SCALE_TO_FLOAT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedAttributeStore {
    capacity: u32,
    flag_words: Vec<u64>,
    scales: Vec<u8>,
    min_scale_factor: u8,
}

impl Default for PackedAttributeStore {
    fn default() -> Self {
        Self {
            capacity: 0,
            flag_words: Vec::new(),
            scales: Vec::new(),
            min_scale_factor: DEFAULT_MIN_SCALE_FACTOR,
        }
    }
}

impl PackedAttributeStore {
    pub fn with_capacity(capacity: u32, min_scale_factor: u8) -> Self {
        let mut store = Self {
            min_scale_factor,
            ..Self::default()
        };
        store.initialize(capacity);
        store
    }

    /// Allocates baseline scales and cleared flag words for `capacity` trees.
    pub fn initialize(&mut self, capacity: u32) {
        self.capacity = capacity;
        self.scales = vec![SCALE_BASELINE; capacity as usize];
        self.flag_words = vec![0; flag_word_count(capacity)];
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn min_scale_factor(&self) -> u8 {
        self.min_scale_factor
    }

    /// Changes the scale floor. Stored bytes are left as they are and only
    /// subsequent writes are clamped.
    pub fn set_min_scale_factor(&mut self, min_scale_factor: u8) {
        self.min_scale_factor = min_scale_factor;
    }

    #[inline]
    fn check_index(&self, index: u32) {
        assert!(
            index < self.capacity,
            "tree attribute index {index} out of range (capacity {})",
            self.capacity
        );
    }

    #[inline]
    pub fn get_flag(&self, index: u32) -> bool {
        self.check_index(index);
        let word = (index >> 6) as usize;
        let bit = index & 63;
        self.flag_words[word] & (1u64 << bit) != 0
    }

    #[inline]
    pub fn set_flag(&mut self, index: u32, value: bool) {
        self.check_index(index);
        let word = (index >> 6) as usize;
        let bit = index & 63;
        if value {
            self.flag_words[word] |= 1u64 << bit;
        } else {
            self.flag_words[word] &= !(1u64 << bit);
        }
    }

    #[inline]
    pub fn get_scale(&self, index: u32) -> u8 {
        self.check_index(index);
        self.scales[index as usize]
    }

    /// Stores `value` clamped to `[min_scale_factor, 255]`.
    #[inline]
    pub fn set_scale(&mut self, index: u32, value: i32) {
        self.check_index(index);
        let clamped = value.clamp(self.min_scale_factor as i32, u8::MAX as i32);
        self.scales[index as usize] = clamped as u8;
    }

    /// Scale byte as a render multiplier (baseline = 1.0).
    pub fn scale_multiplier(&self, index: u32) -> f32 {
        self.get_scale(index) as f32 * SCALE_TO_FLOAT
    }

    pub fn words(&self) -> &[u64] {
        &self.flag_words
    }

    pub fn set_word(&mut self, word: usize, value: u64) {
        assert!(
            word < self.flag_words.len(),
            "tree attribute word {word} out of range ({} words)",
            self.flag_words.len()
        );
        self.flag_words[word] = value;
    }

    pub fn scales(&self) -> &[u8] {
        &self.scales
    }
}

/// `ceil(capacity / 64)`.
pub fn flag_word_count(capacity: u32) -> usize {
    capacity.div_ceil(FLAG_WORD_BITS) as usize
}
