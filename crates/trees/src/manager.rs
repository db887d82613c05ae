// ---------------------------------------------------------------------------
// Host-owned tree state and the core's side tables, as bevy resources.
// ---------------------------------------------------------------------------

use bevy::prelude::*;

use crate::attributes::{flag_word_count, PackedAttributeStore};
use crate::config::NATIVE_TREE_CAPACITY;
use crate::settings::TreeSettings;
use crate::tree_buffer::TreeBuffer;
use crate::tree_instance::BurningTree;

/// The host's tree manager: buffer, burning list and the per-tree
/// "needs render update" bitmap.
#[derive(Resource, Debug, Clone)]
pub struct TreeManager {
    pub trees: TreeBuffer,
    pub burning_trees: Vec<BurningTree>,
    pub updated_trees: Vec<u64>,
}

impl Default for TreeManager {
    fn default() -> Self {
        Self::new(NATIVE_TREE_CAPACITY)
    }
}

impl TreeManager {
    pub fn new(capacity: u32) -> Self {
        Self::from_buffer(TreeBuffer::with_sentinel(capacity))
    }

    pub fn from_buffer(trees: TreeBuffer) -> Self {
        let words = flag_word_count(trees.len());
        Self {
            trees,
            burning_trees: Vec::new(),
            updated_trees: vec![0; words],
        }
    }

    /// Swaps in a (usually expanded) buffer and resizes the update bitmap to
    /// match. Returns the previous buffer.
    pub fn install_buffer(&mut self, trees: TreeBuffer) -> TreeBuffer {
        self.updated_trees = vec![0; flag_word_count(trees.len())];
        std::mem::replace(&mut self.trees, trees)
    }

    pub fn mark_updated(&mut self, index: u32) {
        if let Some(word) = self.updated_trees.get_mut((index >> 6) as usize) {
            *word |= 1u64 << (index & 63);
        }
    }

    pub fn is_marked_updated(&self, index: u32) -> bool {
        self.updated_trees
            .get((index >> 6) as usize)
            .is_some_and(|word| word & (1u64 << (index & 63)) != 0)
    }
}

/// Everything the core needs besides the host buffer. Passed explicitly; no
/// process-wide state.
#[derive(Resource, Debug, Clone)]
pub struct TreeDataContext {
    pub native_capacity: u32,
    pub attributes: PackedAttributeStore,
    pub settings: TreeSettings,
}

impl Default for TreeDataContext {
    fn default() -> Self {
        Self::new(NATIVE_TREE_CAPACITY, TreeSettings::default())
    }
}

impl TreeDataContext {
    /// Context for a host with `native_capacity` slots. Attributes are sized
    /// to the native buffer until [`TreeDataContext::resize_attributes`] runs.
    pub fn new(native_capacity: u32, settings: TreeSettings) -> Self {
        let attributes =
            PackedAttributeStore::with_capacity(native_capacity, settings.min_scale_factor);
        Self {
            native_capacity,
            attributes,
            settings,
        }
    }

    /// Re-initializes the attribute store for a buffer of `capacity` slots.
    pub fn resize_attributes(&mut self, capacity: u32) {
        self.attributes
            .set_min_scale_factor(self.settings.min_scale_factor);
        self.attributes.initialize(capacity);
    }
}
