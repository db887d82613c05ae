// ---------------------------------------------------------------------------
// codec – the closed set of buffer formats and their decode entry point
// ---------------------------------------------------------------------------

use trees::settings::max_custom_limit;
use trees::{BurningTree, TreeBuffer};

use crate::containers::{expanded_data, tree_anarchy, unlimited_trees};
use crate::prefab_codec::SimulationPrefabs;
use crate::save_error::SaveError;

/// Formats that can supply a whole expanded tree buffer, in selector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeCodec {
    /// Native expansion container.
    Expanded,
    /// Tree Anarchy whole-buffer migration (import only).
    TreeAnarchy,
    /// Unlimited Trees raw u16 stream (import only).
    UnlimitedTrees,
}

impl TreeCodec {
    pub const ALL: [TreeCodec; 3] = [
        TreeCodec::Expanded,
        TreeCodec::TreeAnarchy,
        TreeCodec::UnlimitedTrees,
    ];

    /// Key of the container in the save's blob store.
    pub const fn key(self) -> &'static str {
        match self {
            TreeCodec::Expanded => expanded_data::KEY,
            TreeCodec::TreeAnarchy => tree_anarchy::KEY,
            TreeCodec::UnlimitedTrees => unlimited_trees::KEY,
        }
    }

    /// Decodes `blob`. Prefab references and names are staged and only
    /// reach `prefabs` when the whole container decodes.
    pub fn decode(
        self,
        blob: &[u8],
        input: &DecodeInput<'_>,
        prefabs: &mut SimulationPrefabs,
    ) -> Result<PopulatedBuffer, SaveError> {
        let mut staged = prefabs.clone();
        let populated = match self {
            TreeCodec::Expanded => expanded_data::decode(blob, input, &mut staged)?,
            TreeCodec::TreeAnarchy => tree_anarchy::decode(blob, input, &mut staged)?,
            TreeCodec::UnlimitedTrees => unlimited_trees::decode(blob, input)?,
        };
        *prefabs = staged;
        Ok(populated)
    }
}

/// What every buffer decoder needs from the running host.
#[derive(Debug, Clone, Copy)]
pub struct DecodeInput<'a> {
    pub native_capacity: u32,
    pub configured_limit: u32,
    /// The host's freshly loaded native buffer; its `[1, native)` trees are
    /// carried into every decoded buffer.
    pub vanilla: &'a TreeBuffer,
}

impl DecodeInput<'_> {
    pub fn max_limit(&self) -> u32 {
        max_custom_limit(self.native_capacity)
    }
}

/// A fully populated replacement buffer produced by a decoder.
#[derive(Debug, Clone)]
pub struct PopulatedBuffer {
    pub trees: TreeBuffer,
    pub burning_trees: Vec<BurningTree>,
    /// Tree count recorded in the container, before growing to the
    /// configured limit.
    pub saved_len: u32,
    /// Scale bytes to apply once the attribute store matches the buffer.
    pub scale_overrides: Vec<(u32, i32)>,
}

/// Seam between the selector and the codecs.
pub trait ContainerDecoder {
    fn decode(
        &mut self,
        codec: TreeCodec,
        blob: &[u8],
        input: &DecodeInput<'_>,
        prefabs: &mut SimulationPrefabs,
    ) -> Result<PopulatedBuffer, SaveError>;
}

/// Dispatches straight to [`TreeCodec::decode`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardDecoder;

impl ContainerDecoder for StandardDecoder {
    fn decode(
        &mut self,
        codec: TreeCodec,
        blob: &[u8],
        input: &DecodeInput<'_>,
        prefabs: &mut SimulationPrefabs,
    ) -> Result<PopulatedBuffer, SaveError> {
        codec.decode(blob, input, prefabs)
    }
}
