use bevy::prelude::*;

pub mod attributes;
pub mod bulk_update;
pub mod config;
pub mod expander;
pub mod host;
pub mod manager;
pub mod rules;
pub mod settings;
pub mod tree_buffer;
pub mod tree_instance;

pub use attributes::PackedAttributeStore;
pub use bulk_update::{finish_loading, BulkUpdateReport};
pub use expander::{copy_native_range, expand, ExpandError};
pub use host::{OverlapLayer, Quad, TreeFootprint, TreeHost};
pub use manager::{TreeDataContext, TreeManager};
pub use settings::{ConfigError, LoadingForceMode, OverlapMode, TreeSettings};
pub use tree_buffer::TreeBuffer;
pub use tree_instance::{BurningTree, TreeFlags, TreeInstance};

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Registers the host tree manager and the core's data context.
///
/// Render-phase systems read [`TreeDataContext`] through `Res`, load/save
/// runs with `ResMut`; the scheduler never lets the two overlap.
pub struct TreesPlugin;

impl Plugin for TreesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TreeDataContext>()
            .init_resource::<TreeManager>();
    }
}
