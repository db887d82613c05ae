use bevy::log::info;
use bevy::prelude::Resource;
use trees::{TreeDataContext, TreeManager};

use crate::containers::{anarchy_flags, expanded_data, tree_scaling, tree_snapping};
use crate::data_store::DataStore;
use crate::prefab_codec::SimulationPrefabs;

/// Summary of the last tree save.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSaveReport {
    /// Keys written, in write order.
    pub written: Vec<&'static str>,
    /// Stale keys removed from the store.
    pub removed: Vec<&'static str>,
}

/// Writes the tree containers for the current session into `store`.
///
/// An unexpanded buffer writes no expansion container, and any stale one
/// from an earlier save is removed so the next load does not pick it up.
pub fn save_trees(
    store: &mut dyn DataStore,
    manager: &TreeManager,
    ctx: &TreeDataContext,
    prefabs: &SimulationPrefabs,
) -> TreeSaveReport {
    let mut report = TreeSaveReport::default();

    match expanded_data::encode(manager, ctx.native_capacity, prefabs) {
        Some(blob) => {
            store.put(expanded_data::KEY, blob);
            report.written.push(expanded_data::KEY);
        }
        None => {
            if store.remove(expanded_data::KEY).is_some() {
                report.removed.push(expanded_data::KEY);
            }
        }
    }

    store.put(tree_scaling::KEY, tree_scaling::encode(&ctx.attributes));
    report.written.push(tree_scaling::KEY);
    store.put(tree_snapping::KEY, tree_snapping::encode(manager));
    report.written.push(tree_snapping::KEY);
    store.put(anarchy_flags::KEY, anarchy_flags::encode(&ctx.attributes));
    report.written.push(anarchy_flags::KEY);

    info!("saved tree data: {:?}", report.written);
    report
}
