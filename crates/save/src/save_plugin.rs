use bevy::prelude::*;
use trees::{TreeDataContext, TreeHost, TreeManager, TreesPlugin};

use crate::codec::StandardDecoder;
use crate::data_store::SerializableData;
use crate::pipeline::{load_trees, save_trees, TreeLoadReport, TreeSaveReport};
use crate::prefab_codec::SimulationPrefabs;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Sent by the host once its own save data (native trees included) is loaded.
#[derive(Event, Debug, Clone, Copy)]
pub struct LoadTreesEvent;

/// Sent by the host before it persists `SerializableData`.
#[derive(Event, Debug, Clone, Copy)]
pub struct SaveTreesEvent;

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Registers the keyed blob store, the prefab table, the load/save reports
/// and the save system.
///
/// Loading needs the host's [`TreeHost`] resource, so the host registers
/// [`handle_load_events`] itself:
///
/// ```ignore
/// app.add_plugins(TreeSavePlugin)
///     .add_systems(Update, handle_load_events::<GameTreeHost>);
/// ```
pub struct TreeSavePlugin;

impl Plugin for TreeSavePlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<TreesPlugin>() {
            app.add_plugins(TreesPlugin);
        }
        app.add_event::<LoadTreesEvent>()
            .add_event::<SaveTreesEvent>()
            .init_resource::<SerializableData>()
            .init_resource::<SimulationPrefabs>()
            .init_resource::<TreeLoadReport>()
            .init_resource::<TreeSaveReport>()
            .add_systems(Update, handle_save_events);
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Runs [`load_trees`] once per frame in which a [`LoadTreesEvent`] arrived.
pub fn handle_load_events<H: TreeHost + Resource>(
    mut events: EventReader<LoadTreesEvent>,
    store: Res<SerializableData>,
    mut manager: ResMut<TreeManager>,
    mut ctx: ResMut<TreeDataContext>,
    mut prefabs: ResMut<SimulationPrefabs>,
    mut host: ResMut<H>,
    mut report: ResMut<TreeLoadReport>,
) {
    if events.read().next().is_none() {
        return;
    }
    events.read().for_each(drop);

    match load_trees(
        &*store,
        &mut manager,
        &mut ctx,
        &mut prefabs,
        &mut *host,
        &mut StandardDecoder,
    ) {
        Ok(loaded) => *report = loaded,
        Err(e) => error!("Tree load aborted: {e}"),
    }
}

fn handle_save_events(
    mut events: EventReader<SaveTreesEvent>,
    mut store: ResMut<SerializableData>,
    manager: Res<TreeManager>,
    ctx: Res<TreeDataContext>,
    prefabs: Res<SimulationPrefabs>,
    mut report: ResMut<TreeSaveReport>,
) {
    if events.read().next().is_none() {
        return;
    }
    events.read().for_each(drop);

    *report = save_trees(&mut *store, &manager, &ctx, &prefabs);
}
