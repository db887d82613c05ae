use bevy::log::{error, info, warn};
use bevy::prelude::Resource;
use trees::{
    expand, finish_loading, BulkUpdateReport, ConfigError, TreeDataContext, TreeHost, TreeManager,
};

use crate::codec::{ContainerDecoder, DecodeInput, TreeCodec};
use crate::containers::{anarchy_flags, tree_scaling, tree_snapping};
use crate::data_store::DataStore;
use crate::prefab_codec::SimulationPrefabs;
use crate::save_error::SaveError;
use crate::selector::{select, Selection, SelectorState};

/// Summary of the last tree load, kept as a resource for diagnostics.
#[derive(Resource, Debug, Clone, Default)]
pub struct TreeLoadReport {
    /// Selector states in visiting order.
    pub trace: Vec<SelectorState>,
    /// Container that supplied the buffer, if any.
    pub source: Option<TreeCodec>,
    /// Final buffer capacity.
    pub capacity: u32,
    /// Slot count recorded by the source container.
    pub saved_len: Option<u32>,
    /// `(container key, error)` for every container that failed.
    pub failures: Vec<(&'static str, String)>,
    /// Overlay keys applied successfully.
    pub overlays: Vec<&'static str>,
    pub bulk: BulkUpdateReport,
}

impl TreeLoadReport {
    pub fn terminal_state(&self) -> Option<SelectorState> {
        self.trace.last().copied()
    }

    fn fail(&mut self, key: &'static str, stage: &str, err: &SaveError) {
        warn!("{key}: {stage} failed: {err}");
        self.failures.push((key, err.to_string()));
    }
}

/// Loads the tree buffer for the save in `store` into `manager`.
///
/// `manager` must hold the host's freshly loaded native buffer. Container
/// errors never abort the load; they are logged and recorded on the report.
/// Only an invalid configured limit is returned as an error, before anything
/// is touched.
pub fn load_trees(
    store: &dyn DataStore,
    manager: &mut TreeManager,
    ctx: &mut TreeDataContext,
    prefabs: &mut SimulationPrefabs,
    host: &mut dyn TreeHost,
    decoder: &mut dyn ContainerDecoder,
) -> Result<TreeLoadReport, ConfigError> {
    let native = ctx.native_capacity;
    ctx.settings.validate(native)?;

    let mut report = TreeLoadReport::default();

    let outcome = {
        let input = DecodeInput {
            native_capacity: native,
            configured_limit: ctx.settings.tree_limit,
            vanilla: &manager.trees,
        };
        select(
            store,
            &input,
            ctx.settings.ignore_tree_anarchy_data,
            prefabs,
            decoder,
        )
    };
    for (codec, err) in &outcome.rejected {
        report.fail(codec.key(), "decode", err);
    }
    report.trace = outcome.trace;

    let mut scale_overrides = Vec::new();
    match outcome.selection {
        Selection::Decoded { codec, populated } => {
            info!(
                "{} supplied {} tree slots",
                codec.key(),
                populated.trees.len()
            );
            report.source = Some(codec);
            report.saved_len = Some(populated.saved_len);
            manager.install_buffer(populated.trees);
            manager.burning_trees = populated.burning_trees;
            scale_overrides = populated.scale_overrides;
        }
        Selection::Expand { capacity } => match expand(&manager.trees, native, capacity) {
            Ok(trees) => {
                manager.install_buffer(trees);
            }
            Err(err) => error!("keeping native tree buffer: {err}"),
        },
        Selection::KeepNative => {}
    }

    let capacity = manager.trees.len();
    report.capacity = capacity;
    ctx.resize_attributes(capacity);
    for (index, scale) in scale_overrides {
        if index < capacity {
            ctx.attributes.set_scale(index, scale);
        }
    }

    apply_overlays(store, manager, ctx, host, &mut report);

    report.bulk = finish_loading(manager, ctx, host);
    info!(
        "tree load finished: {:?}, capacity {capacity}, {} occupied",
        report.terminal_state(),
        manager.trees.occupied_count()
    );
    Ok(report)
}

fn apply_overlays(
    store: &dyn DataStore,
    manager: &mut TreeManager,
    ctx: &mut TreeDataContext,
    host: &mut dyn TreeHost,
    report: &mut TreeLoadReport,
) {
    if let Some(blob) = store.get(anarchy_flags::KEY) {
        match anarchy_flags::apply(blob, &mut ctx.attributes) {
            Ok(words) => {
                info!("restored {words} override flag words");
                report.overlays.push(anarchy_flags::KEY);
            }
            Err(err) => report.fail(anarchy_flags::KEY, "apply", &err),
        }
    }

    if let Some(blob) = store.get(tree_scaling::KEY) {
        match tree_scaling::apply(blob, &mut ctx.attributes) {
            Ok(applied) => {
                info!("restored {applied} tree scales");
                report.overlays.push(tree_scaling::KEY);
            }
            Err(err) => report.fail(tree_scaling::KEY, "apply", &err),
        }
    }

    if let Some(blob) = store.get(tree_snapping::KEY) {
        match tree_snapping::apply(blob, manager, host) {
            Ok(outcome) => {
                info!(
                    "snapping: {} heights restored, {} cleared",
                    outcome.positioned, outcome.cleared
                );
                report.overlays.push(tree_snapping::KEY);
            }
            Err(err) => report.fail(tree_snapping::KEY, "apply", &err),
        }
    }
}
