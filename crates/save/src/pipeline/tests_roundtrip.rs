use trees::{BurningTree, TreeDataContext, TreeFlags, TreeManager};

use super::test_host::{context, manager_with, tree, TestHost};
use super::{load_trees, save_trees};
use crate::codec::{StandardDecoder, TreeCodec};
use crate::containers::{anarchy_flags, expanded_data, tree_scaling, tree_snapping};
use crate::data_store::{DataStore, SerializableData};
use crate::prefab_codec::SimulationPrefabs;
use crate::selector::SelectorState;

const NATIVE: u32 = 4;

/// A session that ran with limit 8: two vanilla trees, three expanded ones,
/// one of them on fire.
fn session() -> (TreeManager, TreeDataContext, SimulationPrefabs) {
    let mut burning = tree(1, 60, 61, 900);
    burning.set_flag(TreeFlags::FIRE_DAMAGE, true);
    burning.set_flag(TreeFlags::BURNING, true);
    let mut pinned = tree(0, 70, -71, 1200);
    pinned.set_flag(TreeFlags::FIXED_HEIGHT, true);

    let mut manager = manager_with(
        8,
        &[
            (1, tree(0, 10, 11, 100)),
            (2, tree(1, -20, 21, 200)),
            (4, tree(1, 40, 41, 400)),
            (6, burning),
            (7, pinned),
        ],
    );
    manager.burning_trees.push(BurningTree {
        tree_index: 6,
        fire_intensity: 3,
        fire_damage: 1,
    });

    let mut ctx = context(NATIVE, 8);
    ctx.resize_attributes(8);
    ctx.attributes.set_scale(4, 128);
    ctx.attributes.set_scale(7, 40);
    ctx.attributes.set_flag(2, true);
    ctx.attributes.set_flag(6, true);

    let mut prefabs = SimulationPrefabs::default();
    prefabs.intern("Oak");
    prefabs.intern("Pine");
    (manager, ctx, prefabs)
}

/// What the host has after loading its own data: the native range only.
fn vanilla_of(source: &TreeManager) -> TreeManager {
    let trees: Vec<_> = (1..NATIVE)
        .map(|i| (i, *source.trees.get(i)))
        .filter(|(_, t)| t.is_occupied())
        .collect();
    manager_with(NATIVE, &trees)
}

#[test]
fn test_save_then_load_restores_session() {
    let (source, source_ctx, source_prefabs) = session();
    let mut store = SerializableData::default();
    let saved = save_trees(&mut store, &source, &source_ctx, &source_prefabs);
    assert_eq!(saved.written.len(), 4);

    let mut manager = vanilla_of(&source);
    let mut ctx = context(NATIVE, NATIVE);
    let mut prefabs = SimulationPrefabs::default();
    let mut host = TestHost::default();
    let report = load_trees(
        &store,
        &mut manager,
        &mut ctx,
        &mut prefabs,
        &mut host,
        &mut StandardDecoder,
    )
    .unwrap();

    assert_eq!(report.terminal_state(), Some(SelectorState::NativeFound));
    assert_eq!(report.source, Some(TreeCodec::Expanded));
    assert_eq!(report.saved_len, Some(8));
    assert!(report.failures.is_empty(), "got: {:?}", report.failures);
    assert_eq!(
        report.overlays,
        vec![anarchy_flags::KEY, tree_scaling::KEY, tree_snapping::KEY]
    );

    assert_eq!(manager.trees.len(), 8);
    for index in 1..8 {
        let (got, want) = (manager.trees.get(index), source.trees.get(index));
        assert_eq!(
            (got.flags, got.info_index, got.pos_x, got.pos_z, got.pos_y),
            (want.flags, want.info_index, want.pos_x, want.pos_z, want.pos_y),
            "tree {index}"
        );
    }
    assert_eq!(manager.burning_trees, source.burning_trees);
    assert_eq!(ctx.attributes.scales(), source_ctx.attributes.scales());
    assert_eq!(ctx.attributes.words(), source_ctx.attributes.words());
    assert_eq!(prefabs.name(1), Some("Pine"));
    assert_eq!(report.bulk.positioned, 0);
}

#[test]
fn test_second_save_is_byte_identical() {
    let (source, source_ctx, source_prefabs) = session();
    let mut first = SerializableData::default();
    save_trees(&mut first, &source, &source_ctx, &source_prefabs);

    let mut manager = vanilla_of(&source);
    let mut ctx = context(NATIVE, NATIVE);
    let mut prefabs = SimulationPrefabs::default();
    load_trees(
        &first,
        &mut manager,
        &mut ctx,
        &mut prefabs,
        &mut TestHost::default(),
        &mut StandardDecoder,
    )
    .unwrap();

    let mut second = SerializableData::default();
    save_trees(&mut second, &manager, &ctx, &prefabs);
    assert_eq!(first, second);
}

#[test]
fn test_loaded_capacity_respects_larger_configured_limit() {
    let (source, source_ctx, source_prefabs) = session();
    let mut store = SerializableData::default();
    save_trees(&mut store, &source, &source_ctx, &source_prefabs);

    let mut manager = vanilla_of(&source);
    let mut ctx = context(NATIVE, 16);
    load_trees(
        &store,
        &mut manager,
        &mut ctx,
        &mut SimulationPrefabs::default(),
        &mut TestHost::default(),
        &mut StandardDecoder,
    )
    .unwrap();

    assert_eq!(manager.trees.len(), 16);
    assert_eq!(ctx.attributes.capacity(), 16);
    assert_eq!(manager.trees.get(7).pos_x, 70);
    assert_eq!(manager.trees.unused_count(), 15 - 5);
}

#[test]
fn test_corrupt_expansion_falls_back_and_overlays_survive() {
    let (source, source_ctx, source_prefabs) = session();
    let mut store = SerializableData::default();
    save_trees(&mut store, &source, &source_ctx, &source_prefabs);
    let mut blob = store.get(expanded_data::KEY).unwrap().to_vec();
    blob.truncate(blob.len() / 2);
    store.put(expanded_data::KEY, blob);

    let mut manager = vanilla_of(&source);
    let mut ctx = context(NATIVE, 8);
    let report = load_trees(
        &store,
        &mut manager,
        &mut ctx,
        &mut SimulationPrefabs::default(),
        &mut TestHost::default(),
        &mut StandardDecoder,
    )
    .unwrap();

    assert_eq!(
        report.terminal_state(),
        Some(SelectorState::ConfiguredLimitAboveNative)
    );
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, expanded_data::KEY);
    // Expanded trees are lost, vanilla ones keep their saved heights.
    assert!(!manager.trees.get(4).is_occupied());
    assert_eq!(manager.trees.get(2).pos_y, 200);
    assert_eq!(ctx.attributes.get_scale(4), 128);
}

#[test]
fn test_rejected_expansion_leaves_prefab_refcounts_unchanged() {
    let (source, source_ctx, source_prefabs) = session();
    let mut store = SerializableData::default();
    save_trees(&mut store, &source, &source_ctx, &source_prefabs);
    let mut blob = store.get(expanded_data::KEY).unwrap().to_vec();
    // The last byte belongs to the burning list, read after the prefab column.
    blob.pop();
    store.put(expanded_data::KEY, blob);

    let mut manager = vanilla_of(&source);
    let mut ctx = context(NATIVE, 8);
    let mut prefabs = source_prefabs.clone();
    let report = load_trees(
        &store,
        &mut manager,
        &mut ctx,
        &mut prefabs,
        &mut TestHost::default(),
        &mut StandardDecoder,
    )
    .unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(prefabs, source_prefabs);
}
