use trees::{expand, TreeDataContext, TreeFlags, TreeManager};

use super::{load_trees, TreeLoadReport};
use super::test_host::{context, manager_with, tree, TestHost};
use crate::codec::{StandardDecoder, TreeCodec};
use crate::containers::unlimited_trees::WordStream;
use crate::containers::{anarchy_flags, expanded_data, tree_anarchy, tree_scaling, tree_snapping};
use crate::data_serializer::serialize_container;
use crate::data_store::{DataStore, SerializableData};
use crate::encoded_array::write_column;
use crate::prefab_codec::SimulationPrefabs;
use crate::selector::SelectorState;

const NATIVE: u32 = 4;

fn vanilla() -> TreeManager {
    manager_with(
        NATIVE,
        &[
            (1, tree(0, 10, 10, 0)),
            (2, tree(0, 20, 20, 0)),
            (3, tree(0, 30, 30, 0)),
        ],
    )
}

/// Tree Anarchy v6 save of 10 slots: the vanilla trees plus a pinned tree at
/// 5 and a plain one at 8.
fn anarchy_blob() -> Vec<u8> {
    let mut saved = expand(&vanilla().trees, NATIVE, 10).unwrap();
    let mut pinned = tree(1, 50, 51, 640);
    pinned.set_flag(TreeFlags::FIXED_HEIGHT, true);
    *saved.get_mut(5) = pinned;
    *saved.get_mut(8) = tree(1, 80, 81, 0);
    saved.recalculate_unused();

    let mut prefabs = SimulationPrefabs::default();
    prefabs.intern("Oak");
    prefabs.intern("Palm");
    tree_anarchy::encode_fixture(6, &saved, NATIVE, &[0.0, 0.0, 0.0, 1.0, -0.5], &[], &prefabs)
}

fn load(
    store: &SerializableData,
    limit: u32,
    ignore_anarchy: bool,
) -> (TreeManager, TreeDataContext, TreeLoadReport, TestHost) {
    let mut manager = vanilla();
    let mut ctx = context(NATIVE, limit);
    ctx.settings.ignore_tree_anarchy_data = ignore_anarchy;
    let mut host = TestHost {
        terrain: 1.0,
        ..Default::default()
    };
    let report = load_trees(
        store,
        &mut manager,
        &mut ctx,
        &mut SimulationPrefabs::default(),
        &mut host,
        &mut StandardDecoder,
    )
    .unwrap();
    (manager, ctx, report, host)
}

#[test]
fn test_tree_anarchy_import_carries_heights_and_scales() {
    let mut store = SerializableData::default();
    store.put(tree_anarchy::KEY, anarchy_blob());

    let (manager, ctx, report, _) = load(&store, NATIVE, false);

    assert_eq!(report.terminal_state(), Some(SelectorState::LegacyBFound));
    assert_eq!(report.source, Some(TreeCodec::TreeAnarchy));
    assert_eq!(manager.trees.len(), 10);
    assert_eq!(manager.trees.get(5).pos_y, 640);
    assert!(manager.trees.get(5).fixed_height());
    assert_eq!(manager.trees.get(8).info_index, 1);
    assert_eq!(ctx.attributes.get_scale(1), 64);
    assert_eq!(ctx.attributes.get_scale(5), 128);
    assert_eq!(ctx.attributes.get_scale(8), 32);
    // Tree 8 had no fixed height and gets terrain height (1.0 world unit).
    assert_eq!(manager.trees.get(8).pos_y, 64);
}

#[test]
fn test_scaling_overlay_overrides_legacy_scales() {
    let mut store = SerializableData::default();
    store.put(tree_anarchy::KEY, anarchy_blob());
    store.put(
        tree_scaling::KEY,
        serialize_container(tree_scaling::SERIALIZER_VERSION, |w| {
            w.write_i32(0);
            w.write_i32(6);
            for value in [1.0f32, 1.0, 1.0, 1.0, 1.0, 3.0] {
                w.write_f32(value);
            }
        }),
    );

    let (_, ctx, report, _) = load(&store, NATIVE, false);

    assert_eq!(report.overlays, vec![tree_scaling::KEY]);
    assert_eq!(ctx.attributes.get_scale(5), 192);
    // Beyond the overlay's length the legacy value stays.
    assert_eq!(ctx.attributes.get_scale(8), 32);
}

#[test]
fn test_ignored_tree_anarchy_falls_back_to_expansion() {
    let mut store = SerializableData::default();
    store.put(tree_anarchy::KEY, anarchy_blob());

    let (manager, _, report, _) = load(&store, 8, true);

    assert_eq!(
        report.terminal_state(),
        Some(SelectorState::ConfiguredLimitAboveNative)
    );
    assert_eq!(manager.trees.len(), 8);
    assert!(!manager.trees.get(5).is_occupied());
}

#[test]
fn test_unlimited_trees_import() {
    let mut stream = WordStream::new(2);
    stream.int(12).tree(1, 0, 5, 6).word(0).tree(1, 0, 7, 8);
    let mut store = SerializableData::default();
    store.put(TreeCodec::UnlimitedTrees.key(), stream.0);

    let (manager, ctx, report, _) = load(&store, NATIVE, false);

    assert_eq!(report.terminal_state(), Some(SelectorState::LegacyCValid));
    assert_eq!(manager.trees.len(), 12);
    assert_eq!(ctx.attributes.capacity(), 12);
    assert_eq!(manager.trees.get(4).pos_x, 5);
    assert_eq!(manager.trees.get(6).pos_z, 8);
    assert_eq!(manager.trees.get(2).pos_x, 20, "vanilla range kept");
    assert_eq!(manager.trees.occupied_count(), 5);
}

#[test]
fn test_snapping_sentinel_releases_pinned_tree_to_terrain() {
    let mut source = manager_with(8, &[(5, tree(0, 50, 50, 0))]);
    source.trees.get_mut(5).set_flag(TreeFlags::FIXED_HEIGHT, true);
    let mut store = SerializableData::default();
    let mut prefabs = SimulationPrefabs::default();
    prefabs.intern("Oak");
    store.put(
        expanded_data::KEY,
        expanded_data::encode(&source, NATIVE, &prefabs).unwrap(),
    );
    store.put(
        tree_snapping::KEY,
        serialize_container(tree_snapping::SERIALIZER_VERSION, |w| {
            w.write_i32(8);
            write_column(w, &[0u16, 0, 0, 0, 0, 0xFFFF, 0, 0]);
        }),
    );

    let (manager, _, report, host) = load(&store, NATIVE, false);

    assert!(!manager.trees.get(5).fixed_height());
    assert_eq!(manager.trees.get(5).pos_y, 64);
    assert!(host.rendered.contains(&5));
    assert_eq!(report.overlays, vec![tree_snapping::KEY]);
}

#[test]
fn test_broken_overlay_is_reported_and_others_apply() {
    let mut store = SerializableData::default();
    store.put(
        anarchy_flags::KEY,
        serialize_container(anarchy_flags::SERIALIZER_VERSION, |w| {
            w.write_i32(0);
            w.write_i32(50);
        }),
    );
    store.put(
        tree_scaling::KEY,
        serialize_container(tree_scaling::SERIALIZER_VERSION, |w| {
            w.write_i32(0);
            w.write_i32(2);
            w.write_f32(1.0);
            w.write_f32(2.0);
        }),
    );

    let (_, ctx, report, _) = load(&store, NATIVE, false);

    assert_eq!(report.failures.len(), 1);
    let (key, msg) = &report.failures[0];
    assert_eq!(*key, anarchy_flags::KEY);
    assert!(msg.contains("50"), "got: {msg}");
    assert_eq!(report.overlays, vec![tree_scaling::KEY]);
    assert_eq!(ctx.attributes.get_scale(1), 128);
}
