use trees::config::SCALE_BASELINE;
use trees::{ConfigError, OverlapMode, TreeInstance};

use super::test_host::{context, manager_with, tree, world_of, TestHost};
use super::load_trees;
use crate::codec::{StandardDecoder, TreeCodec};
use crate::containers::expanded_data;
use crate::data_store::{DataStore, SerializableData};
use crate::prefab_codec::SimulationPrefabs;
use crate::selector::SelectorState;

fn plain(info: u16, x: i16, z: i16) -> TreeInstance {
    TreeInstance {
        flags: 1,
        info_index: info,
        pos_x: x,
        pos_z: z,
        pos_y: 0,
    }
}

#[test]
fn test_fresh_expansion_native_four_to_eight() {
    let vanilla = [(1, plain(0, 10, 11)), (2, plain(1, 20, 21)), (3, plain(2, 30, 31))];
    let mut manager = manager_with(4, &vanilla);
    let mut ctx = context(4, 8);
    let mut host = TestHost::default();

    let report = load_trees(
        &SerializableData::default(),
        &mut manager,
        &mut ctx,
        &mut SimulationPrefabs::default(),
        &mut host,
        &mut StandardDecoder,
    )
    .unwrap();

    assert_eq!(
        report.terminal_state(),
        Some(SelectorState::ConfiguredLimitAboveNative)
    );
    assert_eq!(report.source, None);
    assert_eq!(manager.trees.len(), 8);
    for (index, expected) in vanilla {
        let got = manager.trees.get(index);
        assert_eq!(
            (got.flags, got.info_index, got.pos_x, got.pos_z),
            (expected.flags, expected.info_index, expected.pos_x, expected.pos_z)
        );
    }
    for index in 4..8 {
        assert_eq!(*manager.trees.get(index), TreeInstance::default());
    }
    assert_eq!(manager.trees.unused_count(), 4);
    assert_eq!(ctx.attributes.capacity(), 8);
    assert!(ctx.attributes.scales().iter().all(|&b| b == SCALE_BASELINE));
    assert!((0..8).all(|i| !ctx.attributes.get_flag(i)));
    assert_eq!(manager.updated_trees.len(), 1);
}

#[test]
fn test_limit_at_native_keeps_buffer() {
    let mut manager = manager_with(4, &[(2, plain(0, 1, 1))]);
    let before = manager.trees.checksum();
    let mut ctx = context(4, 4);

    let report = load_trees(
        &SerializableData::default(),
        &mut manager,
        &mut ctx,
        &mut SimulationPrefabs::default(),
        &mut TestHost::default(),
        &mut StandardDecoder,
    )
    .unwrap();

    assert_eq!(
        report.terminal_state(),
        Some(SelectorState::ConfiguredLimitAtNative)
    );
    assert_eq!(manager.trees.checksum(), before);
    assert_eq!(ctx.attributes.capacity(), 4);
}

#[test]
fn test_invalid_limit_fails_before_touching_state() {
    let mut manager = manager_with(4, &[(1, plain(0, 1, 1))]);
    let before = manager.trees.checksum();
    let mut ctx = context(4, 4);
    ctx.settings.tree_limit = 64;

    let err = load_trees(
        &SerializableData::default(),
        &mut manager,
        &mut ctx,
        &mut SimulationPrefabs::default(),
        &mut TestHost::default(),
        &mut StandardDecoder,
    )
    .unwrap_err();

    assert_eq!(
        err,
        ConfigError::LimitAboveMaximum {
            limit: 64,
            maximum: 32
        }
    );
    assert_eq!(manager.trees.checksum(), before);
    assert_eq!(manager.trees.len(), 4);
}

#[test]
fn test_terrain_positions_unplaced_trees() {
    let mut manager = manager_with(4, &[(1, plain(0, 1, 1)), (2, tree(0, 2, 2, 300))]);
    let mut ctx = context(4, 8);
    let mut host = TestHost {
        terrain: 2.5,
        ..Default::default()
    };

    let report = load_trees(
        &SerializableData::default(),
        &mut manager,
        &mut ctx,
        &mut SimulationPrefabs::default(),
        &mut host,
        &mut StandardDecoder,
    )
    .unwrap();

    // Expansion does not carry Y: both native trees are re-placed.
    assert_eq!(report.bulk.positioned, 2);
    assert_eq!(manager.trees.get(1).pos_y, 160);
    assert_eq!(manager.trees.get(2).pos_y, 160);
}

#[test]
fn test_overlap_delete_frees_expanded_slot() {
    let mut source = manager_with(8, &[(5, tree(0, 100, 100, 64)), (6, tree(0, -300, 40, 64))]);
    source.burning_trees.push(trees::BurningTree {
        tree_index: 5,
        fire_intensity: 0,
        fire_damage: 9,
    });
    let mut store = SerializableData::default();
    let mut prefabs = SimulationPrefabs::default();
    prefabs.intern("Oak");
    store.put(
        expanded_data::KEY,
        expanded_data::encode(&source, 4, &prefabs).unwrap(),
    );

    let mut manager = manager_with(4, &[]);
    let mut ctx = context(4, 4);
    ctx.settings.network_overlap = OverlapMode::Delete;
    let mut host = TestHost {
        networks: vec![world_of(100, 100)],
        ..Default::default()
    };

    let report = load_trees(
        &store,
        &mut manager,
        &mut ctx,
        &mut prefabs,
        &mut host,
        &mut StandardDecoder,
    )
    .unwrap();

    assert_eq!(report.source, Some(TreeCodec::Expanded));
    assert_eq!(report.bulk.deleted, 1);
    assert!(!manager.trees.get(5).is_occupied());
    assert!(manager.trees.is_unused(5));
    assert!(manager.trees.get(6).is_occupied());
    assert!(manager.burning_trees.is_empty());
    assert_eq!(host.released, vec![5]);
}
