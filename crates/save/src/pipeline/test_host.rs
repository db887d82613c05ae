//! In-memory host for pipeline tests.

use bevy::math::Vec2;
use bevy::prelude::Resource;
use trees::config::POSITION_XZ_SCALE;
use trees::{
    OverlapLayer, Quad, TreeDataContext, TreeFlags, TreeFootprint, TreeHost, TreeInstance,
    TreeManager, TreeSettings,
};

/// Flat terrain; networks are points in world XZ.
#[derive(Resource, Default)]
pub(crate) struct TestHost {
    pub terrain: f32,
    pub networks: Vec<Vec2>,
    pub released: Vec<u32>,
    pub rendered: Vec<u32>,
}

impl TreeHost for TestHost {
    fn sample_terrain_height(&self, _x: f32, _z: f32) -> f32 {
        self.terrain
    }

    fn overlaps(&self, quad: &Quad, _min_y: f32, _max_y: f32, layer: OverlapLayer) -> bool {
        if layer != OverlapLayer::Networks {
            return false;
        }
        let (min, max) = (quad.min(), quad.max());
        self.networks
            .iter()
            .any(|p| p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y)
    }

    fn tree_footprint(&self, _info_index: u16) -> Option<TreeFootprint> {
        Some(TreeFootprint {
            radius: 1.0,
            height: 10.0,
        })
    }

    fn adjust_district_trees(&mut self, _x: f32, _z: f32, _delta: i32) {}

    fn release_tree(&mut self, index: u32) {
        self.released.push(index);
    }

    fn update_tree_render(&mut self, index: u32) {
        self.rendered.push(index);
    }
}

/// World XZ of a tree placed with [`tree`].
pub(crate) fn world_of(x: i16, z: i16) -> Vec2 {
    Vec2::new(x as f32 * POSITION_XZ_SCALE, z as f32 * POSITION_XZ_SCALE)
}

/// A created, visible tree.
pub(crate) fn tree(info: u16, x: i16, z: i16, y: u16) -> TreeInstance {
    let mut tree = TreeInstance {
        flags: TreeFlags::CREATED.bits(),
        info_index: info,
        pos_x: x,
        pos_z: z,
        pos_y: y,
    };
    tree.write_grow_state(1);
    tree
}

/// Host manager of `capacity` slots holding `trees`, free list rebuilt.
pub(crate) fn manager_with(capacity: u32, trees: &[(u32, TreeInstance)]) -> TreeManager {
    let mut manager = TreeManager::new(capacity);
    for &(index, instance) in trees {
        *manager.trees.get_mut(index) = instance;
    }
    manager.trees.recalculate_unused();
    manager
}

pub(crate) fn context(native: u32, limit: u32) -> TreeDataContext {
    let mut settings = TreeSettings::default();
    settings.set_tree_limit(limit, native);
    TreeDataContext::new(native, settings)
}
