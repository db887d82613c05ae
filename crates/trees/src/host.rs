//! Services the host game provides to the tree core.
//!
//! Terrain sampling, collision queries and render/district bookkeeping stay on
//! the host side; the core only calls through [`TreeHost`].

use bevy::math::Vec2;

/// Collection a tree is tested against for overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlapLayer {
    Networks,
    Buildings,
}

/// Four XZ corners of an overlap footprint, counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub a: Vec2,
    pub b: Vec2,
    pub c: Vec2,
    pub d: Vec2,
}

impl Quad {
    /// Axis-aligned square of half-size `radius` around `center`.
    pub fn around(center: Vec2, radius: f32) -> Self {
        Self {
            a: center + Vec2::new(-radius, -radius),
            b: center + Vec2::new(radius, -radius),
            c: center + Vec2::new(radius, radius),
            d: center + Vec2::new(-radius, radius),
        }
    }

    pub fn min(&self) -> Vec2 {
        self.a.min(self.b).min(self.c).min(self.d)
    }

    pub fn max(&self) -> Vec2 {
        self.a.max(self.b).max(self.c).max(self.d)
    }
}

/// Unscaled collision size of a tree prefab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeFootprint {
    pub radius: f32,
    pub height: f32,
}

pub trait TreeHost {
    /// Terrain height in world units at world `(x, z)`.
    fn sample_terrain_height(&self, x: f32, z: f32) -> f32;

    /// Whether anything on `layer` intersects `quad` between `min_y` and `max_y`.
    fn overlaps(&self, quad: &Quad, min_y: f32, max_y: f32, layer: OverlapLayer) -> bool;

    /// Footprint of the prefab at `info_index`, `None` if it is not loaded.
    fn tree_footprint(&self, info_index: u16) -> Option<TreeFootprint>;

    /// Adjusts the live-tree count of the district containing `(x, z)`.
    fn adjust_district_trees(&mut self, x: f32, z: f32, delta: i32);

    /// Host-side teardown for a tree the core has just released.
    fn release_tree(&mut self, index: u32);

    /// Requests a render/group refresh for the tree at `index`.
    fn update_tree_render(&mut self, index: u32);
}
