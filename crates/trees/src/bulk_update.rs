// ---------------------------------------------------------------------------
// End-of-load corrective pass: terrain positioning and overlap policies.
// ---------------------------------------------------------------------------

use bevy::log::{debug, info};
use bevy::math::Vec2;

use crate::config::{POSITION_Y_UNITS, SCALE_BASELINE};
use crate::host::{OverlapLayer, Quad, TreeHost};
use crate::manager::{TreeDataContext, TreeManager};
use crate::settings::{LoadingForceMode, OverlapMode};

/// Counts of what [`finish_loading`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkUpdateReport {
    pub positioned: u32,
    pub unhidden: u32,
    pub hidden: u32,
    pub deleted: u32,
}

impl BulkUpdateReport {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

enum Visibility {
    Show,
    Hide,
}

/// Runs once after the format selector and the overlay containers. Network
/// policy is evaluated before building policy and both may act on the same
/// tree; a deleted tree is not tested further.
pub fn finish_loading(
    manager: &mut TreeManager,
    ctx: &mut TreeDataContext,
    host: &mut dyn TreeHost,
) -> BulkUpdateReport {
    let mut report = BulkUpdateReport::default();
    let occupied: Vec<u32> = manager.trees.occupied().collect();

    let policies = [
        (ctx.settings.network_overlap, OverlapLayer::Networks),
        (ctx.settings.building_overlap, OverlapLayer::Buildings),
    ];
    let force = ctx.settings.loading_force_mode;

    for index in occupied {
        if position_from_terrain(manager, host, index) {
            report.positioned += 1;
        }

        match force {
            LoadingForceMode::None => {}
            LoadingForceMode::UnhideAll => {
                apply_visibility(manager, ctx, host, index, Visibility::Show, &mut report)
            }
            LoadingForceMode::HideAll => {
                apply_visibility(manager, ctx, host, index, Visibility::Hide, &mut report)
            }
        }

        for (mode, layer) in policies {
            if mode == OverlapMode::None || !manager.trees.get(index).is_occupied() {
                continue;
            }
            if !overlaps_layer(manager, ctx, host, index, layer) {
                continue;
            }
            match mode {
                OverlapMode::None => {}
                OverlapMode::Unhide => {
                    apply_visibility(manager, ctx, host, index, Visibility::Show, &mut report)
                }
                OverlapMode::Hide => {
                    apply_visibility(manager, ctx, host, index, Visibility::Hide, &mut report)
                }
                OverlapMode::Delete => {
                    delete_tree(manager, ctx, host, index);
                    report.deleted += 1;
                }
            }
        }
    }

    if !report.is_empty() {
        info!(
            "tree load pass: {} positioned, {} unhidden, {} hidden, {} deleted",
            report.positioned, report.unhidden, report.hidden, report.deleted
        );
    }
    report
}

/// Gives a never-positioned tree the terrain height under it.
fn position_from_terrain(manager: &mut TreeManager, host: &dyn TreeHost, index: u32) -> bool {
    let tree = manager.trees.get_mut(index);
    if tree.pos_y != 0 {
        return false;
    }
    let height = host.sample_terrain_height(tree.world_x(), tree.world_z());
    tree.pos_y = (height * POSITION_Y_UNITS).round().clamp(0.0, u16::MAX as f32) as u16;
    true
}

fn overlaps_layer(
    manager: &TreeManager,
    ctx: &TreeDataContext,
    host: &dyn TreeHost,
    index: u32,
    layer: OverlapLayer,
) -> bool {
    let tree = manager.trees.get(index);
    let Some(footprint) = host.tree_footprint(tree.info_index) else {
        debug!(
            "tree {index}: prefab {} not loaded, skipping overlap test",
            tree.info_index
        );
        return false;
    };
    let scale = ctx.attributes.scale_multiplier(index);
    let quad = Quad::around(
        Vec2::new(tree.world_x(), tree.world_z()),
        footprint.radius * scale,
    );
    let min_y = tree.world_y();
    host.overlaps(&quad, min_y, min_y + footprint.height * scale, layer)
}

fn apply_visibility(
    manager: &mut TreeManager,
    ctx: &mut TreeDataContext,
    host: &mut dyn TreeHost,
    index: u32,
    visibility: Visibility,
    report: &mut BulkUpdateReport,
) {
    let tree = manager.trees.get_mut(index);
    let was_visible = tree.is_visible();
    let (override_flag, delta) = match visibility {
        Visibility::Show => {
            if !was_visible {
                tree.write_grow_state(1);
            }
            (true, 1)
        }
        Visibility::Hide => {
            tree.write_grow_state(0);
            (false, -1)
        }
    };
    ctx.attributes.set_flag(index, override_flag);

    if was_visible == tree.is_visible() {
        return;
    }
    let (x, z) = (tree.world_x(), tree.world_z());
    host.adjust_district_trees(x, z, delta);
    host.update_tree_render(index);
    manager.mark_updated(index);
    if delta > 0 {
        report.unhidden += 1;
    } else {
        report.hidden += 1;
    }
}

fn delete_tree(
    manager: &mut TreeManager,
    ctx: &mut TreeDataContext,
    host: &mut dyn TreeHost,
    index: u32,
) {
    manager.burning_trees.retain(|b| b.tree_index != index);
    manager.trees.release_item(index);
    ctx.attributes.set_flag(index, false);
    ctx.attributes.set_scale(index, SCALE_BASELINE as i32);
    host.release_tree(index);
}
