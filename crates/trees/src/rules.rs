//! Small policy helpers the host calls while trees are edited at runtime.

use crate::manager::TreeDataContext;
use crate::settings::TreeSettings;
use crate::tree_instance::TreeInstance;

/// Writes a grow state. With anarchy enabled a tree is never fully hidden by
/// the host, so 0 becomes 1.
pub fn set_grow_state(tree: &mut TreeInstance, value: u16, anarchy: bool) {
    let value = if anarchy && value == 0 { 1 } else { value };
    tree.write_grow_state(value);
}

/// Height a tree should take after the terrain beneath it changed.
pub fn calculate_elevation(
    terrain_y: f32,
    tree_y: f32,
    terrain_tool_active: bool,
    settings: &TreeSettings,
) -> f32 {
    if settings.update_on_terrain {
        if terrain_tool_active {
            terrain_y
        } else {
            tree_y
        }
    } else if settings.keep_above_ground {
        terrain_y.max(tree_y)
    } else {
        tree_y
    }
}

/// Whether a collision should hide the tree at `index`. Trees the user
/// explicitly unhid keep their override.
pub fn overlap_hides_tree(ctx: &TreeDataContext, index: u32, overlapping: bool) -> bool {
    overlapping && ctx.settings.hide_on_load && !ctx.attributes.get_flag(index)
}
