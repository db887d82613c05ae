// ---------------------------------------------------------------------------
// tree_snapping – fixed-height overlay ("TreeSnapping")
// ---------------------------------------------------------------------------
//
// Serializer version 1. Payload: i32 length, encoded u16 column with the Y
// position of every slot in [0, length). 0x0000 and 0xFFFF mean "no height":
// such trees lose FIXED_HEIGHT.

use trees::{TreeFlags, TreeHost, TreeManager};

use super::read_len;
use crate::data_serializer::{open_container, serialize_container};
use crate::encoded_array::{read_column, write_column};
use crate::save_error::SaveError;

pub const KEY: &str = "TreeSnapping";
pub const SERIALIZER_VERSION: u32 = 1;

const NO_HEIGHT: [u16; 2] = [0x0000, 0xFFFF];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnappingOutcome {
    pub positioned: u32,
    pub cleared: u32,
}

pub fn encode(manager: &TreeManager) -> Vec<u8> {
    let heights: Vec<u16> = manager.trees.items().iter().map(|t| t.pos_y).collect();
    serialize_container(SERIALIZER_VERSION, |w| {
        w.write_i32(heights.len() as i32);
        write_column(w, &heights);
    })
}

pub fn apply(
    blob: &[u8],
    manager: &mut TreeManager,
    host: &mut dyn TreeHost,
) -> Result<SnappingOutcome, SaveError> {
    let (version, mut r) = open_container(blob)?;
    if version > SERIALIZER_VERSION {
        return Err(SaveError::VersionMismatch {
            container: KEY,
            expected_max: SERIALIZER_VERSION,
            found: version,
        });
    }
    let len = read_len(&mut r, KEY)?;
    let heights = read_column::<u16>(&mut r)?;
    if heights.len() < len {
        return Err(SaveError::size(
            KEY,
            format!("declared {len} heights, column holds {}", heights.len()),
        ));
    }

    let mut outcome = SnappingOutcome::default();
    let end = len.min(manager.trees.len() as usize);
    for (index, &height) in heights[..end].iter().enumerate() {
        let index = index as u32;
        let tree = manager.trees.get_mut(index);
        if !tree.is_occupied() {
            continue;
        }
        if NO_HEIGHT.contains(&height) {
            if !tree.fixed_height() {
                continue;
            }
            tree.set_flag(TreeFlags::FIXED_HEIGHT, false);
            outcome.cleared += 1;
        } else {
            tree.pos_y = height;
            outcome.positioned += 1;
        }
        manager.mark_updated(index);
        host.update_tree_render(index);
    }
    Ok(outcome)
}
