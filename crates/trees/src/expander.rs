//! Replaces the host's fixed-capacity tree buffer with a larger one.

use std::fmt;

use bevy::log::info;

use crate::config::TREE_INDEX_SPACE;
use crate::tree_buffer::TreeBuffer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandError {
    BelowNative { requested: u32, native: u32 },
    IndexSpace { requested: u32 },
}

impl fmt::Display for ExpandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpandError::BelowNative { requested, native } => write!(
                f,
                "cannot expand tree buffer to {requested}: native capacity is {native}"
            ),
            ExpandError::IndexSpace { requested } => write!(
                f,
                "cannot expand tree buffer to {requested}: exceeds 24-bit tree index space"
            ),
        }
    }
}

impl std::error::Error for ExpandError {}

/// Copies the essential fields of every occupied tree in `[1, native)` from
/// `old` to `new`. Y position and fire state are left for terrain snapping and
/// the burning list to rebuild.
pub fn copy_native_range(old: &TreeBuffer, new: &mut TreeBuffer, native: u32) {
    let end = native.min(old.len()).min(new.len());
    for index in 1..end {
        let source = old.get(index);
        if !source.is_occupied() {
            continue;
        }
        let target = new.get_mut(index);
        target.flags = source.flags;
        target.info_index = source.info_index;
        target.pos_x = source.pos_x;
        target.pos_z = source.pos_z;
    }
}

/// Produces a buffer of `new_capacity` slots holding `old`'s native-range
/// trees. Expanding to the current length is a no-op.
pub fn expand(old: &TreeBuffer, native: u32, new_capacity: u32) -> Result<TreeBuffer, ExpandError> {
    if new_capacity < native {
        return Err(ExpandError::BelowNative {
            requested: new_capacity,
            native,
        });
    }
    if new_capacity > TREE_INDEX_SPACE {
        return Err(ExpandError::IndexSpace {
            requested: new_capacity,
        });
    }
    if new_capacity == old.len() {
        return Ok(old.clone());
    }

    info!(
        "expanding tree buffer from {} to {} slots",
        old.len(),
        new_capacity
    );
    let mut expanded = TreeBuffer::with_sentinel(new_capacity);
    copy_native_range(old, &mut expanded, native);
    expanded.recalculate_unused();
    Ok(expanded)
}
