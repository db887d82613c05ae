// ---------------------------------------------------------------------------
// Containers: one module per keyed blob format
// ---------------------------------------------------------------------------
//
// Buffer formats (selected by `selector`):
//   - expanded_data    native expansion container
//   - tree_anarchy     legacy whole-buffer migration, import only
//   - unlimited_trees  legacy raw u16 stream, import only
//
// Overlay formats (applied after the buffer is settled):
//   - tree_scaling     per-tree scale floats
//   - tree_snapping    per-tree fixed heights
//   - anarchy_flags    packed override-flag words

pub mod anarchy_flags;
pub mod expanded_data;
pub mod tree_anarchy;
pub mod tree_scaling;
pub mod tree_snapping;
pub mod unlimited_trees;

use bevy::log::debug;
use trees::tree_instance::filter_burning_trees;
use trees::{copy_native_range, BurningTree, TreeBuffer, TreeFlags};

use crate::codec::DecodeInput;
use crate::data_serializer::{DataReader, DataWriter};
use crate::save_error::SaveError;

/// Bytes per serialized burning-list entry.
const BURNING_ENTRY_LEN: usize = 5;

/// Validates a saved buffer length read from a container.
pub(crate) fn checked_saved_len(
    container: &'static str,
    saved_len: i32,
    input: &DecodeInput<'_>,
) -> Result<u32, SaveError> {
    if saved_len <= input.native_capacity as i32 {
        return Err(SaveError::size(
            container,
            format!(
                "saved length {saved_len} does not exceed native capacity {}",
                input.native_capacity
            ),
        ));
    }
    let saved_len = saved_len as u32;
    if saved_len > input.max_limit() {
        return Err(SaveError::size(
            container,
            format!(
                "saved length {saved_len} exceeds the maximum {}",
                input.max_limit()
            ),
        ));
    }
    Ok(saved_len)
}

/// Fresh buffer of `capacity` slots holding the host's native-range trees.
/// The free list is left empty; callers recalculate it once populated.
pub(crate) fn allocate(input: &DecodeInput<'_>, capacity: u32) -> TreeBuffer {
    let mut trees = TreeBuffer::with_sentinel(capacity);
    copy_native_range(input.vanilla, &mut trees, input.native_capacity);
    trees
}

#[inline]
pub(crate) fn persistent_flags(raw: u16) -> u16 {
    raw & TreeFlags::PERSISTENT_MASK
}

pub(crate) fn write_burning_list(writer: &mut DataWriter, burning: &[BurningTree], len: u32) {
    let kept = filter_burning_trees(burning, len);
    writer.write_u24(kept.len() as u32);
    for entry in &kept {
        writer.write_u24(entry.tree_index);
        writer.write_u8(entry.fire_intensity);
        writer.write_u8(entry.fire_damage);
    }
}

/// Reads the burning list, keeping entries inside `(0, saved_len)` and
/// re-flagging their trees.
pub(crate) fn read_burning_list(
    reader: &mut DataReader<'_>,
    saved_len: u32,
    trees: &mut TreeBuffer,
) -> Result<Vec<BurningTree>, SaveError> {
    let count = reader.read_u24()? as usize;
    let mut burning = Vec::with_capacity(count.min(reader.remaining() / BURNING_ENTRY_LEN));
    let mut dropped = 0usize;
    for _ in 0..count {
        let entry = BurningTree {
            tree_index: reader.read_u24()?,
            fire_intensity: reader.read_u8()?,
            fire_damage: reader.read_u8()?,
        };
        if entry.tree_index == 0 || entry.tree_index >= saved_len {
            dropped += 1;
            continue;
        }
        let tree = trees.get_mut(entry.tree_index);
        tree.set_flag(TreeFlags::FIRE_DAMAGE, true);
        if entry.fire_intensity != 0 {
            tree.set_flag(TreeFlags::BURNING, true);
        }
        burning.push(entry);
    }
    if dropped > 0 {
        debug!("dropped {dropped} burning tree entries outside the saved range");
    }
    Ok(burning)
}

/// Fails before any state is touched when fewer than `count * width` bytes
/// remain.
pub(crate) fn ensure_remaining(
    reader: &DataReader<'_>,
    count: usize,
    width: usize,
) -> Result<(), SaveError> {
    let needed = count.saturating_mul(width);
    if needed > reader.remaining() {
        return Err(SaveError::UnexpectedEof {
            needed,
            remaining: reader.remaining(),
        });
    }
    Ok(())
}

/// Reads a length field that must not be negative.
pub(crate) fn read_len(reader: &mut DataReader<'_>, container: &'static str) -> Result<usize, SaveError> {
    let len = reader.read_i32()?;
    if len < 0 {
        return Err(SaveError::size(container, format!("negative length {len}")));
    }
    Ok(len as usize)
}
