// ---------------------------------------------------------------------------
// tree_scaling – per-tree scale overlay ("TreeScaling")
// ---------------------------------------------------------------------------
//
// Payload: i32 data version (0), i32 length, f32 multiplier per tree.
// Zero or NaN multipliers read as 1.0; entries beyond the store are ignored.

use bevy::log::debug;
use trees::config::{FLOAT_TO_SCALE, SCALE_TO_FLOAT};
use trees::PackedAttributeStore;

use super::{ensure_remaining, read_len};
use crate::data_serializer::{open_container, serialize_container};
use crate::save_error::SaveError;

pub const KEY: &str = "TreeScaling";
pub const SERIALIZER_VERSION: u32 = 0;
pub const DATA_VERSION: u32 = 0;

pub fn encode(attributes: &PackedAttributeStore) -> Vec<u8> {
    let scales = attributes.scales();
    serialize_container(SERIALIZER_VERSION, |w| {
        w.write_i32(DATA_VERSION as i32);
        w.write_i32(scales.len() as i32);
        for &byte in scales {
            w.write_f32(byte as f32 * SCALE_TO_FLOAT);
        }
    })
}

/// Applies saved scales; returns how many entries landed in the store.
pub fn apply(blob: &[u8], attributes: &mut PackedAttributeStore) -> Result<u32, SaveError> {
    let (serializer_version, mut r) = open_container(blob)?;
    let data_version = if serializer_version > SERIALIZER_VERSION {
        serializer_version
    } else {
        r.read_i32()? as u32
    };
    if data_version > DATA_VERSION {
        return Err(SaveError::VersionMismatch {
            container: KEY,
            expected_max: DATA_VERSION,
            found: data_version,
        });
    }

    let len = read_len(&mut r, KEY)?;
    ensure_remaining(&r, len, 4)?;

    let capacity = attributes.capacity() as usize;
    if len > capacity {
        debug!("ignoring {} scale entries beyond capacity {capacity}", len - capacity);
    }
    let mut applied = 0u32;
    for index in 0..len {
        let mut scale = r.read_f32()?;
        if index >= capacity {
            continue;
        }
        if scale == 0.0 || scale.is_nan() {
            scale = 1.0;
        }
        attributes.set_scale(index as u32, (scale * FLOAT_TO_SCALE).round() as i32);
        applied += 1;
    }
    Ok(applied)
}
