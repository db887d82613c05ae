// ---------------------------------------------------------------------------
// expanded_data – native expansion container ("MoreTrees")
// ---------------------------------------------------------------------------
//
// Payload (after the serializer version):
//   i32  data version (0)
//   i32  buffer length
//   encoded u16 column   flags, indices [native, len)
//   prefab column        one index per occupied tree in [native, len)
//   encoded i16 column   X, occupied trees in [native, len)
//   encoded i16 column   Z, occupied trees in [native, len)
//   u24  burning count, then (u24 index, u8 intensity, u8 damage) entries
//
// Indices below native are saved by the host itself. Y positions and fire
// bits are not stored: terrain snapping and the burning list restore them.

use bevy::log::info;
use trees::{TreeInstance, TreeManager};

use super::{allocate, checked_saved_len, persistent_flags, read_burning_list, write_burning_list};
use crate::codec::{DecodeInput, PopulatedBuffer};
use crate::data_serializer::{open_container, serialize_container, DataWriter};
use crate::encoded_array::{write_column, ColumnReader};
use crate::prefab_codec::{PrefabColumnReader, PrefabColumnWriter, SimulationPrefabs};
use crate::save_error::SaveError;

pub const KEY: &str = "MoreTrees";
pub const SERIALIZER_VERSION: u32 = 0;
pub const DATA_VERSION: u32 = 0;

/// Encodes the trees above native capacity. Returns `None` when the buffer
/// was never expanded, in which case nothing should be stored.
pub fn encode(manager: &TreeManager, native: u32, prefabs: &SimulationPrefabs) -> Option<Vec<u8>> {
    let len = manager.trees.len();
    if len <= native {
        return None;
    }
    let expanded = &manager.trees.items()[native as usize..];
    let blob = serialize_container(SERIALIZER_VERSION, |w| {
        w.write_i32(DATA_VERSION as i32);
        w.write_i32(len as i32);
        write_payload(w, expanded, prefabs);
        write_burning_list(w, &manager.burning_trees, len);
    });
    info!("encoded {} expanded tree slots ({} bytes)", len - native, blob.len());
    Some(blob)
}

fn write_payload(w: &mut DataWriter, expanded: &[TreeInstance], prefabs: &SimulationPrefabs) {
    let flags: Vec<u16> = expanded.iter().map(|t| t.flags).collect();
    write_column(w, &flags);

    let mut infos = PrefabColumnWriter::begin();
    for tree in expanded.iter().filter(|t| t.is_occupied()) {
        infos.write(tree.info_index);
    }
    infos.end(w, prefabs);

    let xs: Vec<i16> = expanded
        .iter()
        .filter(|t| t.is_occupied())
        .map(|t| t.pos_x)
        .collect();
    write_column(w, &xs);
    let zs: Vec<i16> = expanded
        .iter()
        .filter(|t| t.is_occupied())
        .map(|t| t.pos_z)
        .collect();
    write_column(w, &zs);
}

pub fn decode(
    blob: &[u8],
    input: &DecodeInput<'_>,
    prefabs: &mut SimulationPrefabs,
) -> Result<PopulatedBuffer, SaveError> {
    let (serializer_version, mut r) = open_container(blob)?;
    if serializer_version > SERIALIZER_VERSION {
        return Err(SaveError::VersionMismatch {
            container: KEY,
            expected_max: SERIALIZER_VERSION,
            found: serializer_version,
        });
    }
    let data_version = r.read_i32()? as u32;
    if data_version > DATA_VERSION {
        return Err(SaveError::VersionMismatch {
            container: KEY,
            expected_max: DATA_VERSION,
            found: data_version,
        });
    }

    let saved_len = checked_saved_len(KEY, r.read_i32()?, input)?;
    let native = input.native_capacity;
    let capacity = saved_len.max(input.configured_limit);
    info!("reading expanded tree data: {saved_len} saved slots into {capacity}");
    let mut trees = allocate(input, capacity);

    let mut flags = ColumnReader::<u16>::begin(&mut r, KEY)?;
    for index in native..saved_len {
        trees.get_mut(index).flags = persistent_flags(flags.read()?);
    }

    let mut infos = PrefabColumnReader::begin(&mut r, KEY)?;
    for index in native..saved_len {
        if trees.get(index).is_occupied() {
            trees.get_mut(index).info_index = infos.read(prefabs)?;
        }
    }
    infos.end(&mut r, prefabs)?;

    let mut xs = ColumnReader::<i16>::begin(&mut r, KEY)?;
    for index in native..saved_len {
        if trees.get(index).is_occupied() {
            trees.get_mut(index).pos_x = xs.read()?;
        }
    }
    let mut zs = ColumnReader::<i16>::begin(&mut r, KEY)?;
    for index in native..saved_len {
        if trees.get(index).is_occupied() {
            trees.get_mut(index).pos_z = zs.read()?;
        }
    }

    let burning_trees = read_burning_list(&mut r, saved_len, &mut trees)?;
    trees.recalculate_unused();

    Ok(PopulatedBuffer {
        trees,
        burning_trees,
        saved_len,
        scale_overrides: Vec::new(),
    })
}
