// ---------------------------------------------------------------------------
// tree_anarchy – legacy whole-buffer migration ("TreeAnarchy"), import only
// ---------------------------------------------------------------------------
//
// Serializer versions 4..=7. Payload:
//   i32  saved buffer length
//   encoded u16 column   flags, indices [native, len)
//   prefab column        occupied trees from index 1 (not native)
//   encoded i16 column   X, occupied trees in [native, len)
//   encoded i16 column   Z, occupied trees in [native, len)
//   encoded u16 column   Y, trees in [1, len) with FIXED_HEIGHT
//   v6+: encoded f32     extra scale, occupied trees in [1, len)
//   v7+: burning list
//
// The prefab column starting at 1 is what the writer produced; readers must
// match it to stay aligned with the rest of the stream.

use bevy::log::info;
use trees::config::FLOAT_TO_SCALE;
#[cfg(test)]
use trees::TreeFlags;

use super::{allocate, checked_saved_len, persistent_flags, read_burning_list};
use crate::codec::{DecodeInput, PopulatedBuffer};
use crate::data_serializer::open_container;
use crate::encoded_array::ColumnReader;
use crate::prefab_codec::{PrefabColumnReader, SimulationPrefabs};
use crate::save_error::SaveError;

pub const KEY: &str = "TreeAnarchy";
pub const MIN_VERSION: u32 = 4;
pub const MAX_VERSION: u32 = 7;
const SCALE_VERSION: u32 = 6;
const BURNING_VERSION: u32 = 7;

pub fn decode(
    blob: &[u8],
    input: &DecodeInput<'_>,
    prefabs: &mut SimulationPrefabs,
) -> Result<PopulatedBuffer, SaveError> {
    let (version, mut r) = open_container(blob)?;
    if !(MIN_VERSION..=MAX_VERSION).contains(&version) {
        return Err(SaveError::VersionMismatch {
            container: KEY,
            expected_max: MAX_VERSION,
            found: version,
        });
    }

    let saved_len = checked_saved_len(KEY, r.read_i32()?, input)?;
    let native = input.native_capacity;
    let capacity = saved_len.max(input.configured_limit);
    info!("reading Tree Anarchy v{version} data: {saved_len} saved slots into {capacity}");

    // Vanilla trees first: their flags decide how many prefab and height
    // entries follow.
    let mut trees = allocate(input, capacity);

    let mut flags = ColumnReader::<u16>::begin(&mut r, KEY)?;
    for index in native..saved_len {
        trees.get_mut(index).flags = persistent_flags(flags.read()?);
    }

    let mut infos = PrefabColumnReader::begin(&mut r, KEY)?;
    for index in 1..saved_len {
        if trees.get(index).is_occupied() {
            trees.get_mut(index).info_index = infos.read(prefabs)?;
        }
    }
    info!("{} Tree Anarchy trees read", infos.consumed());
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

    let mut heights = ColumnReader::<u16>::begin(&mut r, KEY)?;
    for index in 1..saved_len {
        if trees.get(index).fixed_height() {
            trees.get_mut(index).pos_y = heights.read()?;
        }
    }

    let mut scale_overrides = Vec::new();
    if version >= SCALE_VERSION {
        // Extra scale is additive on top of 1.0; the store is multiplicative.
        let mut extra = ColumnReader::<f32>::begin(&mut r, KEY)?;
        for index in 1..saved_len {
            if trees.get(index).is_occupied() {
                let value = (extra.read()? + 1.0) * FLOAT_TO_SCALE;
                scale_overrides.push((index, value as i32));
            }
        }
    }

    let burning_trees = if version >= BURNING_VERSION {
        read_burning_list(&mut r, saved_len, &mut trees)?
    } else {
        Vec::new()
    };
    trees.recalculate_unused();

    Ok(PopulatedBuffer {
        trees,
        burning_trees,
        saved_len,
        scale_overrides,
    })
}

/// Writes a blob in the layout above. Used to build fixtures.
#[cfg(test)]
pub(crate) fn encode_fixture(
    version: u32,
    trees: &trees::TreeBuffer,
    native: u32,
    extra_scales: &[f32],
    burning: &[trees::BurningTree],
    prefabs: &SimulationPrefabs,
) -> Vec<u8> {
    use crate::data_serializer::serialize_container;
    use crate::encoded_array::write_column;
    use crate::prefab_codec::PrefabColumnWriter;

    let len = trees.len();
    let items = trees.items();
    let occupied_from = |start: u32| {
        items[start as usize..]
            .iter()
            .filter(|t| t.is_occupied())
            .copied()
            .collect::<Vec<_>>()
    };

    serialize_container(version, |w| {
        w.write_i32(len as i32);
        let flags: Vec<u16> = items[native as usize..].iter().map(|t| t.flags).collect();
        write_column(w, &flags);

        let mut infos = PrefabColumnWriter::begin();
        for tree in items[1..].iter().filter(|t| t.is_occupied()) {
            infos.write(tree.info_index);
        }
        infos.end(w, prefabs);

        let above = occupied_from(native);
        write_column(w, &above.iter().map(|t| t.pos_x).collect::<Vec<_>>());
        write_column(w, &above.iter().map(|t| t.pos_z).collect::<Vec<_>>());

        let fixed: Vec<u16> = items[1..]
            .iter()
            .filter(|t| t.has_flag(TreeFlags::FIXED_HEIGHT))
            .map(|t| t.pos_y)
            .collect();
        write_column(w, &fixed);

        if version >= SCALE_VERSION {
            write_column(w, extra_scales);
        }
        if version >= BURNING_VERSION {
            super::write_burning_list(w, burning, len);
        }
    })
}
