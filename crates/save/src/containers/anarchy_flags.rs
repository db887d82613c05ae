// ---------------------------------------------------------------------------
// anarchy_flags – packed override-flag words ("TreeAnarchyFlags")
// ---------------------------------------------------------------------------
//
// Payload: i32 data version (0), i32 word count, u64 per word.

use trees::PackedAttributeStore;

use super::{ensure_remaining, read_len};
use crate::data_serializer::{open_container, serialize_container};
use crate::save_error::SaveError;

pub const KEY: &str = "TreeAnarchyFlags";
pub const SERIALIZER_VERSION: u32 = 0;
pub const DATA_VERSION: u32 = 0;

pub fn encode(attributes: &PackedAttributeStore) -> Vec<u8> {
    let words = attributes.words();
    serialize_container(SERIALIZER_VERSION, |w| {
        w.write_i32(DATA_VERSION as i32);
        w.write_i32(words.len() as i32);
        for &word in words {
            w.write_u64(word);
        }
    })
}

/// Restores saved words; returns how many were read.
pub fn apply(blob: &[u8], attributes: &mut PackedAttributeStore) -> Result<usize, SaveError> {
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

    let count = read_len(&mut r, KEY)?;
    let available = attributes.words().len();
    if count > available {
        return Err(SaveError::size(
            KEY,
            format!("{count} flag words saved, store holds {available}"),
        ));
    }
    ensure_remaining(&r, count, 8)?;
    for word in 0..count {
        attributes.set_word(word, r.read_u64()?);
    }
    Ok(count)
}
