// ---------------------------------------------------------------------------
// unlimited_trees – legacy raw u16 stream ("mabako/unlimiter"), import only
// ---------------------------------------------------------------------------
//
// The blob is not framed: it is a little-endian u16 array. Ints are two
// words, high word first.
//
//   v1: u16 version                          limit fixed at 1_048_576
//   v2: u16 version, int limit
//   v3: u16 version, int limit, int count, int reserved, int reserved,
//       u16 save format (PACKED = 1, ENCODED = 2)
//
// Records start at the native capacity: u16 flags, and for occupied slots
// u16 prefab, u16 X, u16 Z. Reading stops when the data runs out even if
// the header promised more.

use bevy::log::{info, warn};
use bitflags::bitflags;

use super::{allocate, persistent_flags};
use crate::codec::{DecodeInput, PopulatedBuffer};
use crate::save_error::SaveError;

pub const KEY: &str = "mabako/unlimiter";
pub const MAX_VERSION: u16 = 3;
const V1_TREE_LIMIT: i32 = 1_048_576;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UnlimitedFormat: u16 {
        const PACKED = 1;
        const ENCODED = 2;
    }
}

struct WordCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WordCursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn read_u16(&mut self) -> Option<u16> {
        let word = self.data.get(self.pos..self.pos + 2)?;
        self.pos += 2;
        Some(u16::from_le_bytes([word[0], word[1]]))
    }

    fn read_int(&mut self) -> Option<i32> {
        let high = self.read_u16()? as i32;
        let low = self.read_u16()? as i32;
        Some((high << 16) | low)
    }

    fn is_at_end(&self) -> bool {
        self.data.len() - self.pos < 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    version: u16,
    limit: i32,
    count: i32,
    format: UnlimitedFormat,
}

fn read_header(cursor: &mut WordCursor<'_>) -> Result<Header, SaveError> {
    let truncated = |version: u16| SaveError::CorruptLegacyData(format!("truncated v{version} header"));
    let version = cursor
        .read_u16()
        .ok_or_else(|| SaveError::CorruptLegacyData("missing version word".into()))?;
    let mut header = Header {
        version,
        limit: 0,
        count: 0,
        format: UnlimitedFormat::empty(),
    };
    match version {
        1 => header.limit = V1_TREE_LIMIT,
        2 => header.limit = cursor.read_int().ok_or_else(|| truncated(version))?,
        3 => {
            header.limit = cursor.read_int().ok_or_else(|| truncated(version))?;
            header.count = cursor.read_int().ok_or_else(|| truncated(version))?;
            for _ in 0..2 {
                cursor.read_int().ok_or_else(|| truncated(version))?;
            }
            let format = cursor.read_u16().ok_or_else(|| truncated(version))?;
            header.format = UnlimitedFormat::from_bits_retain(format);
        }
        _ => {
            return Err(SaveError::VersionMismatch {
                container: KEY,
                expected_max: MAX_VERSION as u32,
                found: version as u32,
            })
        }
    }
    Ok(header)
}

/// Structural check run before decoding: whole words only, at least one.
pub fn validate(blob: &[u8]) -> Result<(), SaveError> {
    if blob.len() < 2 || blob.len() % 2 != 0 {
        return Err(SaveError::CorruptLegacyData(format!(
            "{KEY} blob has invalid byte length {}",
            blob.len()
        )));
    }
    Ok(())
}

pub fn decode(blob: &[u8], input: &DecodeInput<'_>) -> Result<PopulatedBuffer, SaveError> {
    validate(blob)?;
    let mut cursor = WordCursor::new(blob);
    let header = read_header(&mut cursor)?;

    let native = input.native_capacity as i64;
    let max_limit = input.max_limit() as i64;
    let limit = header.limit as i64;
    if limit <= 0 || limit > max_limit {
        return Err(SaveError::CorruptLegacyData(format!(
            "invalid Unlimited Trees limit {limit}"
        )));
    }
    if limit <= native {
        return Err(SaveError::size(
            KEY,
            format!("limit {limit} does not exceed native capacity {native}"),
        ));
    }

    let saved_len = if header.format.contains(UnlimitedFormat::PACKED) {
        (header.count.max(0) as i64 + native).min(max_limit) as u32
    } else {
        limit as u32
    };
    let capacity = saved_len.max(limit as u32);
    info!(
        "reading Unlimited Trees v{} data of size {saved_len} into buffer size {capacity}",
        header.version
    );

    let mut trees = allocate(input, capacity);
    let mut records = 0u32;
    for index in input.native_capacity..saved_len {
        let Some(raw) = cursor.read_u16() else {
            break;
        };
        let flags = persistent_flags(raw);
        if flags != 0 {
            let (Some(info), Some(x), Some(z)) =
                (cursor.read_u16(), cursor.read_u16(), cursor.read_u16())
            else {
                warn!("Unlimited Trees record {index} cut short; stopping");
                break;
            };
            let tree = trees.get_mut(index);
            tree.flags = flags;
            tree.info_index = info;
            tree.pos_x = x as i16;
            tree.pos_z = z as i16;
            tree.pos_y = 0;
            records += 1;
        }
        if cursor.is_at_end() {
            break;
        }
    }
    info!("{records} Unlimited Trees trees read");
    trees.recalculate_unused();

    Ok(PopulatedBuffer {
        trees,
        burning_trees: Vec::new(),
        saved_len,
        scale_overrides: Vec::new(),
    })
}

/// Little-endian word stream builder for fixtures.
#[cfg(test)]
pub(crate) struct WordStream(pub Vec<u8>);

#[cfg(test)]
impl WordStream {
    pub fn new(version: u16) -> Self {
        let mut stream = Self(Vec::new());
        stream.word(version);
        stream
    }

    pub fn word(&mut self, value: u16) -> &mut Self {
        self.0.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn int(&mut self, value: i32) -> &mut Self {
        self.word((value >> 16) as u16).word(value as u16)
    }

    pub fn tree(&mut self, flags: u16, info: u16, x: i16, z: i16) -> &mut Self {
        self.word(flags).word(info).word(x as u16).word(z as u16)
    }
}
