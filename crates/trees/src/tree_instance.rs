//! Fixed-layout tree record as stored in the host's tree buffer.
//!
//! Positions are fixed-point: X/Z are signed shorts scaled by
//! [`POSITION_XZ_SCALE`], Y is an unsigned short in 1/64 world units.

use bitflags::bitflags;

use crate::config::{POSITION_XZ_SCALE, POSITION_Y_UNITS};

bitflags! {
    /// Per-tree state bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TreeFlags: u16 {
        const CREATED = 0x0001;
        const DELETED = 0x0002;
        const FIXED_HEIGHT = 0x0004;
        const FIRE_DAMAGE = 0x0040;
        const BURNING = 0x0080;
        const GROW_STATE = 0x0F00;
    }
}

impl TreeFlags {
    /// Everything except the transient fire bits. Decoders apply this to
    /// persisted flags; fire state is rebuilt from the burning list.
    pub const PERSISTENT_MASK: u16 = !(Self::FIRE_DAMAGE.bits() | Self::BURNING.bits());
}

const GROW_STATE_SHIFT: u16 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeInstance {
    pub flags: u16,
    pub info_index: u16,
    pub pos_x: i16,
    pub pos_z: i16,
    pub pos_y: u16,
}

impl TreeInstance {
    /// Size of one record in [`TreeInstance::to_bytes`] form.
    pub const BYTE_LEN: usize = 10;

    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.flags != 0
    }

    #[inline]
    pub fn tree_flags(&self) -> TreeFlags {
        TreeFlags::from_bits_retain(self.flags)
    }

    #[inline]
    pub fn has_flag(&self, flag: TreeFlags) -> bool {
        self.flags & flag.bits() != 0
    }

    pub fn set_flag(&mut self, flag: TreeFlags, value: bool) {
        if value {
            self.flags |= flag.bits();
        } else {
            self.flags &= !flag.bits();
        }
    }

    #[inline]
    pub fn grow_state(&self) -> u16 {
        (self.flags & TreeFlags::GROW_STATE.bits()) >> GROW_STATE_SHIFT
    }

    /// Writes the raw grow state; values are clamped to the 4-bit field.
    pub fn write_grow_state(&mut self, value: u16) {
        let value = value.min(15);
        self.flags = (self.flags & !TreeFlags::GROW_STATE.bits()) | (value << GROW_STATE_SHIFT);
    }

    /// A tree renders when its grow state is non-zero.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.grow_state() != 0
    }

    #[inline]
    pub fn fixed_height(&self) -> bool {
        self.has_flag(TreeFlags::FIXED_HEIGHT)
    }

    pub fn world_x(&self) -> f32 {
        self.pos_x as f32 * POSITION_XZ_SCALE
    }

    pub fn world_z(&self) -> f32 {
        self.pos_z as f32 * POSITION_XZ_SCALE
    }

    pub fn world_y(&self) -> f32 {
        self.pos_y as f32 / POSITION_Y_UNITS
    }

    /// Little-endian record bytes, used for buffer checksums.
    pub fn to_bytes(&self) -> [u8; Self::BYTE_LEN] {
        let mut out = [0u8; Self::BYTE_LEN];
        out[0..2].copy_from_slice(&self.flags.to_le_bytes());
        out[2..4].copy_from_slice(&self.info_index.to_le_bytes());
        out[4..6].copy_from_slice(&self.pos_x.to_le_bytes());
        out[6..8].copy_from_slice(&self.pos_z.to_le_bytes());
        out[8..10].copy_from_slice(&self.pos_y.to_le_bytes());
        out
    }
}

/// Entry of the host's burning-tree list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BurningTree {
    pub tree_index: u32,
    pub fire_intensity: u8,
    pub fire_damage: u8,
}

/// Keeps only entries that point inside `(0, len)`, so a serialized list
/// never references a slot the reader will not have.
pub fn filter_burning_trees(burning: &[BurningTree], len: u32) -> Vec<BurningTree> {
    burning
        .iter()
        .filter(|b| b.tree_index > 0 && b.tree_index < len)
        .copied()
        .collect()
}
