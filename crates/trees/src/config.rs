/// The host's compiled-in tree capacity.
pub const NATIVE_TREE_CAPACITY: u32 = 262_144;

/// Largest configurable limit, as a multiple of the native capacity.
pub const MAX_LIMIT_MULTIPLIER: u32 = 8;

/// Burning-list indices are persisted as 24-bit integers, so no buffer may
/// grow past this many slots.
pub const TREE_INDEX_SPACE: u32 = 1 << 24;

/// Raw X/Z position units to world units.
pub const POSITION_XZ_SCALE: f32 = 0.27;
/// Raw Y position units per world unit.
pub const POSITION_Y_UNITS: f32 = 64.0;

/// Scale byte that represents a multiplier of exactly 1.0.
pub const SCALE_BASELINE: u8 = 64;
pub const FLOAT_TO_SCALE: f32 = SCALE_BASELINE as f32;
pub const SCALE_TO_FLOAT: f32 = 1.0 / FLOAT_TO_SCALE;

/// Default floor for scale bytes (multiplier 0.25).
pub const DEFAULT_MIN_SCALE_FACTOR: u8 = 16;

/// Override flags are packed this many per word.
pub const FLAG_WORD_BITS: u32 = 64;
