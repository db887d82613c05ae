//! User-facing tree options.
//!
//! Loaded once at startup (see `tree_save::settings_file`) and carried inside
//! [`crate::TreeDataContext`]; core operations read policy from there.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_MIN_SCALE_FACTOR, MAX_LIMIT_MULTIPLIER, NATIVE_TREE_CAPACITY, TREE_INDEX_SPACE,
};

/// What to do with a tree that overlaps a network or building at load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverlapMode {
    #[default]
    None,
    Hide,
    Unhide,
    Delete,
}

/// Blanket visibility override applied to every tree at load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoadingForceMode {
    #[default]
    None,
    UnhideAll,
    HideAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Configured limit is smaller than the host's native capacity.
    LimitBelowNative { limit: u32, native: u32 },
    /// Configured limit exceeds `native * MAX_LIMIT_MULTIPLIER`.
    LimitAboveMaximum { limit: u32, maximum: u32 },
    /// Configured limit cannot be addressed by 24-bit tree indices.
    LimitOutsideIndexSpace { limit: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LimitBelowNative { limit, native } => {
                write!(f, "tree limit {limit} is below the native capacity {native}")
            }
            ConfigError::LimitAboveMaximum { limit, maximum } => {
                write!(f, "tree limit {limit} exceeds the supported maximum {maximum}")
            }
            ConfigError::LimitOutsideIndexSpace { limit } => write!(
                f,
                "tree limit {limit} does not fit the 24-bit tree index space"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSettings {
    /// Desired buffer capacity for saves without expansion data.
    pub tree_limit: u32,
    pub network_overlap: OverlapMode,
    pub building_overlap: OverlapMode,
    pub loading_force_mode: LoadingForceMode,
    /// Skip Tree Anarchy data even when a save carries it.
    pub ignore_tree_anarchy_data: bool,
    pub min_scale_factor: u8,
    pub sway_factor: f32,
    pub disable_distant_sway: bool,
    pub update_on_terrain: bool,
    pub keep_above_ground: bool,
    pub anarchy_enabled: bool,
    /// Collision-based hiding at load; trees with the override bit are exempt.
    pub hide_on_load: bool,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            tree_limit: NATIVE_TREE_CAPACITY,
            network_overlap: OverlapMode::None,
            building_overlap: OverlapMode::None,
            loading_force_mode: LoadingForceMode::None,
            ignore_tree_anarchy_data: false,
            min_scale_factor: DEFAULT_MIN_SCALE_FACTOR,
            sway_factor: 1.0,
            disable_distant_sway: false,
            update_on_terrain: false,
            keep_above_ground: true,
            anarchy_enabled: false,
            hide_on_load: true,
        }
    }
}

impl TreeSettings {
    /// Sets the limit, clamped to `[native, native * MAX_LIMIT_MULTIPLIER]`.
    pub fn set_tree_limit(&mut self, limit: u32, native: u32) {
        self.tree_limit = limit.clamp(native, max_custom_limit(native));
    }

    /// Fails fast on a limit the expander must never be asked to honour.
    pub fn validate(&self, native: u32) -> Result<(), ConfigError> {
        if self.tree_limit < native {
            return Err(ConfigError::LimitBelowNative {
                limit: self.tree_limit,
                native,
            });
        }
        let maximum = max_custom_limit(native);
        if self.tree_limit > maximum {
            return Err(ConfigError::LimitAboveMaximum {
                limit: self.tree_limit,
                maximum,
            });
        }
        if self.tree_limit > TREE_INDEX_SPACE {
            return Err(ConfigError::LimitOutsideIndexSpace {
                limit: self.tree_limit,
            });
        }
        Ok(())
    }

    pub fn overlap_policies_active(&self) -> bool {
        self.network_overlap != OverlapMode::None || self.building_overlap != OverlapMode::None
    }
}

pub fn max_custom_limit(native: u32) -> u32 {
    native.saturating_mul(MAX_LIMIT_MULTIPLIER)
}
