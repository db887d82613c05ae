//! JSON persistence for [`TreeSettings`].
//!
//! Writes go through a temp file that is synced and then renamed over the
//! target, so a crash mid-write leaves the previous settings intact.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use bevy::log::{info, warn};
use trees::TreeSettings;

use crate::save_error::SaveError;

/// Reads settings from `path`. A missing file yields the defaults.
pub fn load_settings(path: &Path) -> Result<TreeSettings, SaveError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("no tree settings at {}, using defaults", path.display());
            return Ok(TreeSettings::default());
        }
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&text).map_err(|e| {
        warn!("tree settings at {} are unreadable: {e}", path.display());
        SaveError::from(e)
    })
}

pub fn save_settings(path: &Path, settings: &TreeSettings) -> Result<(), SaveError> {
    let json = serde_json::to_vec_pretty(settings)?;
    write_replace(path, &json)?;
    Ok(())
}

fn write_replace(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = temp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(&tmp, path)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
