// ---------------------------------------------------------------------------
// SaveError: failures while reading or writing tree containers
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors raised by container codecs and settings persistence.
///
/// Container errors are caught at the container boundary by the load
/// pipeline; none of them aborts a whole load.
#[derive(Debug)]
pub enum SaveError {
    /// Declared container version is newer than this build understands.
    VersionMismatch {
        container: &'static str,
        expected_max: u32,
        found: u32,
    },
    /// Declared length or count disagrees with the buffers it describes.
    SizeInvariant {
        container: &'static str,
        detail: String,
    },
    /// Structurally invalid legacy data (odd length, bad header, ...).
    CorruptLegacyData(String),
    /// A read ran past the end of the blob.
    UnexpectedEof { needed: usize, remaining: usize },
    /// I/O error while persisting settings.
    Io(std::io::Error),
    /// Settings file could not be parsed or encoded.
    Settings(String),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::VersionMismatch {
                container,
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch in {container}: data is v{found}, but this build only supports up to v{expected_max}"
            ),
            SaveError::SizeInvariant { container, detail } => {
                write!(f, "Size invariant violated in {container}: {detail}")
            }
            SaveError::CorruptLegacyData(msg) => write!(f, "Corrupt legacy data: {msg}"),
            SaveError::UnexpectedEof { needed, remaining } => write!(
                f,
                "Unexpected end of data: needed {needed} bytes, {remaining} remaining"
            ),
            SaveError::Io(e) => write!(f, "I/O error: {e}"),
            SaveError::Settings(msg) => write!(f, "Settings error: {msg}"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Settings(e.to_string())
    }
}

impl SaveError {
    pub(crate) fn size(container: &'static str, detail: impl Into<String>) -> Self {
        SaveError::SizeInvariant {
            container,
            detail: detail.into(),
        }
    }
}
