use std::path::PathBuf;

use sf_core::CoreError;

/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised while setting up or switching levels.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A pool or map decoding error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The level table has no entries.
    #[error("level table is empty")]
    NoLevels,

    /// A level index past the end of the table.
    #[error("level {index} out of range ({count} levels)")]
    LevelOutOfRange {
        /// The index asked for.
        index: usize,
        /// Number of levels in the table.
        count: usize,
    },

    /// A map image could not be read or decoded.
    #[error("failed to load map {}: {reason}", path.display())]
    MapLoad {
        /// The map file.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// The manifest file is unreadable or malformed.
    #[error("invalid level manifest: {0}")]
    Manifest(String),

    /// A configuration value is out of range or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}
