//! Error taxonomy shared by the library, audio and analysis boundaries.
//!
//! Nothing here is fatal: callers convert every variant into a status-line
//! notice or a degraded mode (see `App::notice`).

use std::path::PathBuf;

/// Result alias that carries [`SpindleError`].
pub type Result<T> = std::result::Result<T, SpindleError>;

#[derive(Debug, thiserror::Error)]
pub enum SpindleError {
    /// A host capability (directory access, output device, sample tap) is missing.
    #[error("{0}")]
    CapabilityUnavailable(String),
    /// The engine could not open or decode a source.
    #[error("failed to load {source_ref}: {reason}")]
    LoadFailure { source_ref: String, reason: String },
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),
    /// A drop or directory pick produced no audio files.
    #[error("no audio files found")]
    EmptySelection,
    #[error("unknown track {0}")]
    UnknownTrack(String),
    #[error("index {index} out of range (len {len})")]
    InvalidIndex { index: usize, len: usize },
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Config(#[from] ::config::ConfigError),
}

impl SpindleError {
    pub fn load_failure(source_ref: impl Into<String>, reason: impl ToString) -> Self {
        Self::LoadFailure {
            source_ref: source_ref.into(),
            reason: reason.to_string(),
        }
    }
}
