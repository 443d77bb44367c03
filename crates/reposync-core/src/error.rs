//! Error types for reposync-core.

use std::path::PathBuf;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised outside of a sync operation (config, files, direct backend use).
///
/// The outcome of a sync operation is reported through
/// [`Outcome`](crate::Outcome) instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A config file could not be parsed.
    #[error("failed to parse {file}: {message}")]
    ConfigParse { file: PathBuf, message: String },

    /// An ignore pattern that cannot be written as a single line.
    #[error("invalid ignore pattern {0:?}: patterns must be a single line")]
    InvalidPattern(String),

    /// A git call ran but reported failure.
    #[error("`{command}` failed: {reason}")]
    CommandFailed { command: String, reason: String },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Git backend error.
    #[error("git error: {0}")]
    Git(#[from] reposync_git::Error),
}
