//! Error types for reposync-git.
//!
//! These cover failures to *run* a backend call. A git command that ran and
//! exited non-zero is not an error here; it comes back as a
//! [`CommandOutput`](crate::CommandOutput) with its status.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while executing git primitives.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Not inside a git repository.
    #[error("not a git repository")]
    NotARepository,

    /// The git binary could not be started.
    #[error("failed to execute `{command}`: {source}")]
    Spawn {
        /// The command line that failed to start.
        command: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A bounded call did not finish in time.
    #[error("`{command}` timed out after {secs}s")]
    Timeout {
        /// The command line that timed out.
        command: String,
        /// The bound that was exceeded.
        secs: u64,
    },

    /// The runtime used for bounded calls could not be built.
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// Underlying git2 error.
    #[error("git error: {0}")]
    Git2(#[from] git2::Error),
}
