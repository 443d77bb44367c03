//! Sync operations and their outcomes.

use std::fmt::Write as _;

use chrono::{DateTime, Local};

use crate::config::MessageConfig;
use crate::state::RepositoryState;

/// The operations an operator can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Stage, commit with a generated message, push.
    AutoPush,
    /// Stage, commit with an operator-supplied message, push.
    CustomPush,
    /// Stage, commit with a prompted message (generated if blank), push.
    QuickCommit,
    /// Pull, shelving local edits around the merge.
    AutoPull,
    /// AutoPull, then commit and push.
    FullSync,
    /// Commit everything and push, force-with-lease as a last resort.
    EmergencyBackup,
    /// Remove untracked files after a preview and confirmation.
    Cleanup,
}

impl OperationKind {
    /// Every kind, in menu order.
    pub const ALL: [Self; 7] = [
        Self::AutoPush,
        Self::CustomPush,
        Self::QuickCommit,
        Self::AutoPull,
        Self::FullSync,
        Self::EmergencyBackup,
        Self::Cleanup,
    ];

    /// Human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AutoPush => "Auto push",
            Self::CustomPush => "Custom push",
            Self::QuickCommit => "Quick commit",
            Self::AutoPull => "Auto pull",
            Self::FullSync => "Full sync",
            Self::EmergencyBackup => "Emergency backup",
            Self::Cleanup => "Cleanup",
        }
    }

    /// Whether the operation commits and pushes.
    #[must_use]
    pub const fn is_push_kind(self) -> bool {
        matches!(self, Self::AutoPush | Self::CustomPush | Self::QuickCommit)
    }

    /// Whether the operator is asked for a commit message.
    #[must_use]
    pub const fn prompts_for_message(self) -> bool {
        matches!(self, Self::CustomPush | Self::QuickCommit)
    }

    /// Whether a timestamped message may stand in for a missing one.
    #[must_use]
    pub const fn generates_message(self) -> bool {
        !matches!(self, Self::CustomPush)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single requested operation, authorized against one snapshot.
///
/// Created per command and consumed by the engine.
#[derive(Debug, Clone)]
pub struct SyncOperation {
    /// What to do.
    pub kind: OperationKind,
    /// Commit message supplied by the operator.
    pub message: Option<String>,
    /// Snapshot the operation was authorized against.
    pub precondition: RepositoryState,
}

impl SyncOperation {
    /// Create an operation without a message.
    #[must_use]
    pub const fn new(kind: OperationKind, precondition: RepositoryState) -> Self {
        Self {
            kind,
            message: None,
            precondition,
        }
    }

    /// Attach an operator-supplied message.
    #[must_use]
    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    /// Resolve the commit message for this operation.
    ///
    /// Returns `None` only when the kind requires an operator message and
    /// none (or a blank one) was supplied.
    #[must_use]
    pub fn commit_message(&self, config: &MessageConfig, now: DateTime<Local>) -> Option<String> {
        let supplied = self
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty());
        let stamp = timestamp(now, &config.timestamp_format);

        match (self.kind, supplied) {
            (OperationKind::EmergencyBackup, Some(msg)) => {
                Some(format!("{} {stamp}: {msg}", config.backup_prefix))
            }
            (OperationKind::EmergencyBackup, None) => {
                Some(format!("{} {stamp}", config.backup_prefix))
            }
            (_, Some(msg)) => Some(msg.to_string()),
            (kind, None) if kind.generates_message() => {
                Some(format!("{} {stamp}", config.auto_prefix))
            }
            (_, None) => None,
        }
    }
}

/// Format `now`, falling back to ISO-like output when `format` is invalid.
fn timestamp(now: DateTime<Local>, format: &str) -> String {
    let mut stamp = String::new();
    if write!(stamp, "{}", now.format(format)).is_err() {
        tracing::warn!(%format, "invalid timestamp format, using default");
        stamp = now.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    stamp
}

/// Why an operation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The directory is not under version control.
    NotARepository,
    /// The remote refused a non-fast-forward push.
    Rejected,
    /// The operator declined a confirmation.
    Cancelled,
    /// A network call exceeded its bound.
    Timeout,
    /// HEAD is not on a branch, so there is nothing to push or pull.
    DetachedHead,
    /// The operation needs a commit message and none was given.
    MissingMessage,
    /// Anything else, with git's own explanation.
    Other(String),
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotARepository => f.write_str("not a git repository"),
            Self::Rejected => f.write_str("push rejected by the remote"),
            Self::Cancelled => f.write_str("cancelled"),
            Self::Timeout => f.write_str("network call timed out"),
            Self::DetachedHead => f.write_str("HEAD is detached"),
            Self::MissingMessage => f.write_str("a commit message is required"),
            Self::Other(reason) => f.write_str(reason),
        }
    }
}

/// Result of running a [`SyncOperation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Everything the operation set out to do was done.
    Success,
    /// Nothing needed doing; no mutating call was made beyond staging.
    NoOpNothingToDo,
    /// A merge or stash restore needs manual resolution.
    Conflict {
        /// Paths git reports as unmerged.
        files: Vec<String>,
        /// Label of the preserved stash entry, if local edits were shelved.
        stash: Option<String>,
    },
    /// The operation stopped early.
    Failed(FailureReason),
}

impl Outcome {
    /// Shorthand for `Failed(Other(reason))`.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(FailureReason::Other(reason.into()))
    }

    /// Whether the outcome should be reported as a success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::NoOpNothingToDo)
    }

    /// What the operator should do next, if anything.
    #[must_use]
    pub fn remediation(&self) -> Option<String> {
        match self {
            Self::Success | Self::NoOpNothingToDo => None,
            Self::Conflict { stash: Some(label), .. } => Some(format!(
                "Resolve the conflicted files and commit. Your local edits are kept in the \
                 stash entry '{label}'; drop it with `git stash drop` once they are restored."
            )),
            Self::Conflict { stash: None, .. } => {
                Some("Resolve the conflicted files, then commit the merge.".to_string())
            }
            Self::Failed(FailureReason::Rejected) => Some(
                "The remote has commits you don't have. Run Auto pull, then retry the push. \
                 Your local commit is kept."
                    .to_string(),
            ),
            Self::Failed(FailureReason::NotARepository) => {
                Some("Run `git init` or move into a repository.".to_string())
            }
            Self::Failed(FailureReason::Cancelled) => Some("Nothing was changed.".to_string()),
            Self::Failed(FailureReason::Timeout) => {
                Some("Check your network connection and try again.".to_string())
            }
            Self::Failed(FailureReason::DetachedHead) => {
                Some("Check out a branch: git switch <branch-name>".to_string())
            }
            Self::Failed(FailureReason::MissingMessage) => {
                Some("Provide a commit message or use Auto push.".to_string())
            }
            Self::Failed(FailureReason::Other(_)) => None,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => f.write_str("done"),
            Self::NoOpNothingToDo => f.write_str("nothing to do"),
            Self::Conflict { files, .. } if files.is_empty() => f.write_str("conflict"),
            Self::Conflict { files, .. } => write!(f, "conflict in {}", files.join(", ")),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

impl From<reposync_git::Error> for Outcome {
    fn from(err: reposync_git::Error) -> Self {
        match err {
            reposync_git::Error::NotARepository => Self::Failed(FailureReason::NotARepository),
            reposync_git::Error::Timeout { .. } => Self::Failed(FailureReason::Timeout),
            other => Self::failed(other.to_string()),
        }
    }
}
