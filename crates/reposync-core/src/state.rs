//! Repository state snapshots.

use chrono::{DateTime, Local};
use serde::Serialize;

/// Point-in-time view of a repository.
///
/// A snapshot is only valid for the instant it was captured. After any
/// mutating backend call a fresh one must be taken before deciding the next
/// step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryState {
    /// Whether version-control metadata exists.
    pub is_repository: bool,
    /// Whether any tracked or untracked change is pending.
    pub is_dirty: bool,
    /// Local commits not yet on the upstream.
    pub ahead: usize,
    /// Upstream commits not yet merged locally.
    pub behind: usize,
    /// Current branch, empty when HEAD is detached.
    pub current_branch: String,
    /// URL of the configured remote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    /// Configured upstream of HEAD, e.g. `origin/main`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream: Option<String>,
    /// Changed paths as reported by porcelain status.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<String>,
    /// Number of stash entries.
    pub stash_count: usize,
    /// When this snapshot was taken.
    pub captured_at: DateTime<Local>,
}

impl RepositoryState {
    /// Snapshot for a directory without version-control metadata.
    #[must_use]
    pub fn not_a_repository() -> Self {
        Self {
            is_repository: false,
            is_dirty: false,
            ahead: 0,
            behind: 0,
            current_branch: String::new(),
            remote_url: None,
            upstream: None,
            changes: Vec::new(),
            stash_count: 0,
            captured_at: Local::now(),
        }
    }

    /// Classify the snapshot for the sync state machine.
    #[must_use]
    pub const fn sync_state(&self) -> SyncState {
        match (self.ahead > 0, self.behind > 0) {
            (true, true) => SyncState::Diverged,
            (false, true) => SyncState::BehindOnly,
            (true, false) => SyncState::AheadOnly,
            (false, false) if self.is_dirty => SyncState::Dirty,
            (false, false) => SyncState::Clean,
        }
    }

    /// Whether HEAD is detached.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.current_branch.is_empty()
    }
}

/// State machine position derived from a [`RepositoryState`].
///
/// Divergence takes precedence over dirtiness, which is still available as
/// [`RepositoryState::is_dirty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// In sync with the upstream, nothing pending.
    Clean,
    /// In sync with the upstream, uncommitted changes pending.
    Dirty,
    /// Local commits to publish.
    AheadOnly,
    /// Upstream commits to merge.
    BehindOnly,
    /// Both sides have commits the other lacks.
    Diverged,
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Clean => "clean",
            Self::Dirty => "uncommitted changes",
            Self::AheadOnly => "ahead of upstream",
            Self::BehindOnly => "behind upstream",
            Self::Diverged => "diverged from upstream",
        };
        f.write_str(label)
    }
}
