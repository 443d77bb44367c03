//! Trait abstractions for git operations.
//!
//! This module defines the `GitOps` trait which abstracts the backend,
//! enabling dependency injection and testability.

use std::path::Path;
use std::time::Duration;

use crate::{CommandOutput, Result};

/// History listing formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One line per commit: short hash and subject.
    #[default]
    Oneline,
    /// Oneline with the branch graph drawn alongside.
    Graph,
    /// Hash, author, relative date and subject.
    Detailed,
}

/// Diff views offered to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffView {
    /// Unstaged changes in the working tree.
    #[default]
    WorkingTree,
    /// Changes staged for the next commit.
    Staged,
    /// Per-file summary of all uncommitted changes.
    Stat,
}

/// Where a push lands on the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushTarget<'a> {
    /// The branch's configured upstream. Tracking config is left as it is.
    Upstream { remote: &'a str, branch: &'a str },
    /// Publish the current branch under its own name and track it.
    Publish { remote: &'a str, branch: &'a str },
}

impl<'a> PushTarget<'a> {
    #[must_use]
    pub const fn remote(&self) -> &'a str {
        match self {
            Self::Upstream { remote, .. } | Self::Publish { remote, .. } => remote,
        }
    }

    /// Branch name on the remote side.
    #[must_use]
    pub const fn branch(&self) -> &'a str {
        match self {
            Self::Upstream { branch, .. } | Self::Publish { branch, .. } => branch,
        }
    }
}

/// Where a `config set` lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigScope {
    /// The repository's own config.
    #[default]
    Local,
    /// The user's global config.
    Global,
}

/// Trait for git repository operations.
///
/// Every call returns the raw [`CommandOutput`]. An `Err` means the call could
/// not be carried out at all (git missing, timeout), never that git reported
/// a non-zero status.
///
/// Read calls never touch the working tree. Mutating calls may be re-invoked
/// safely, except `commit`, which exits non-zero when nothing is staged.
#[allow(clippy::missing_errors_doc)]
pub trait GitOps {
    // === Repository Info ===

    /// Root of the working tree the adapter operates on.
    fn workdir(&self) -> &Path;

    /// Whether version-control metadata was found.
    fn is_repository(&self) -> bool;

    /// Current branch name, empty output when HEAD is detached.
    fn current_branch(&self) -> Result<CommandOutput>;

    /// URL of the named remote.
    fn remote_url(&self, remote: &str) -> Result<CommandOutput>;

    /// Short name of the configured upstream of HEAD.
    fn upstream(&self) -> Result<CommandOutput>;

    // === Read Calls ===

    /// Porcelain status, one changed path per line.
    fn status(&self) -> Result<CommandOutput>;

    /// Names of staged paths.
    fn staged(&self) -> Result<CommandOutput>;

    /// Names of paths with unresolved conflicts.
    fn conflicted(&self) -> Result<CommandOutput>;

    /// Refresh remote refs, giving up after `timeout`.
    fn fetch(&self, remote: &str, timeout: Duration) -> Result<CommandOutput>;

    /// `ahead<TAB>behind` of HEAD relative to `upstream`.
    fn divergence(&self, upstream: &str) -> Result<CommandOutput>;

    /// Commits reachable from HEAD but not from `upstream`.
    fn unpublished(&self, upstream: &str) -> Result<CommandOutput>;

    /// History listing.
    fn log(&self, limit: usize, format: LogFormat) -> Result<CommandOutput>;

    /// Diff listing.
    fn diff(&self, view: DiffView) -> Result<CommandOutput>;

    /// Stash entries, newest first.
    fn stash_list(&self) -> Result<CommandOutput>;

    /// Read a config value.
    fn config_get(&self, key: &str) -> Result<CommandOutput>;

    // === Mutating Calls ===

    /// Stage every change, tracked and untracked.
    fn add_all(&self) -> Result<CommandOutput>;

    /// Commit the staged set.
    fn commit(&self, message: &str) -> Result<CommandOutput>;

    /// Push `HEAD` to `target`, optionally with `--force-with-lease`.
    fn push(&self, target: PushTarget<'_>, force_with_lease: bool) -> Result<CommandOutput>;

    /// Merge `remote/branch` into the current branch.
    fn pull(&self, remote: &str, branch: &str) -> Result<CommandOutput>;

    /// Shelve all local edits, including untracked files, under `label`.
    fn stash_push(&self, label: &str) -> Result<CommandOutput>;

    /// Restore the newest stash entry. Git keeps the entry if this conflicts.
    fn stash_pop(&self) -> Result<CommandOutput>;

    /// List what a clean would remove, one `Would remove <path>` line each.
    fn clean_preview(&self) -> Result<CommandOutput>;

    /// Remove exactly `paths`, as listed by [`clean_preview`](Self::clean_preview).
    fn clean_paths(&self, paths: &[String]) -> Result<CommandOutput>;

    /// Write a config value.
    fn config_set(&self, key: &str, value: &str, scope: ConfigScope) -> Result<CommandOutput>;
}
