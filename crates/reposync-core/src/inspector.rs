//! Repository state inspection.
//!
//! Captures [`RepositoryState`] snapshots using read-only backend calls.
//! Capturing never fails: anything the backend cannot answer degrades to a
//! default (zero counts, no branch, no URL).

use std::time::Duration;

use chrono::Local;
use reposync_git::{CommandOutput, GitOps};

use crate::state::RepositoryState;

/// Read-only view over a repository that produces snapshots.
pub struct Inspector<'a, G: GitOps> {
    repo: &'a G,
    remote: &'a str,
    fetch_timeout: Duration,
}

impl<'a, G: GitOps> Inspector<'a, G> {
    /// Create an inspector fetching from `remote` with a bounded timeout.
    #[must_use]
    pub const fn new(repo: &'a G, remote: &'a str, fetch_timeout: Duration) -> Self {
        Self {
            repo,
            remote,
            fetch_timeout,
        }
    }

    /// Fetch from the remote, then snapshot.
    ///
    /// A failed or timed-out fetch leaves the remote-tracking refs as they
    /// were, so the counts reflect the last successful fetch.
    #[must_use]
    pub fn capture(&self) -> RepositoryState {
        self.snapshot(true)
    }

    /// Snapshot from local refs only.
    ///
    /// Used between the steps of a composite operation, right after a call
    /// that already updated the remote-tracking refs.
    #[must_use]
    pub fn capture_local(&self) -> RepositoryState {
        self.snapshot(false)
    }

    fn snapshot(&self, fetch: bool) -> RepositoryState {
        if !self.repo.is_repository() {
            return RepositoryState::not_a_repository();
        }

        let changes = lines_or_default(self.repo.status(), "status");
        let remote_url = self
            .repo
            .remote_url(self.remote)
            .ok()
            .filter(CommandOutput::success)
            .and_then(|out| out.first_line().map(String::from));

        if fetch {
            if remote_url.is_some() {
                self.fetch();
            } else {
                tracing::debug!(remote = self.remote, "remote not configured, skipping fetch");
            }
        }

        let current_branch = self
            .repo
            .current_branch()
            .ok()
            .and_then(|out| out.first_line().map(String::from))
            .unwrap_or_default();

        let upstream = self
            .repo
            .upstream()
            .ok()
            .filter(CommandOutput::success)
            .and_then(|out| out.first_line().map(String::from));

        let (ahead, behind) = upstream
            .as_deref()
            .map_or((0, 0), |upstream| self.divergence(upstream));

        let stash_count = lines_or_default(self.repo.stash_list(), "stash list").len();

        let state = RepositoryState {
            is_repository: true,
            is_dirty: !changes.is_empty(),
            ahead,
            behind,
            current_branch,
            remote_url,
            upstream,
            changes,
            stash_count,
            captured_at: Local::now(),
        };
        tracing::debug!(
            state = %state.sync_state(),
            dirty = state.is_dirty,
            ahead = state.ahead,
            behind = state.behind,
            branch = %state.current_branch,
            "captured repository state"
        );
        state
    }

    fn fetch(&self) {
        match self.repo.fetch(self.remote, self.fetch_timeout) {
            Ok(out) if out.success() => {}
            Ok(out) => {
                tracing::warn!(remote = self.remote, reason = %out.reason(), "fetch failed, using last known remote state");
            }
            Err(e) => {
                tracing::warn!(remote = self.remote, error = %e, "fetch failed, using last known remote state");
            }
        }
    }

    fn divergence(&self, upstream: &str) -> (usize, usize) {
        let Some(out) = self.repo.divergence(upstream).ok().filter(CommandOutput::success) else {
            return (0, 0);
        };
        match out.counts().as_slice() {
            [ahead, behind] => (*ahead, *behind),
            _ => {
                tracing::debug!(output = ?out.lines, "unparseable divergence output");
                (0, 0)
            }
        }
    }
}

fn lines_or_default(result: reposync_git::Result<CommandOutput>, what: &str) -> Vec<String> {
    match result {
        Ok(out) if out.success() => out.lines,
        Ok(out) => {
            tracing::warn!(call = what, reason = %out.reason(), "read call failed");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(call = what, error = %e, "read call failed");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_mocks::{FetchBehavior, MockGitOps};

    fn inspect(repo: &MockGitOps) -> RepositoryState {
        Inspector::new(repo, "origin", Duration::from_secs(1)).capture()
    }

    #[test]
    fn test_not_a_repository_short_circuits() {
        let repo = MockGitOps::not_a_repository();
        let state = inspect(&repo);

        assert!(!state.is_repository);
        assert!(repo.calls().is_empty());
    }

    #[test]
    fn test_clean_in_sync_repository() {
        let repo = MockGitOps::new();
        let state = inspect(&repo);

        assert!(state.is_repository);
        assert!(!state.is_dirty);
        assert_eq!((state.ahead, state.behind), (0, 0));
        assert_eq!(state.current_branch, "main");
        assert_eq!(state.upstream.as_deref(), Some("origin/main"));
        assert_eq!(
            state.remote_url.as_deref(),
            Some("git@example.com:team/project.git")
        );
        assert_eq!(repo.count("fetch origin"), 1);
    }

    #[test]
    fn test_dirty_and_diverged() {
        let repo = MockGitOps::new()
            .with_modified(&["src/lib.rs"])
            .with_untracked(&["notes.txt"])
            .with_ahead(2)
            .with_behind(3);
        let state = inspect(&repo);

        assert!(state.is_dirty);
        assert_eq!(state.changes, vec![" M src/lib.rs", "?? notes.txt"]);
        assert_eq!((state.ahead, state.behind), (2, 3));
    }

    #[test]
    fn test_fetch_timeout_keeps_last_known_counts() {
        let repo = MockGitOps::new()
            .with_behind(4)
            .with_fetch(FetchBehavior::TimeOut);
        let state = inspect(&repo);

        assert_eq!(state.behind, 4);
    }

    #[test]
    fn test_fetch_failure_is_silent() {
        let repo = MockGitOps::new().with_fetch(FetchBehavior::Fail).with_ahead(1);
        let state = inspect(&repo);

        assert!(state.is_repository);
        assert_eq!(state.ahead, 1);
    }

    #[test]
    fn test_unparseable_divergence_is_zero() {
        let repo = MockGitOps::new().with_ahead(5).with_garbled_divergence();
        let state = inspect(&repo);

        assert_eq!((state.ahead, state.behind), (0, 0));
    }

    #[test]
    fn test_no_upstream_means_zero_counts() {
        let repo = MockGitOps::new().without_upstream().with_ahead(2);
        let state = inspect(&repo);

        assert_eq!(state.upstream, None);
        assert_eq!((state.ahead, state.behind), (0, 0));
        assert_eq!(repo.count("divergence"), 0);
    }

    #[test]
    fn test_capture_never_mutates() {
        let repo = MockGitOps::new().with_modified(&["a.txt"]).with_behind(1);
        let _ = inspect(&repo);

        assert!(repo.mutating_calls().is_empty());
    }

    #[test]
    fn test_capture_local_skips_fetch() {
        let repo = MockGitOps::new();
        let _ = Inspector::new(&repo, "origin", Duration::from_secs(1)).capture_local();

        assert_eq!(repo.count("fetch"), 0);
    }

    #[test]
    fn test_detached_head_has_empty_branch() {
        let repo = MockGitOps::new().with_detached_head();
        let state = inspect(&repo);

        assert!(state.is_detached());
    }
}
