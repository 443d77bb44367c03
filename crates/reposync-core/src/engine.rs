//! Sync engine sequencing multi-step operations.
//!
//! Each operation runs to completion against the backend, one call at a
//! time. A step that cannot continue ends the operation with its
//! [`Outcome`]; nothing already done is rolled back, and no stash entry is
//! ever dropped by the engine.

use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Local;
use reposync_git::{CommandOutput, GitOps, PushTarget};

use crate::config::Config;
use crate::gate::{self, Confirm, Preview};
use crate::inspector::Inspector;
use crate::operation::{FailureReason, OperationKind, Outcome, SyncOperation};
use crate::state::RepositoryState;

/// A step either continues with a value or ends the operation.
type Step<T> = std::result::Result<T, Outcome>;

/// Prefix of stash labels created by auto-pull.
pub const AUTOSTASH_PREFIX: &str = "reposync-autostash";

static AUTOSTASH_SEQUENCE: AtomicU32 = AtomicU32::new(0);

/// Executes [`SyncOperation`]s against a backend.
pub struct SyncEngine<'a, G: GitOps, C: Confirm + ?Sized> {
    repo: &'a G,
    gate: &'a C,
    config: &'a Config,
}

impl<'a, G: GitOps, C: Confirm + ?Sized> SyncEngine<'a, G, C> {
    /// Create an engine.
    #[must_use]
    pub const fn new(repo: &'a G, gate: &'a C, config: &'a Config) -> Self {
        Self { repo, gate, config }
    }

    fn remote(&self) -> &str {
        &self.config.general.remote
    }

    /// Run an operation and report its outcome. The operation is consumed.
    pub fn execute(&self, op: SyncOperation) -> Outcome {
        let state = &op.precondition;
        tracing::info!(kind = %op.kind, state = %state.sync_state(), dirty = state.is_dirty, "executing");

        if !state.is_repository {
            return Outcome::Failed(FailureReason::NotARepository);
        }

        let result = match op.kind {
            OperationKind::AutoPush | OperationKind::CustomPush | OperationKind::QuickCommit => {
                self.commit_and_push(&op, state)
            }
            OperationKind::AutoPull => self.auto_pull(state),
            OperationKind::FullSync => self.full_sync(&op),
            OperationKind::EmergencyBackup => self.emergency_backup(&op),
            OperationKind::Cleanup => self.cleanup(),
        };
        let outcome = result.unwrap_or_else(|outcome| outcome);

        tracing::info!(kind = %op.kind, %outcome, "finished");
        outcome
    }

    /// Stage everything, commit, push. Never forces.
    fn commit_and_push(&self, op: &SyncOperation, state: &RepositoryState) -> Step<Outcome> {
        if !state.is_dirty {
            return Ok(Outcome::NoOpNothingToDo);
        }
        let target = self.target(state)?;
        let message = op
            .commit_message(&self.config.messages, Local::now())
            .ok_or(Outcome::Failed(FailureReason::MissingMessage))?;

        if !self.stage_all()? {
            return Ok(Outcome::NoOpNothingToDo);
        }
        if !self.commit(&message)? {
            return Ok(Outcome::NoOpNothingToDo);
        }
        self.push(target, false)?;
        Ok(Outcome::Success)
    }

    /// Pull, shelving local edits around the merge.
    fn auto_pull(&self, state: &RepositoryState) -> Step<Outcome> {
        if state.behind == 0 {
            return Ok(Outcome::NoOpNothingToDo);
        }
        let target = self.target(state)?;

        let stash = if state.is_dirty {
            self.stash()?
        } else {
            None
        };

        let pulled = self.repo.pull(target.remote(), target.branch())?;
        if !pulled.success() {
            if is_conflict(&pulled) {
                tracing::warn!(stash = ?stash, "pull stopped on a merge conflict");
                return Err(Outcome::Conflict {
                    files: self.conflicted_files(),
                    stash,
                });
            }
            tracing::warn!(reason = %pulled.reason(), "pull failed");
            // HEAD did not move, so restoring the shelved edits cannot conflict.
            if let Some(label) = &stash {
                self.unstash(label)?;
            }
            return Err(failure(&pulled));
        }

        if let Some(label) = &stash {
            self.unstash(label)?;
        }
        Ok(Outcome::Success)
    }

    /// Auto-pull when behind, then commit and push what is pending.
    fn full_sync(&self, op: &SyncOperation) -> Step<Outcome> {
        let before = &op.precondition;
        let pulled = before.behind > 0;
        if pulled {
            self.auto_pull(before)?;
        }

        // The pull changed the tree and refs; decide the push phase on fresh state.
        let current = if pulled {
            self.inspector().capture_local()
        } else {
            before.clone()
        };

        let pushed = if current.is_dirty {
            self.commit_and_push(op, &current)?
        } else if current.ahead > 0 {
            self.push(self.target(&current)?, false)?;
            Outcome::Success
        } else {
            Outcome::NoOpNothingToDo
        };

        if pulled && pushed == Outcome::NoOpNothingToDo {
            Ok(Outcome::Success)
        } else {
            Ok(pushed)
        }
    }

    /// Commit everything and get it onto the remote.
    ///
    /// Force-with-lease is tried once, only after a plain push was rejected,
    /// and only with the operator's confirmation.
    fn emergency_backup(&self, op: &SyncOperation) -> Step<Outcome> {
        let state = &op.precondition;
        let target = self.target(state)?;
        let message = op
            .commit_message(&self.config.messages, Local::now())
            .ok_or(Outcome::Failed(FailureReason::MissingMessage))?;

        let committed = self.stage_all()? && self.commit(&message)?;
        if !committed && state.ahead == 0 && state.upstream.is_some() {
            return Ok(Outcome::NoOpNothingToDo);
        }

        match self.push(target, false) {
            Ok(()) => Ok(Outcome::Success),
            Err(Outcome::Failed(FailureReason::Rejected)) => {
                tracing::warn!(?target, "backup push rejected, offering force-with-lease");
                let preview = Preview::new(
                    format!(
                        "Force-with-lease push of '{}' to '{}'. Local commits:",
                        target.branch(),
                        target.remote()
                    ),
                    self.unpublished_commits(state, target),
                );
                if !gate::confirm(
                    self.gate,
                    &preview,
                    "Overwrite the remote branch if it has not moved since the last fetch?",
                ) {
                    return Err(Outcome::Failed(FailureReason::Cancelled));
                }
                self.push(target, true)?;
                Ok(Outcome::Success)
            }
            Err(other) => Err(other),
        }
    }

    /// Remove untracked files, after a preview and explicit confirmation.
    ///
    /// Only the previewed paths are removed; anything that appears while the
    /// operator is deciding stays.
    fn cleanup(&self) -> Step<Outcome> {
        let listed = self.repo.clean_preview()?;
        if !listed.success() {
            return Err(failure(&listed));
        }

        // Nested repositories are reported as "Would skip repository" and kept.
        let paths: Vec<String> = listed
            .lines
            .iter()
            .filter_map(|line| line.strip_prefix("Would remove "))
            .map(String::from)
            .collect();
        if paths.is_empty() {
            return Ok(Outcome::NoOpNothingToDo);
        }

        let preview = Preview::new("Untracked files that will be deleted:", paths);
        if !gate::confirm(self.gate, &preview, "Delete these files permanently?") {
            return Err(Outcome::Failed(FailureReason::Cancelled));
        }

        let removed = self.repo.clean_paths(&preview.items)?;
        if removed.success() {
            Ok(Outcome::Success)
        } else {
            Err(failure(&removed))
        }
    }

    // === Steps ===

    fn inspector(&self) -> Inspector<'_, G> {
        Inspector::new(self.repo, self.remote(), self.config.fetch_timeout())
    }

    /// Where this branch pulls from and pushes to: its configured upstream,
    /// or the configured remote under the branch's own name when it has none.
    fn target<'s>(&'s self, state: &'s RepositoryState) -> Step<PushTarget<'s>> {
        if state.is_detached() {
            return Err(Outcome::Failed(FailureReason::DetachedHead));
        }
        let tracked = state
            .upstream
            .as_deref()
            .and_then(|upstream| split_upstream(upstream, self.remote()));
        Ok(match tracked {
            Some((remote, branch)) => PushTarget::Upstream { remote, branch },
            None => PushTarget::Publish {
                remote: self.remote(),
                branch: &state.current_branch,
            },
        })
    }

    /// Stage everything. Returns whether anything ended up staged.
    fn stage_all(&self) -> Step<bool> {
        let added = self.repo.add_all()?;
        if !added.success() {
            return Err(failure(&added));
        }
        let staged = self.repo.staged()?;
        if !staged.success() {
            return Err(failure(&staged));
        }
        Ok(!staged.is_empty())
    }

    /// Commit the staged set. Returns `false` if git found nothing to commit.
    fn commit(&self, message: &str) -> Step<bool> {
        let out = self.repo.commit(message)?;
        if out.success() {
            tracing::info!(%message, "committed");
            Ok(true)
        } else if out.mentions("nothing to commit") || out.mentions("no changes added") {
            tracing::info!("nothing to commit");
            Ok(false)
        } else {
            Err(failure(&out))
        }
    }

    fn push(&self, target: PushTarget<'_>, force_with_lease: bool) -> Step<()> {
        let out = self.repo.push(target, force_with_lease)?;
        if out.success() {
            tracing::info!(?target, force_with_lease, "pushed");
            Ok(())
        } else if is_rejection(&out) {
            tracing::warn!(?target, force_with_lease, reason = %out.reason(), "push rejected");
            Err(Outcome::Failed(FailureReason::Rejected))
        } else {
            Err(failure(&out))
        }
    }

    /// Shelve local edits. Returns the label if a stash entry was created.
    fn stash(&self) -> Step<Option<String>> {
        let label = autostash_label();
        let out = self.repo.stash_push(&label)?;
        if !out.success() {
            return Err(failure(&out));
        }
        if self.newest_stash_is(&label)? {
            tracing::info!(%label, "stashed local changes");
            Ok(Some(label))
        } else {
            tracing::debug!("nothing was stashed");
            Ok(None)
        }
    }

    /// Restore the stash entry created by this operation.
    ///
    /// A failed pop keeps the entry and ends the operation as a conflict.
    fn unstash(&self, label: &str) -> Step<()> {
        if !self.newest_stash_is(label)? {
            return Err(Outcome::failed(format!(
                "stash entry '{label}' is no longer the newest; restore it with `git stash list` and `git stash apply`"
            )));
        }
        let out = self.repo.stash_pop()?;
        if out.success() {
            tracing::info!(%label, "restored local changes");
            Ok(())
        } else {
            tracing::warn!(%label, reason = %out.reason(), "stash pop conflicted, entry kept");
            Err(Outcome::Conflict {
                files: self.conflicted_files(),
                stash: Some(label.to_string()),
            })
        }
    }

    fn newest_stash_is(&self, label: &str) -> Step<bool> {
        let list = self.repo.stash_list()?;
        Ok(list
            .first_line()
            .is_some_and(|entry| entry.ends_with(&format!(": {label}"))))
    }

    fn conflicted_files(&self) -> Vec<String> {
        self.repo
            .conflicted()
            .ok()
            .filter(CommandOutput::success)
            .map(|out| out.lines)
            .unwrap_or_default()
    }

    fn unpublished_commits(&self, state: &RepositoryState, target: PushTarget<'_>) -> Vec<String> {
        let upstream = state
            .upstream
            .clone()
            .unwrap_or_else(|| format!("{}/{}", target.remote(), target.branch()));
        self.repo
            .unpublished(&upstream)
            .ok()
            .filter(CommandOutput::success)
            .map(|out| out.lines)
            .unwrap_or_default()
    }
}

/// Split `remote/branch`, preferring `remote` as the prefix since remote
/// names may contain slashes.
fn split_upstream<'u>(upstream: &'u str, remote: &str) -> Option<(&'u str, &'u str)> {
    let preferred = upstream
        .strip_prefix(remote)
        .and_then(|rest| rest.strip_prefix('/'))
        .map(|branch| (&upstream[..remote.len()], branch));
    preferred
        .or_else(|| upstream.split_once('/'))
        .filter(|(remote, branch)| !remote.is_empty() && !branch.is_empty())
}

/// A stash label unique to this operation.
fn autostash_label() -> String {
    format!(
        "{AUTOSTASH_PREFIX}-{}-{}",
        Local::now().format("%Y%m%d-%H%M%S%.6f"),
        AUTOSTASH_SEQUENCE.fetch_add(1, Ordering::Relaxed)
    )
}

fn is_rejection(out: &CommandOutput) -> bool {
    ["[rejected]", "non-fast-forward", "fetch first", "stale info"]
        .iter()
        .any(|needle| out.mentions(needle))
}

fn is_conflict(out: &CommandOutput) -> bool {
    ["CONFLICT", "Automatic merge failed", "unmerged files"]
        .iter()
        .any(|needle| out.mentions(needle))
}

fn failure(out: &CommandOutput) -> Outcome {
    Outcome::failed(out.reason())
}
