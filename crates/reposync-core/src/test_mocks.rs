//! Mock implementations for testing the engine and session.
//!
//! `MockGitOps` simulates just enough of a repository (changes, staged set,
//! divergence counters, stash stack) for multi-step operations to observe the
//! effect of earlier steps, and records every backend call.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::time::Duration;

use reposync_git::{
    CommandOutput, ConfigScope, DiffView, Error as GitError, GitOps, LogFormat, PushTarget,
    Result as GitResult,
};

use crate::gate::{Confirm, Preview};
use crate::operation::{OperationKind, Outcome};
use crate::session::Terminal;
use crate::state::RepositoryState;

/// How the simulated fetch behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchBehavior {
    Succeed,
    Fail,
    TimeOut,
}

/// A shelved set of edits.
#[derive(Debug, Clone)]
struct StashEntry {
    label: String,
    changes: Vec<String>,
}

/// Mock implementation of `GitOps` for testing.
pub struct MockGitOps {
    pub workdir: PathBuf,
    pub is_repository: bool,
    pub branch: RefCell<String>,
    pub remote_url: Option<String>,
    pub upstream: RefCell<Option<String>>,
    /// Modified tracked paths.
    pub modified: RefCell<Vec<String>>,
    /// Untracked paths.
    pub untracked: RefCell<Vec<String>>,
    /// Untracked directories holding their own repository; clean skips them.
    pub nested_repositories: RefCell<Vec<String>>,
    pub staged: RefCell<Vec<String>>,
    pub ahead: Cell<usize>,
    pub behind: Cell<usize>,
    stashes: RefCell<Vec<StashEntry>>,
    pub conflicted: RefCell<Vec<String>>,
    pub fetch_behavior: Cell<FetchBehavior>,
    pub garbled_divergence: Cell<bool>,
    /// Number of upcoming plain pushes the remote rejects.
    pub reject_pushes: Cell<usize>,
    /// Whether force-with-lease finds the remote moved.
    pub stale_lease: Cell<bool>,
    pub push_error: RefCell<Option<String>>,
    pub pull_conflict: Cell<bool>,
    pub pull_error: RefCell<Option<String>>,
    pub pop_conflict: Cell<bool>,
    pub config: RefCell<HashMap<String, String>>,
    calls: RefCell<Vec<String>>,
}

impl Default for MockGitOps {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGitOps {
    /// A clean repository on `main`, tracking `origin/main`, in sync.
    pub fn new() -> Self {
        Self {
            workdir: PathBuf::from("/mock/repo"),
            is_repository: true,
            branch: RefCell::new("main".to_string()),
            remote_url: Some("git@example.com:team/project.git".to_string()),
            upstream: RefCell::new(Some("origin/main".to_string())),
            modified: RefCell::new(Vec::new()),
            untracked: RefCell::new(Vec::new()),
            nested_repositories: RefCell::new(Vec::new()),
            staged: RefCell::new(Vec::new()),
            ahead: Cell::new(0),
            behind: Cell::new(0),
            stashes: RefCell::new(Vec::new()),
            conflicted: RefCell::new(Vec::new()),
            fetch_behavior: Cell::new(FetchBehavior::Succeed),
            garbled_divergence: Cell::new(false),
            reject_pushes: Cell::new(0),
            stale_lease: Cell::new(false),
            push_error: RefCell::new(None),
            pull_conflict: Cell::new(false),
            pull_error: RefCell::new(None),
            pop_conflict: Cell::new(false),
            config: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn not_a_repository() -> Self {
        Self {
            is_repository: false,
            upstream: RefCell::new(None),
            ..Self::new()
        }
    }

    pub fn with_workdir(mut self, path: &Path) -> Self {
        self.workdir = path.to_path_buf();
        self
    }

    pub fn with_modified(self, paths: &[&str]) -> Self {
        self.modified
            .borrow_mut()
            .extend(paths.iter().map(ToString::to_string));
        self
    }

    pub fn with_untracked(self, paths: &[&str]) -> Self {
        self.untracked
            .borrow_mut()
            .extend(paths.iter().map(ToString::to_string));
        self
    }

    pub fn with_nested_repository(self, path: &str) -> Self {
        self.nested_repositories.borrow_mut().push(path.to_string());
        self
    }

    pub fn with_branch(self, name: &str) -> Self {
        *self.branch.borrow_mut() = name.to_string();
        self
    }

    pub fn with_upstream(self, upstream: &str) -> Self {
        *self.upstream.borrow_mut() = Some(upstream.to_string());
        self
    }

    pub fn with_ahead(self, n: usize) -> Self {
        self.ahead.set(n);
        self
    }

    pub fn with_behind(self, n: usize) -> Self {
        self.behind.set(n);
        self
    }

    pub fn with_detached_head(self) -> Self {
        self.branch.borrow_mut().clear();
        self
    }

    pub fn without_upstream(self) -> Self {
        *self.upstream.borrow_mut() = None;
        self
    }

    pub fn with_fetch(self, behavior: FetchBehavior) -> Self {
        self.fetch_behavior.set(behavior);
        self
    }

    pub fn with_garbled_divergence(self) -> Self {
        self.garbled_divergence.set(true);
        self
    }

    pub fn with_rejected_pushes(self, n: usize) -> Self {
        self.reject_pushes.set(n);
        self
    }

    pub fn with_stale_lease(self) -> Self {
        self.stale_lease.set(true);
        self
    }

    pub fn with_push_error(self, message: &str) -> Self {
        *self.push_error.borrow_mut() = Some(message.to_string());
        self
    }

    pub fn with_pull_conflict(self) -> Self {
        self.pull_conflict.set(true);
        self
    }

    pub fn with_pull_error(self, message: &str) -> Self {
        *self.pull_error.borrow_mut() = Some(message.to_string());
        self
    }

    pub fn with_pop_conflict(self) -> Self {
        self.pop_conflict.set(true);
        self
    }

    /// Every backend call made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Number of calls whose description starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Calls that change the working tree, refs, stash or remote.
    pub fn mutating_calls(&self) -> Vec<String> {
        const MUTATING: [&str; 8] = [
            "add", "commit", "push", "pull", "stash push", "stash pop", "clean -f", "config set",
        ];
        self.calls
            .borrow()
            .iter()
            .filter(|c| MUTATING.iter().any(|m| c.starts_with(m)))
            .cloned()
            .collect()
    }

    pub fn stash_labels(&self) -> Vec<String> {
        self.stashes
            .borrow()
            .iter()
            .map(|s| s.label.clone())
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        !self.modified.borrow().is_empty()
            || !self.untracked.borrow().is_empty()
            || !self.staged.borrow().is_empty()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }
}

impl GitOps for MockGitOps {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn is_repository(&self) -> bool {
        self.is_repository
    }

    fn current_branch(&self) -> GitResult<CommandOutput> {
        self.record("current_branch");
        if !self.is_repository {
            return Err(GitError::NotARepository);
        }
        let branch = self.branch.borrow().clone();
        Ok(CommandOutput::ok(Some(branch).filter(|b| !b.is_empty())))
    }

    fn remote_url(&self, remote: &str) -> GitResult<CommandOutput> {
        self.record(format!("remote_url {remote}"));
        Ok(self.remote_url.clone().map_or_else(
            || CommandOutput::failed(2, [format!("no such remote '{remote}'")]),
            |url| CommandOutput::ok([url]),
        ))
    }

    fn upstream(&self) -> GitResult<CommandOutput> {
        self.record("upstream");
        Ok(self.upstream.borrow().clone().map_or_else(
            || CommandOutput::failed(128, ["fatal: no upstream configured for branch"]),
            |u| CommandOutput::ok([u]),
        ))
    }

    fn status(&self) -> GitResult<CommandOutput> {
        self.record("status");
        let staged = self.staged.borrow();
        let modified = self.modified.borrow();
        let untracked = self.untracked.borrow();
        let lines = staged
            .iter()
            .map(|p| format!("M  {p}"))
            .chain(modified.iter().map(|p| format!(" M {p}")))
            .chain(untracked.iter().map(|p| format!("?? {p}")));
        Ok(CommandOutput::ok(lines))
    }

    fn staged(&self) -> GitResult<CommandOutput> {
        self.record("staged");
        Ok(CommandOutput::ok(self.staged.borrow().clone()))
    }

    fn conflicted(&self) -> GitResult<CommandOutput> {
        self.record("conflicted");
        Ok(CommandOutput::ok(self.conflicted.borrow().clone()))
    }

    fn fetch(&self, remote: &str, timeout: Duration) -> GitResult<CommandOutput> {
        self.record(format!("fetch {remote}"));
        match self.fetch_behavior.get() {
            FetchBehavior::Succeed => Ok(CommandOutput::ok(Vec::<String>::new())),
            FetchBehavior::Fail => Ok(CommandOutput::failed(
                128,
                ["fatal: unable to access remote: Could not resolve host"],
            )),
            FetchBehavior::TimeOut => Err(GitError::Timeout {
                command: format!("git fetch --quiet {remote}"),
                secs: timeout.as_secs(),
            }),
        }
    }

    fn divergence(&self, upstream: &str) -> GitResult<CommandOutput> {
        self.record(format!("divergence {upstream}"));
        if self.garbled_divergence.get() {
            return Ok(CommandOutput::ok(["warning: refname is ambiguous"]));
        }
        Ok(CommandOutput::ok([format!(
            "{}\t{}",
            self.ahead.get(),
            self.behind.get()
        )]))
    }

    fn unpublished(&self, upstream: &str) -> GitResult<CommandOutput> {
        self.record(format!("unpublished {upstream}"));
        Ok(CommandOutput::ok(
            (1..=self.ahead.get()).map(|n| format!("abc{n:04} local commit {n}")),
        ))
    }

    fn log(&self, limit: usize, format: LogFormat) -> GitResult<CommandOutput> {
        self.record(format!("log {limit} {format:?}"));
        Ok(CommandOutput::ok(["abc0001 Initial commit"]))
    }

    fn diff(&self, view: DiffView) -> GitResult<CommandOutput> {
        self.record(format!("diff {view:?}"));
        Ok(CommandOutput::ok(
            self.modified
                .borrow()
                .iter()
                .map(|p| format!("diff --git a/{p} b/{p}")),
        ))
    }

    fn stash_list(&self) -> GitResult<CommandOutput> {
        self.record("stash list");
        let branch = self.branch.borrow().clone();
        Ok(CommandOutput::ok(
            self.stashes
                .borrow()
                .iter()
                .enumerate()
                .map(|(i, s)| format!("stash@{{{i}}}: On {branch}: {}", s.label)),
        ))
    }

    fn config_get(&self, key: &str) -> GitResult<CommandOutput> {
        self.record(format!("config get {key}"));
        Ok(self.config.borrow().get(key).cloned().map_or_else(
            || CommandOutput::failed(1, Vec::<String>::new()),
            |v| CommandOutput::ok([v]),
        ))
    }

    fn add_all(&self) -> GitResult<CommandOutput> {
        self.record("add -A");
        let mut staged = self.staged.borrow_mut();
        staged.append(&mut self.modified.borrow_mut());
        staged.append(&mut self.untracked.borrow_mut());
        Ok(CommandOutput::ok(Vec::<String>::new()))
    }

    fn commit(&self, message: &str) -> GitResult<CommandOutput> {
        self.record(format!("commit {message}"));
        if self.staged.borrow().is_empty() {
            return Ok(CommandOutput {
                lines: vec!["nothing to commit, working tree clean".to_string()],
                stderr: Vec::new(),
                status: Some(1),
            });
        }
        self.staged.borrow_mut().clear();
        self.ahead.set(self.ahead.get() + 1);
        Ok(CommandOutput::ok([format!("[main abc1234] {message}")]))
    }

    fn push(&self, target: PushTarget<'_>, force_with_lease: bool) -> GitResult<CommandOutput> {
        let (remote, branch) = (target.remote(), target.branch());
        let destination = match target {
            PushTarget::Upstream { .. } => format!("{remote} HEAD:{branch}"),
            PushTarget::Publish { .. } => format!("-u {remote} {branch}"),
        };
        if force_with_lease {
            self.record(format!("push --force-with-lease {destination}"));
            if self.stale_lease.get() {
                return Ok(CommandOutput::failed(
                    1,
                    [format!(" ! [rejected]        HEAD -> {branch} (stale info)")],
                ));
            }
            self.ahead.set(0);
            self.behind.set(0);
        } else {
            self.record(format!("push {destination}"));
            if let Some(message) = self.push_error.borrow().clone() {
                return Ok(CommandOutput::failed(128, [message]));
            }
            let rejections = self.reject_pushes.get();
            if rejections > 0 {
                self.reject_pushes.set(rejections - 1);
                return Ok(CommandOutput::failed(
                    1,
                    [
                        format!(" ! [rejected]        HEAD -> {branch} (fetch first)"),
                        "error: failed to push some refs".to_string(),
                    ],
                ));
            }
            self.ahead.set(0);
        }
        if let PushTarget::Publish { .. } = target {
            *self.upstream.borrow_mut() = Some(format!("{remote}/{branch}"));
        }
        Ok(CommandOutput::ok(Vec::<String>::new()))
    }

    fn pull(&self, remote: &str, branch: &str) -> GitResult<CommandOutput> {
        self.record(format!("pull {remote} {branch}"));
        if let Some(message) = self.pull_error.borrow().clone() {
            return Ok(CommandOutput::failed(1, [message]));
        }
        if self.is_dirty() {
            return Ok(CommandOutput::failed(
                1,
                ["error: Your local changes to the following files would be overwritten by merge"],
            ));
        }
        if self.pull_conflict.get() {
            self.conflicted.borrow_mut().push("shared.txt".to_string());
            return Ok(CommandOutput {
                lines: vec![
                    "CONFLICT (content): Merge conflict in shared.txt".to_string(),
                    "Automatic merge failed; fix conflicts and then commit the result."
                        .to_string(),
                ],
                stderr: Vec::new(),
                status: Some(1),
            });
        }
        if self.ahead.get() > 0 {
            // merge commit
            self.ahead.set(self.ahead.get() + 1);
        }
        self.behind.set(0);
        Ok(CommandOutput::ok(["Fast-forward"]))
    }

    fn stash_push(&self, label: &str) -> GitResult<CommandOutput> {
        self.record(format!("stash push {label}"));
        if !self.is_dirty() {
            return Ok(CommandOutput::ok(["No local changes to save"]));
        }
        let mut changes = self.staged.take();
        changes.append(&mut self.modified.borrow_mut());
        changes.append(&mut self.untracked.borrow_mut());
        self.stashes.borrow_mut().insert(
            0,
            StashEntry {
                label: label.to_string(),
                changes,
            },
        );
        Ok(CommandOutput::ok([format!(
            "Saved working directory and index state On main: {label}"
        )]))
    }

    fn stash_pop(&self) -> GitResult<CommandOutput> {
        self.record("stash pop");
        let Some(top) = self.stashes.borrow().first().cloned() else {
            return Ok(CommandOutput::failed(1, ["No stash entries found."]));
        };
        self.modified.borrow_mut().extend(top.changes);
        if self.pop_conflict.get() {
            self.conflicted.borrow_mut().push("shared.txt".to_string());
            return Ok(CommandOutput {
                lines: vec!["CONFLICT (content): Merge conflict in shared.txt".to_string()],
                stderr: vec!["The stash entry is kept in case you need it again.".to_string()],
                status: Some(1),
            });
        }
        self.stashes.borrow_mut().remove(0);
        Ok(CommandOutput::ok(["Dropped refs/stash@{0}"]))
    }

    fn clean_preview(&self) -> GitResult<CommandOutput> {
        self.record("clean -n");
        let untracked = self.untracked.borrow();
        let nested = self.nested_repositories.borrow();
        Ok(CommandOutput::ok(
            untracked
                .iter()
                .map(|p| format!("Would remove {p}"))
                .chain(nested.iter().map(|p| format!("Would skip repository {p}"))),
        ))
    }

    fn clean_paths(&self, paths: &[String]) -> GitResult<CommandOutput> {
        self.record(format!("clean -f -- {}", paths.join(" ")));
        self.untracked.borrow_mut().retain(|p| !paths.contains(p));
        Ok(CommandOutput::ok(paths.iter().map(|p| format!("Removing {p}"))))
    }

    fn config_set(&self, key: &str, value: &str, scope: ConfigScope) -> GitResult<CommandOutput> {
        self.record(format!("config set {key} {scope:?}"));
        self.config
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(CommandOutput::ok(Vec::<String>::new()))
    }
}

/// Confirmation gate with a fixed answer that records what it was shown.
pub struct ScriptedConfirm {
    answer: bool,
    events: RefCell<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            events: RefCell::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn was_asked(&self) -> bool {
        self.events.borrow().iter().any(|e| e.starts_with("ask:"))
    }
}

impl Confirm for ScriptedConfirm {
    fn render(&self, preview: &Preview) {
        self.events
            .borrow_mut()
            .push(format!("render: {} ({})", preview.title, preview.items.len()));
    }

    fn ask(&self, prompt: &str) -> bool {
        self.events.borrow_mut().push(format!("ask: {prompt}"));
        self.answer
    }
}

/// Input line that makes [`ScriptedTerminal::read_line`] report an aborted prompt.
pub const ABORTED_PROMPT: &str = "<esc>";

/// Terminal fed from a queue of typed lines; records everything it renders.
pub struct ScriptedTerminal {
    input: RefCell<VecDeque<String>>,
    confirm_answer: bool,
    transcript: RefCell<Vec<String>>,
}

impl ScriptedTerminal {
    pub fn new(input: &[&str]) -> Self {
        Self {
            input: RefCell::new(input.iter().map(ToString::to_string).collect()),
            confirm_answer: false,
            transcript: RefCell::new(Vec::new()),
        }
    }

    pub fn confirming(mut self) -> Self {
        self.confirm_answer = true;
        self
    }

    pub fn transcript(&self) -> Vec<String> {
        self.transcript.borrow().clone()
    }

    /// Outcome lines, e.g. `"outcome: Auto push: done"`.
    pub fn outcomes(&self) -> Vec<String> {
        self.transcript
            .borrow()
            .iter()
            .filter(|l| l.starts_with("outcome:"))
            .cloned()
            .collect()
    }

    fn log(&self, line: String) {
        self.transcript.borrow_mut().push(line);
    }
}

impl Confirm for ScriptedTerminal {
    fn render(&self, preview: &Preview) {
        self.log(format!("preview: {}", preview.title));
    }

    fn ask(&self, prompt: &str) -> bool {
        self.log(format!("ask: {prompt}"));
        self.confirm_answer
    }
}

impl Terminal for ScriptedTerminal {
    fn render_state(&self, state: &RepositoryState) {
        self.log(format!(
            "state: {} ahead={} behind={}",
            state.sync_state(),
            state.ahead,
            state.behind
        ));
    }

    fn render_menu(&self, _last: Option<OperationKind>) {
        self.log("menu".to_string());
    }

    fn read_command(&self) -> Option<String> {
        self.input.borrow_mut().pop_front()
    }

    /// The input `"<esc>"` stands for an aborted prompt.
    fn read_line(&self, prompt: &str) -> Option<String> {
        self.log(format!("prompt: {prompt}"));
        self.input
            .borrow_mut()
            .pop_front()
            .filter(|line| line != ABORTED_PROMPT)
    }

    fn choose(&self, prompt: &str, options: &[&str]) -> Option<usize> {
        self.log(format!("choose: {prompt}"));
        let answer = self.input.borrow_mut().pop_front()?;
        answer
            .parse::<usize>()
            .ok()
            .filter(|i| *i < options.len())
    }

    fn show_lines(&self, title: &str, lines: &[String]) {
        self.log(format!("show: {title} ({})", lines.len()));
    }

    fn render_outcome(&self, kind: OperationKind, outcome: &Outcome) {
        self.log(format!("outcome: {kind}: {outcome}"));
    }

    fn notice(&self, message: &str) {
        self.log(format!("notice: {message}"));
    }
}
