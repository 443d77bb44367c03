//! Interactive session loop.
//!
//! Capture state, render it, read one command, dispatch, repeat. The loop
//! keeps nothing between iterations except the last operation run, which
//! backs the "repeat" command.

use reposync_git::{ConfigScope, DiffView, GitOps, LogFormat};

use crate::config::Config;
use crate::engine::SyncEngine;
use crate::gate::Confirm;
use crate::identity::{self, IdentityKey};
use crate::ignore;
use crate::inspector::Inspector;
use crate::operation::{FailureReason, OperationKind, Outcome, SyncOperation};
use crate::state::RepositoryState;

/// A parsed menu token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    /// Run a sync operation.
    Run(OperationKind),
    /// Show the detailed status report.
    Status,
    /// Show history.
    Log,
    /// Show a diff.
    Diff,
    /// Manage `.gitignore` patterns.
    Ignore,
    /// Show or change the commit identity and credential helper.
    Identity,
    /// Run the last operation again.
    Repeat,
    /// Leave the session.
    Quit,
}

/// Menu entries in display order: token and label.
pub const MENU: [(&str, &str); 14] = [
    ("1", "Auto push (commit everything with a generated message)"),
    ("2", "Custom push (commit with your message)"),
    ("3", "Quick commit"),
    ("4", "Auto pull (stash, pull, restore)"),
    ("5", "Full sync (pull, then commit and push)"),
    ("6", "Emergency backup"),
    ("7", "Status details"),
    ("8", "History"),
    ("9", "Diff"),
    ("10", "Clean untracked files"),
    ("11", "Manage .gitignore"),
    ("12", "Identity and credentials"),
    ("r", "Repeat last operation"),
    ("q", "Quit"),
];

impl MenuCommand {
    /// Parse a typed token. Returns `None` for anything unrecognized.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let command = match token.trim().to_lowercase().as_str() {
            "1" => Self::Run(OperationKind::AutoPush),
            "2" => Self::Run(OperationKind::CustomPush),
            "3" => Self::Run(OperationKind::QuickCommit),
            "4" => Self::Run(OperationKind::AutoPull),
            "5" => Self::Run(OperationKind::FullSync),
            "6" => Self::Run(OperationKind::EmergencyBackup),
            "7" => Self::Status,
            "8" => Self::Log,
            "9" => Self::Diff,
            "10" => Self::Run(OperationKind::Cleanup),
            "11" => Self::Ignore,
            "12" => Self::Identity,
            "r" | "repeat" => Self::Repeat,
            "q" | "quit" | "exit" | "0" => Self::Quit,
            _ => return None,
        };
        Some(command)
    }
}

/// Operator-facing input and output used by the session.
///
/// The session also uses it as the confirmation gate for destructive
/// operations.
pub trait Terminal: Confirm {
    /// Render the state summary heading each iteration.
    fn render_state(&self, state: &RepositoryState);

    /// Render the menu; `last` is offered for repeat.
    fn render_menu(&self, last: Option<OperationKind>);

    /// Read one command token. `None` means input ended.
    fn read_command(&self) -> Option<String>;

    /// Read a free-form line. `None` means the operator gave up.
    fn read_line(&self, prompt: &str) -> Option<String>;

    /// Pick one of `options` by index.
    fn choose(&self, prompt: &str, options: &[&str]) -> Option<usize>;

    /// Show a block of report lines.
    fn show_lines(&self, title: &str, lines: &[String]);

    /// Report an operation outcome, with remediation if any.
    fn render_outcome(&self, kind: OperationKind, outcome: &Outcome);

    /// Show a short warning or note.
    fn notice(&self, message: &str);

    /// Run a state capture that contacts `remote`, e.g. behind a progress
    /// indicator.
    fn capturing(&self, _remote: &str, capture: &dyn Fn() -> RepositoryState) -> RepositoryState {
        capture()
    }
}

/// The last operation run, kept for "repeat".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastOperation {
    /// Which operation ran.
    pub kind: OperationKind,
    /// How it ended.
    pub outcome: Outcome,
}

/// Read-render-dispatch loop over one repository.
pub struct Session<'a, G: GitOps, T: Terminal> {
    repo: &'a G,
    terminal: &'a T,
    config: &'a Config,
    last: Option<LastOperation>,
}

impl<'a, G: GitOps, T: Terminal> Session<'a, G, T> {
    /// Create a session.
    #[must_use]
    pub const fn new(repo: &'a G, terminal: &'a T, config: &'a Config) -> Self {
        Self {
            repo,
            terminal,
            config,
            last: None,
        }
    }

    /// The last operation run in this session.
    #[must_use]
    pub const fn last(&self) -> Option<&LastOperation> {
        self.last.as_ref()
    }

    /// Run until the operator quits or input ends.
    pub fn run(&mut self) {
        loop {
            let state = self
                .terminal
                .capturing(&self.config.general.remote, &|| self.inspector().capture());
            self.terminal.render_state(&state);
            self.terminal
                .render_menu(self.last.as_ref().map(|last| last.kind));

            let Some(token) = self.terminal.read_command() else {
                tracing::debug!("input closed, leaving session");
                break;
            };

            match MenuCommand::parse(&token) {
                Some(MenuCommand::Quit) => break,
                Some(command) => self.dispatch(command, state),
                None => self
                    .terminal
                    .notice(&format!("Unknown command '{}'", token.trim())),
            }
        }
    }

    /// Handle one command against the snapshot captured for it.
    pub fn dispatch(&mut self, command: MenuCommand, state: RepositoryState) {
        tracing::debug!(?command, "dispatching");
        match command {
            MenuCommand::Run(kind) => self.run_operation(kind, state),
            MenuCommand::Repeat => match self.last.as_ref().map(|last| last.kind) {
                Some(kind) => self.run_operation(kind, state),
                None => self.terminal.notice("Nothing to repeat yet"),
            },
            MenuCommand::Status => self.show_status(&state),
            MenuCommand::Log => self.show_log(),
            MenuCommand::Diff => self.show_diff(),
            MenuCommand::Ignore => self.manage_ignore(),
            MenuCommand::Identity => self.manage_identity(),
            MenuCommand::Quit => {}
        }
    }

    fn inspector(&self) -> Inspector<'_, G> {
        Inspector::new(
            self.repo,
            &self.config.general.remote,
            self.config.fetch_timeout(),
        )
    }

    fn run_operation(&mut self, kind: OperationKind, state: RepositoryState) {
        let mut message = None;
        if kind.prompts_for_message() && state.is_dirty {
            // An aborted prompt always cancels; a blank answer asks for a generated message.
            match self.terminal.read_line("Commit message") {
                Some(text) if !text.trim().is_empty() => message = Some(text),
                Some(_) if kind.generates_message() => {}
                _ => {
                    let outcome = Outcome::Failed(FailureReason::Cancelled);
                    self.terminal.render_outcome(kind, &outcome);
                    self.last = Some(LastOperation { kind, outcome });
                    return;
                }
            }
        }

        let op = SyncOperation::new(kind, state).with_message(message);
        let outcome = SyncEngine::new(self.repo, self.terminal, self.config).execute(op);
        self.terminal.render_outcome(kind, &outcome);
        self.last = Some(LastOperation { kind, outcome });
    }

    fn show_status(&self, state: &RepositoryState) {
        let mut lines = status_report(state);
        match self.repo.stash_list() {
            Ok(out) if out.success() && !out.is_empty() => {
                lines.push("Stash entries:".to_string());
                lines.extend(out.lines.into_iter().map(|l| format!("  {l}")));
            }
            Ok(_) => {}
            Err(e) => self.terminal.notice(&format!("Could not list stashes: {e}")),
        }
        self.terminal.show_lines("Status", &lines);
    }

    fn show_log(&self) {
        const FORMATS: [(&str, LogFormat); 3] = [
            ("One line per commit", LogFormat::Oneline),
            ("Graph", LogFormat::Graph),
            ("Detailed", LogFormat::Detailed),
        ];
        let labels: Vec<&str> = FORMATS.iter().map(|(label, _)| *label).collect();
        let Some(choice) = self.terminal.choose("History view", &labels) else {
            return;
        };
        let Some(&(label, format)) = FORMATS.get(choice) else {
            return;
        };
        match self.repo.log(self.config.history.log_limit, format) {
            Ok(out) if out.success() => self.terminal.show_lines(label, &out.lines),
            Ok(out) => self.terminal.notice(&out.reason()),
            Err(e) => self.terminal.notice(&e.to_string()),
        }
    }

    fn show_diff(&self) {
        const VIEWS: [(&str, DiffView); 3] = [
            ("Unstaged changes", DiffView::WorkingTree),
            ("Staged changes", DiffView::Staged),
            ("Summary", DiffView::Stat),
        ];
        let labels: Vec<&str> = VIEWS.iter().map(|(label, _)| *label).collect();
        let Some(choice) = self.terminal.choose("Diff view", &labels) else {
            return;
        };
        let Some(&(label, view)) = VIEWS.get(choice) else {
            return;
        };
        match self.repo.diff(view) {
            Ok(out) if out.success() && out.is_empty() => self.terminal.notice("No differences"),
            Ok(out) if out.success() => self.terminal.show_lines(label, &out.lines),
            Ok(out) => self.terminal.notice(&out.reason()),
            Err(e) => self.terminal.notice(&e.to_string()),
        }
    }

    fn manage_ignore(&self) {
        let workdir = self.repo.workdir();
        match ignore::list_patterns(workdir) {
            Ok(patterns) => self.terminal.show_lines(ignore::IGNORE_FILE, &patterns),
            Err(e) => {
                self.terminal.notice(&e.to_string());
                return;
            }
        }

        let Some(input) = self
            .terminal
            .read_line("Patterns to add, separated by spaces (blank to skip)")
        else {
            return;
        };
        match ignore::add_patterns(workdir, input.split_whitespace()) {
            Ok(added) if added.is_empty() => self.terminal.notice("No new patterns added"),
            Ok(added) => self
                .terminal
                .notice(&format!("Added to .gitignore: {}", added.join(" "))),
            Err(e) => self.terminal.notice(&e.to_string()),
        }
    }

    fn manage_identity(&self) {
        let current = identity::read_identity(self.repo);
        self.terminal.show_lines("Identity", &current.report());

        for key in IdentityKey::ALL {
            let Some(value) = self
                .terminal
                .read_line(&format!("{} (blank to keep)", key.label()))
            else {
                return;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match identity::set_value(self.repo, key, value, ConfigScope::Local) {
                Ok(()) => self
                    .terminal
                    .notice(&format!("Set {} = {value}", key.config_key())),
                Err(e) => self.terminal.notice(&e.to_string()),
            }
        }
    }
}

/// Human-readable status report lines for a snapshot.
#[must_use]
pub fn status_report(state: &RepositoryState) -> Vec<String> {
    if !state.is_repository {
        return vec!["Not a git repository".to_string()];
    }

    let branch = if state.is_detached() {
        "(detached HEAD)"
    } else {
        state.current_branch.as_str()
    };
    let mut lines = vec![
        format!("Branch:   {branch}"),
        format!(
            "Upstream: {}",
            state.upstream.as_deref().unwrap_or("(none)")
        ),
        format!(
            "Remote:   {}",
            state.remote_url.as_deref().unwrap_or("(none)")
        ),
        format!("State:    {}", state.sync_state()),
        format!("Ahead:    {}", state.ahead),
        format!("Behind:   {}", state.behind),
        format!("Stashes:  {}", state.stash_count),
    ];
    if state.changes.is_empty() {
        lines.push("Working tree clean".to_string());
    } else {
        lines.push(format!("Changes ({}):", state.changes.len()));
        lines.extend(state.changes.iter().map(|c| format!("  {c}")));
    }
    lines
}
