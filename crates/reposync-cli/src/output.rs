//! Terminal output formatting utilities.

use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use reposync_core::{OperationKind, Outcome, RepositoryState, SyncState};

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Set quiet mode globally. Call once at startup.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

/// Print a success message (suppressed in quiet mode).
pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "✓".green(), msg);
    }
}

/// Print an error message (always prints to stderr).
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a warning message (always prints to stderr).
pub fn warn(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print an info message (suppressed in quiet mode).
pub fn info(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "→".blue(), msg);
    }
}

/// Print a detail line without prefix (suppressed in quiet mode).
pub fn detail(msg: &str) {
    if !is_quiet() {
        println!("{msg}");
    }
}

/// Print essential output (always prints).
///
/// Use for reports the operator asked for and for anything shown before a
/// confirmation.
pub fn essential(msg: &str) {
    println!("{msg}");
}

/// Print a horizontal line (suppressed in quiet mode).
pub fn hr() {
    if !is_quiet() {
        println!("{}", "─".repeat(50).dimmed());
    }
}

/// Colored label for a sync state.
#[must_use]
pub fn state_indicator(state: SyncState) -> String {
    let label = state.to_string();
    match state {
        SyncState::Clean => format!("{} {label}", "●".green()),
        SyncState::Dirty | SyncState::AheadOnly => format!("{} {label}", "●".cyan()),
        SyncState::BehindOnly => format!("{} {label}", "●".yellow()),
        SyncState::Diverged => format!("{} {label}", "●".red()),
    }
}

/// One-line summary: branch, state and divergence arrows.
#[must_use]
pub fn state_line(state: &RepositoryState) -> String {
    if !state.is_repository {
        return format!("{} not a git repository", "○".dimmed());
    }
    let branch = if state.is_detached() {
        "(detached HEAD)".dimmed().to_string()
    } else {
        state.current_branch.cyan().bold().to_string()
    };
    let upstream = state
        .upstream
        .as_deref()
        .map_or_else(|| " (no upstream)".dimmed().to_string(), |u| format!(" ← {}", u.dimmed()));
    let mut line = format!("{branch}{upstream}  {}", state_indicator(state.sync_state()));
    if state.ahead > 0 {
        line.push_str(&format!(" {}↑", state.ahead));
    }
    if state.behind > 0 {
        line.push_str(&format!(" {}↓", state.behind).yellow().to_string());
    }
    if state.is_dirty {
        line.push_str(&format!("  {} changed", state.changes.len()));
    }
    line
}

/// Report an operation outcome. Remediation goes to stderr.
pub fn outcome(kind: OperationKind, outcome: &Outcome) {
    match outcome {
        Outcome::Success => success(&format!("{kind}: {outcome}")),
        Outcome::NoOpNothingToDo => info(&format!("{kind}: {outcome}")),
        Outcome::Conflict { .. } => warn(&format!("{kind}: {outcome}")),
        Outcome::Failed(_) => error(&format!("{kind}: {outcome}")),
    }
    if let Some(hint) = outcome.remediation() {
        eprintln!("  {hint}");
    }
}

/// Run `f` behind a spinner when stderr is a terminal.
pub fn with_spinner<T>(message: &str, f: impl FnOnce() -> T) -> T {
    if is_quiet() || !std::io::stderr().is_terminal() {
        return f();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    let result = f();
    pb.finish_and_clear();
    result
}
