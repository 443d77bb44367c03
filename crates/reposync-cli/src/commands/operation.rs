//! One-shot sync operations: `push`, `commit`, `pull`, `sync`, `backup`, `clean`.

use anyhow::{Result, bail};
use reposync_core::{Inspector, OperationKind, SyncEngine, SyncOperation};

use super::GlobalArgs;
use super::utils;
use crate::output;
use crate::terminal::CliTerminal;

/// Capture fresh state, run one operation against it, report the outcome.
///
/// Anything other than success or nothing-to-do exits non-zero.
pub fn run(global: &GlobalArgs, kind: OperationKind, message: Option<String>) -> Result<()> {
    let repo = utils::open_repo(global)?;
    let config = utils::load_config(&repo, global)?;
    let terminal = CliTerminal::new(global.yes);

    let inspector = Inspector::new(&repo, &config.general.remote, config.fetch_timeout());
    let state = output::with_spinner(
        &format!("Fetching from {}...", config.general.remote),
        || inspector.capture(),
    );

    let op = SyncOperation::new(kind, state).with_message(message);
    let outcome = SyncEngine::new(&repo, &terminal, &config).execute(op);
    output::outcome(kind, &outcome);

    if !outcome.is_success() {
        bail!("{kind} did not complete");
    }
    Ok(())
}
