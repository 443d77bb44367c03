//! `reposync status` command - show repository state.

use anyhow::{Result, bail};
use colored::Colorize;
use reposync_core::session::status_report;
use reposync_core::{Inspector, RepositoryState};
use serde::Serialize;

use super::GlobalArgs;
use super::utils;
use crate::output;

/// Run the status command.
pub fn run(global: &GlobalArgs, json: bool, fetch: bool) -> Result<()> {
    let repo = utils::repository_at(global);
    let config = utils::load_config(&repo, global)?;
    let inspector = Inspector::new(&repo, &config.general.remote, config.fetch_timeout());

    let state = if fetch {
        output::with_spinner(
            &format!("Fetching from {}...", config.general.remote),
            || inspector.capture(),
        )
    } else {
        inspector.capture_local()
    };

    if json {
        let output = JsonOutput {
            sync_state: state.sync_state().to_string(),
            state: &state,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if !state.is_repository {
        bail!("Not inside a git repository: {}", global.path.display());
    }

    println!();
    println!("  {}", output::state_line(&state));
    output::hr();
    for line in status_report(&state) {
        output::essential(&format!("  {line}"));
    }
    if !state.is_dirty && state.ahead == 0 && state.behind == 0 {
        output::detail(&format!("  {}", "Nothing to sync.".dimmed()));
    }
    println!();
    Ok(())
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    sync_state: String,
    #[serde(flatten)]
    state: &'a RepositoryState,
}
