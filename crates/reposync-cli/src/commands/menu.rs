//! `reposync menu` command - the interactive session.

use anyhow::Result;
use reposync_core::Session;
use reposync_git::GitOps;

use super::GlobalArgs;
use super::utils;
use crate::output;
use crate::terminal::CliTerminal;

/// Run the session until the operator quits or input ends.
pub fn run(global: &GlobalArgs) -> Result<()> {
    let repo = utils::repository_at(global);
    let config = utils::load_config(&repo, global)?;
    if !repo.is_repository() {
        output::warn("Not inside a git repository; operations will be refused.");
    }

    let terminal = CliTerminal::new(global.yes);
    let mut session = Session::new(&repo, &terminal, &config);
    session.run();

    output::info("Bye");
    Ok(())
}
