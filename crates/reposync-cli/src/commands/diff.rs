//! `reposync diff` command - show uncommitted changes.

use anyhow::{Result, bail};
use reposync_git::{DiffView, GitOps};

use super::GlobalArgs;
use super::utils;
use crate::output;

/// Run the diff command.
pub fn run(global: &GlobalArgs, staged: bool, stat: bool) -> Result<()> {
    let repo = utils::open_repo(global)?;

    let view = if staged {
        DiffView::Staged
    } else if stat {
        DiffView::Stat
    } else {
        DiffView::WorkingTree
    };

    let out = repo.diff(view)?;
    if !out.success() {
        bail!("git diff failed: {}", out.reason());
    }
    if out.is_empty() {
        output::info("No differences");
    }
    for line in &out.lines {
        output::essential(line);
    }
    Ok(())
}
