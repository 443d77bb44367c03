//! `reposync ignore` command - list or add `.gitignore` patterns.

use anyhow::{Context, Result};
use reposync_core::ignore;
use reposync_git::GitOps;

use super::GlobalArgs;
use super::utils;
use crate::output;

/// Add `patterns`, or list the current ones when none are given.
pub fn run(global: &GlobalArgs, patterns: &[String], list: bool) -> Result<()> {
    let repo = utils::open_repo(global)?;
    let workdir = repo.workdir();

    if list || patterns.is_empty() {
        let current = ignore::list_patterns(workdir).context("Failed to read .gitignore")?;
        if current.is_empty() {
            output::info("No ignore patterns");
        }
        for pattern in &current {
            output::essential(pattern);
        }
        return Ok(());
    }

    let added = ignore::add_patterns(workdir, patterns).context("Failed to update .gitignore")?;
    if added.is_empty() {
        output::info("All patterns already present");
    } else {
        output::success(&format!("Added to .gitignore: {}", added.join(" ")));
    }
    Ok(())
}
