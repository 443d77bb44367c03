//! `reposync log` command - show recent history.

use anyhow::{Result, bail};
use reposync_git::{GitOps, LogFormat};

use super::GlobalArgs;
use super::utils;
use crate::output;

/// Run the log command.
pub fn run(global: &GlobalArgs, limit: Option<usize>, graph: bool, detailed: bool) -> Result<()> {
    let repo = utils::open_repo(global)?;
    let config = utils::load_config(&repo, global)?;

    let format = if graph {
        LogFormat::Graph
    } else if detailed {
        LogFormat::Detailed
    } else {
        LogFormat::Oneline
    };
    let limit = limit.unwrap_or(config.history.log_limit);

    let out = repo.log(limit, format)?;
    if !out.success() {
        bail!("git log failed: {}", out.reason());
    }
    if out.is_empty() {
        output::info("No commits yet");
    }
    for line in &out.lines {
        output::essential(line);
    }
    Ok(())
}
