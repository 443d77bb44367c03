use anyhow::{Context, Result, bail};
use reposync_core::Config;
use reposync_git::{GitOps, Repository};

use super::GlobalArgs;

/// Wrap the target directory whether or not it is a repository.
pub fn repository_at(global: &GlobalArgs) -> Repository {
    Repository::at(&global.path)
}

/// Open the target repository, failing outside one.
pub fn open_repo(global: &GlobalArgs) -> Result<Repository> {
    let repo = repository_at(global);
    if !repo.is_repository() {
        bail!(
            "Not inside a git repository: {}",
            global.path.display()
        );
    }
    Ok(repo)
}

/// Load `.git/reposync.toml` and apply command-line overrides.
pub fn load_config(repo: &Repository, global: &GlobalArgs) -> Result<Config> {
    let mut config =
        Config::load_from_git_dir(repo.git_dir()).context("Failed to load reposync config")?;
    if let Some(remote) = &global.remote {
        config.general.remote.clone_from(remote);
    }
    if let Some(secs) = global.fetch_timeout {
        config.general.fetch_timeout_secs = secs;
    }
    Ok(config)
}
