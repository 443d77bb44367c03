//! `reposync identity` and `reposync credentials` commands.

use anyhow::{Context, Result};
use reposync_core::identity::{self, IdentityKey};
use reposync_git::{ConfigScope, Repository};

use super::GlobalArgs;
use super::utils;
use crate::output;

const fn scope(global: bool) -> ConfigScope {
    if global {
        ConfigScope::Global
    } else {
        ConfigScope::Local
    }
}

/// Show the author identity, or set name and email.
pub fn run_identity(
    global: &GlobalArgs,
    name: Option<String>,
    email: Option<String>,
    global_scope: bool,
) -> Result<()> {
    let repo = utils::open_repo(global)?;
    let updates = [(IdentityKey::Name, name), (IdentityKey::Email, email)];
    apply(&repo, &updates, scope(global_scope))?;

    let current = identity::read_identity(&repo);
    for line in current.report().iter().take(2) {
        output::essential(line);
    }
    if !current.is_complete() {
        output::warn("Commits will fail until both name and email are set.");
    }
    Ok(())
}

/// Show the credential helper, or set it.
pub fn run_credentials(global: &GlobalArgs, helper: Option<String>, global_scope: bool) -> Result<()> {
    let repo = utils::open_repo(global)?;
    apply(
        &repo,
        &[(IdentityKey::CredentialHelper, helper)],
        scope(global_scope),
    )?;

    let current = identity::read_identity(&repo);
    for line in current.report().iter().skip(2) {
        output::essential(line);
    }
    Ok(())
}

fn apply(repo: &Repository, updates: &[(IdentityKey, Option<String>)], scope: ConfigScope) -> Result<()> {
    for (key, value) in updates {
        let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) else {
            continue;
        };
        identity::set_value(repo, *key, value, scope)
            .with_context(|| format!("Failed to set {}", key.config_key()))?;
        output::success(&format!("Set {} = {value}", key.config_key()));
    }
    Ok(())
}
