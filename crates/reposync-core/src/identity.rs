//! Commit identity and credential helper settings.

use reposync_git::{ConfigScope, GitOps};

use crate::error::{Error, Result};

/// A git config value the operator can set from reposync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKey {
    Name,
    Email,
    CredentialHelper,
}

impl IdentityKey {
    /// Every key, in prompt order.
    pub const ALL: [Self; 3] = [Self::Name, Self::Email, Self::CredentialHelper];

    /// The git config key.
    #[must_use]
    pub const fn config_key(self) -> &'static str {
        match self {
            Self::Name => "user.name",
            Self::Email => "user.email",
            Self::CredentialHelper => "credential.helper",
        }
    }

    /// Prompt label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Author name",
            Self::Email => "Author email",
            Self::CredentialHelper => "Credential helper (e.g. cache, store)",
        }
    }
}

/// Effective identity settings; unset values are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Identity {
    pub name: Option<String>,
    pub email: Option<String>,
    pub credential_helper: Option<String>,
}

impl Identity {
    /// Report lines for display.
    #[must_use]
    pub fn report(&self) -> Vec<String> {
        let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "(not set)".to_string());
        vec![
            format!("Name:              {}", show(&self.name)),
            format!("Email:             {}", show(&self.email)),
            format!("Credential helper: {}", show(&self.credential_helper)),
        ]
    }

    /// Whether commits can be attributed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.name.is_some() && self.email.is_some()
    }
}

/// Read the effective identity. Unreadable values count as unset.
pub fn read_identity<G: GitOps + ?Sized>(repo: &G) -> Identity {
    let get = |key: IdentityKey| {
        repo.config_get(key.config_key())
            .ok()
            .filter(reposync_git::CommandOutput::success)
            .and_then(|out| out.first_line().map(String::from))
    };
    Identity {
        name: get(IdentityKey::Name),
        email: get(IdentityKey::Email),
        credential_helper: get(IdentityKey::CredentialHelper),
    }
}

/// Set one value in the given scope.
///
/// # Errors
/// Returns `CommandFailed` if git refuses the value, or a backend error.
pub fn set_value<G: GitOps + ?Sized>(
    repo: &G,
    key: IdentityKey,
    value: &str,
    scope: ConfigScope,
) -> Result<()> {
    let out = repo.config_set(key.config_key(), value, scope)?;
    if !out.success() {
        return Err(Error::CommandFailed {
            command: format!("git config {}", key.config_key()),
            reason: out.reason(),
        });
    }
    tracing::info!(key = key.config_key(), ?scope, "updated git config");
    Ok(())
}
