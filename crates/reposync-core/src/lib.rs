//! # reposync-core
//!
//! Repository inspection, safe sync sequencing and the interactive session
//! loop for reposync. All git access goes through
//! [`GitOps`](reposync_git::GitOps), so everything here runs against a mock
//! in tests.

pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod identity;
pub mod ignore;
pub mod inspector;
pub mod operation;
pub mod session;
pub mod state;

#[cfg(test)]
mod test_mocks;

pub use config::Config;
pub use engine::SyncEngine;
pub use error::{Error, Result};
pub use gate::{Confirm, Preview};
pub use identity::{Identity, IdentityKey};
pub use inspector::Inspector;
pub use operation::{FailureReason, OperationKind, Outcome, SyncOperation};
pub use session::{MenuCommand, Session, Terminal};
pub use state::{RepositoryState, SyncState};
