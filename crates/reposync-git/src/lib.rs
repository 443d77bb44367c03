//! # reposync-git
//!
//! Backend adapter for reposync. Runs git primitives against a working tree
//! and hands back raw [`CommandOutput`] values; deciding what an exit status
//! means is left to the caller.

mod error;
mod output;
mod repository;
mod traits;

pub use error::{Error, Result};
pub use output::CommandOutput;
pub use repository::Repository;
pub use traits::{ConfigScope, DiffView, GitOps, LogFormat, PushTarget};
