//! CLI command definitions and handlers.

pub mod completions;
pub mod diff;
pub mod identity;
pub mod ignore;
pub mod log;
pub mod menu;
pub mod operation;
pub mod status;
pub mod utils;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

/// reposync - keep a working copy and its remote in step without losing work.
#[derive(Parser)]
#[command(name = "reposync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Suppress informational output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Run as if started in this directory.
    #[arg(short = 'C', long = "path", global = true, value_name = "DIR", default_value = ".")]
    pub path: PathBuf,

    /// Remote to fetch from and push to (overrides the config file).
    #[arg(long, global = true, value_name = "NAME")]
    pub remote: Option<String>,

    /// Seconds to wait for the status fetch (overrides the config file).
    #[arg(long, global = true, value_name = "SECS")]
    pub fetch_timeout: Option<u64>,

    /// Answer yes to confirmations after showing what will happen.
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive menu (default).
    Menu,

    /// Show branch, upstream and working tree state.
    #[command(alias = "st")]
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,

        /// Skip contacting the remote.
        #[arg(long)]
        no_fetch: bool,
    },

    /// Commit everything and push. Uses a generated message unless -m is given.
    Push {
        /// Commit message.
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Commit everything with a message (generated if omitted) and push.
    Commit {
        /// Commit message.
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Pull, shelving local edits around the merge.
    Pull,

    /// Pull, then commit and push.
    Sync,

    /// Commit everything and push, offering force-with-lease if rejected.
    Backup {
        /// Note appended to the backup message.
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Delete untracked files after a preview and confirmation.
    Clean,

    /// Show recent history.
    Log {
        /// Number of commits to show.
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Draw the commit graph.
        #[arg(long, conflicts_with = "detailed")]
        graph: bool,

        /// Show author, date and full message.
        #[arg(long)]
        detailed: bool,
    },

    /// Show uncommitted changes.
    Diff {
        /// Show staged changes instead.
        #[arg(long, conflicts_with = "stat")]
        staged: bool,

        /// Show a per-file summary.
        #[arg(long)]
        stat: bool,
    },

    /// Show or set the commit author.
    Identity {
        /// Author name.
        #[arg(long)]
        name: Option<String>,

        /// Author email.
        #[arg(long)]
        email: Option<String>,

        /// Write to the global git config instead of this repository's.
        #[arg(long)]
        global: bool,
    },

    /// Show or set the credential helper.
    Credentials {
        /// Helper name, e.g. cache or store.
        #[arg(long)]
        helper: Option<String>,

        /// Write to the global git config instead of this repository's.
        #[arg(long)]
        global: bool,
    },

    /// List or add .gitignore patterns.
    Ignore {
        /// Patterns to add.
        patterns: Vec<String>,

        /// List the current patterns.
        #[arg(long, conflicts_with = "patterns")]
        list: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}
