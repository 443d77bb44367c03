//! reposync CLI - interactive repository synchronization.

use clap::Parser;
use reposync_core::OperationKind;

mod commands;
mod logging;
mod output;
mod terminal;

use commands::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    output::set_quiet(cli.quiet);
    logging::init(cli.verbose);

    let global = &cli.global;
    let result = match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => commands::menu::run(global),
        Commands::Status { json, no_fetch } => commands::status::run(global, json, !no_fetch),
        Commands::Push { message } => {
            let kind = if message.is_some() {
                OperationKind::CustomPush
            } else {
                OperationKind::AutoPush
            };
            commands::operation::run(global, kind, message)
        }
        Commands::Commit { message } => {
            commands::operation::run(global, OperationKind::QuickCommit, message)
        }
        Commands::Pull => commands::operation::run(global, OperationKind::AutoPull, None),
        Commands::Sync => commands::operation::run(global, OperationKind::FullSync, None),
        Commands::Backup { message } => {
            commands::operation::run(global, OperationKind::EmergencyBackup, message)
        }
        Commands::Clean => commands::operation::run(global, OperationKind::Cleanup, None),
        Commands::Log {
            limit,
            graph,
            detailed,
        } => commands::log::run(global, limit, graph, detailed),
        Commands::Diff { staged, stat } => commands::diff::run(global, staged, stat),
        Commands::Identity {
            name,
            email,
            global: global_scope,
        } => commands::identity::run_identity(global, name, email, global_scope),
        Commands::Credentials {
            helper,
            global: global_scope,
        } => commands::identity::run_credentials(global, helper, global_scope),
        Commands::Ignore { patterns, list } => commands::ignore::run(global, &patterns, list),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
