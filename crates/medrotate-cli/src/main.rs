//! `medrotate` CLI - offline-first notes for clinical rotations
//!
//! Every invocation opens the local store, applies one operation, and gives
//! background sync notifications a short grace period before exiting.

mod cli;
mod commands;
mod error;

use clap::Parser;

use crate::cli::{Cli, Commands, NoteCommands, RemoteCommands, RotationCommands};
use crate::commands::account::{run_login, run_logout};
use crate::commands::common::OpenOptions;
use crate::commands::completions::run_completions;
use crate::commands::notes::{run_notes_add, run_notes_delete, run_notes_edit, run_notes_list};
use crate::commands::remote::{run_remote_notes, run_remote_rotations, run_remote_test};
use crate::commands::rotations::{run_rotations_add, run_rotations_list};
use crate::commands::status::run_status;
use crate::commands::sync::run_sync;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "medrotate=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = OpenOptions::from(&cli);

    match cli.command {
        Commands::Status { json } => run_status(json, &options).await?,
        Commands::Login { email } => run_login(&email, &options).await?,
        Commands::Logout => run_logout(&options).await?,
        Commands::Rotations { command } => match command {
            RotationCommands::List { json } => run_rotations_list(json, &options).await?,
            RotationCommands::Add { name, icon } => {
                run_rotations_add(&name, &icon, &options).await?;
            }
        },
        Commands::Notes { command } => match command {
            NoteCommands::List { json } => run_notes_list(json, &options).await?,
            NoteCommands::Add { title, content } => {
                run_notes_add(&title, content, &options).await?;
            }
            NoteCommands::Edit { id, title, content } => {
                run_notes_edit(&id, title.as_deref(), content.as_deref(), &options).await?;
            }
            NoteCommands::Delete { id, yes } => run_notes_delete(&id, yes, &options).await?,
        },
        Commands::Sync => run_sync(&options).await?,
        Commands::Remote { command } => match command {
            RemoteCommands::Test => run_remote_test().await?,
            RemoteCommands::Rotations { json } => run_remote_rotations(json).await?,
            RemoteCommands::Notes { rotation, json } => {
                run_remote_notes(&rotation, json).await?;
            }
        },
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}
