use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use medrotate_core::models::DEFAULT_ICON;

#[derive(Parser)]
#[command(name = "medrotate")]
#[command(about = "Offline-first notes for clinical rotations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the local store file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Treat the network as unavailable for this run
    #[arg(long, global = true, conflicts_with = "online")]
    pub offline: bool,

    /// Treat the network as available for this run
    #[arg(long, global = true)]
    pub online: bool,

    /// Rotation to work in: id, unique id prefix, or name
    #[arg(short, long, global = true, value_name = "ROTATION")]
    pub rotation: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show user, connectivity, active rotation and pending sync work
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sign in with an email address
    Login {
        /// Account email
        email: String,
    },
    /// Sign out the current user
    Logout,
    /// Manage rotations
    Rotations {
        #[command(subcommand)]
        command: RotationCommands,
    },
    /// Manage notes in the active rotation
    Notes {
        #[command(subcommand)]
        command: NoteCommands,
    },
    /// Re-check connectivity and replay queued changes when online
    Sync,
    /// Talk to the remote API directly
    Remote {
        #[command(subcommand)]
        command: RemoteCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum RotationCommands {
    /// List rotations
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a rotation and make it active
    #[command(alias = "new")]
    Add {
        /// Rotation name
        name: Vec<String>,
        /// Icon name
        #[arg(long, default_value = DEFAULT_ICON)]
        icon: String,
    },
}

#[derive(Subcommand)]
pub enum NoteCommands {
    /// List notes, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a note
    #[command(alias = "new")]
    Add {
        /// Note title
        #[arg(short, long, default_value = "")]
        title: String,
        /// Note content (read from stdin when omitted and piped)
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Replace a note's title and/or content
    Edit {
        /// Note ID or unique ID prefix
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New content
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Delete a note
    Delete {
        /// Note ID or unique ID prefix
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum RemoteCommands {
    /// Check that the backend answers
    Test,
    /// List rotations known to the backend
    Rotations {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the backend's notes for a rotation id
    Notes {
        /// Rotation id
        rotation: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
