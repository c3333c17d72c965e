use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] medrotate_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Rotation name cannot be empty")]
    EmptyRotationName,
    #[error("Email cannot be empty")]
    EmptyEmail,
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("Nothing to change; pass --title and/or --content")]
    NothingToEdit,
    #[error("Rotation not found: {0}")]
    RotationNotFound(String),
    #[error("Note not found for id/prefix: {0}")]
    NoteNotFound(String),
    #[error("{0}")]
    AmbiguousId(String),
}
