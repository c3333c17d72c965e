//! Pending mutation recorded while offline

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Note, NoteId, Rotation};

/// Payload of a delete: only the id survives the local removal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedNote {
    pub id: NoteId,
}

/// One entry of the sync queue.
///
/// Persisted as `{"type": "<kind>", "data": <payload>}`. The short kinds
/// `create`, `update` and `delete` written by older clients are accepted on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SyncEntry {
    #[serde(alias = "create")]
    CreateNote(Note),
    #[serde(alias = "update")]
    UpdateNote(Note),
    #[serde(alias = "delete")]
    DeleteNote(DeletedNote),
    CreateRotation(Rotation),
}

/// Kind of mutation carried by a [`SyncEntry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    CreateNote,
    UpdateNote,
    DeleteNote,
    CreateRotation,
}

impl OperationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateNote => "create_note",
            Self::UpdateNote => "update_note",
            Self::DeleteNote => "delete_note",
            Self::CreateRotation => "create_rotation",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SyncEntry {
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::CreateNote(_) => OperationKind::CreateNote,
            Self::UpdateNote(_) => OperationKind::UpdateNote,
            Self::DeleteNote(_) => OperationKind::DeleteNote,
            Self::CreateRotation(_) => OperationKind::CreateRotation,
        }
    }

    /// Id of the affected record
    #[must_use]
    pub fn record_id(&self) -> &str {
        match self {
            Self::CreateNote(note) | Self::UpdateNote(note) => note.id.as_str(),
            Self::DeleteNote(deleted) => deleted.id.as_str(),
            Self::CreateRotation(rotation) => rotation.id.as_str(),
        }
    }

    #[must_use]
    pub fn delete_note(id: NoteId) -> Self {
        Self::DeleteNote(DeletedNote { id })
    }
}
