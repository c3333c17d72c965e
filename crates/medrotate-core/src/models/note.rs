//! Note model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{NoteId, RotationId};

/// A free-text clinical note belonging to exactly one rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier
    pub id: NoteId,
    /// Owning rotation
    pub rotation_id: RotationId,
    /// Title, may be empty
    pub title: String,
    /// Multi-line body, may be empty
    pub content: String,
    /// Creation or last-edit instant
    pub date: DateTime<Utc>,
    /// Whether the last write reached the remote (in intent)
    #[serde(default)]
    pub synced: bool,
}

impl Note {
    /// Create a new note in `rotation_id`, stamped with the current time
    #[must_use]
    pub fn new(
        rotation_id: RotationId,
        title: impl Into<String>,
        content: impl Into<String>,
        synced: bool,
    ) -> Self {
        Self {
            id: NoteId::generate(),
            rotation_id,
            title: title.into(),
            content: content.into(),
            date: Utc::now(),
            synced,
        }
    }

    /// Overwrite title and content and re-stamp the edit instant.
    ///
    /// The date never moves backwards, even if the wall clock does.
    pub fn revise(&mut self, title: impl Into<String>, content: impl Into<String>, synced: bool) {
        self.title = title.into();
        self.content = content.into();
        self.date = Utc::now().max(self.date);
        self.synced = synced;
    }

    /// Non-blank lines of the content, trimmed, in order
    #[must_use]
    pub fn paragraphs(&self) -> Vec<&str> {
        self.content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

/// Sort notes newest first by `date`
pub fn sort_newest_first(notes: &mut [Note]) {
    notes.sort_by_key(|note| std::cmp::Reverse(note.date));
}
