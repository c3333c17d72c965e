//! Data models

mod id;
mod note;
mod rotation;
mod sync_entry;
mod user;

pub use id::{NoteId, RotationId};
pub use note::{sort_newest_first, Note};
pub use rotation::{DefaultRotationSet, Rotation, DEFAULT_ICON};
pub use sync_entry::{DeletedNote, OperationKind, SyncEntry};
pub use user::CurrentUser;
