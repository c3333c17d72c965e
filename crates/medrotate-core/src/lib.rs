//! medrotate-core - Core library for the `medrotate` notes app
//!
//! Models, the local key-value store, connectivity tracking, the offline sync
//! queue and the application controller shared by every interface.

pub mod config;
pub mod connectivity;
pub mod error;
pub mod models;
pub mod remote;
pub mod services;
pub mod store;
pub mod sync;

pub use config::AppConfig;
pub use connectivity::{Connectivity, ConnectivityMonitor, Transition};
pub use error::{Error, Result};
pub use models::{CurrentUser, Note, NoteId, Rotation, RotationId, SyncEntry};
pub use services::{App, AppOptions};
pub use store::{LocalStore, SqliteStore};
