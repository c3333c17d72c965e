pub mod account;
pub mod common;
pub mod completions;
pub mod notes;
pub mod remote;
pub mod rotations;
pub mod status;
pub mod sync;
