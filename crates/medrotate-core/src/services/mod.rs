//! Application services

mod app;

pub use app::{App, AppOptions, ConnectivityUpdate};
