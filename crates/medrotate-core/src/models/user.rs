//! Signed-in user stub

use serde::{Deserialize, Serialize};

/// The single signed-in user. There is no credential check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub email: String,
    /// Persisted as `name` for compatibility with stored sessions
    #[serde(rename = "name")]
    pub display_name: String,
}

impl CurrentUser {
    /// Build a user from an email, naming it after the local part
    #[must_use]
    pub fn from_email(email: &str) -> Self {
        let email = email.trim();
        let display_name = email.split('@').next().unwrap_or(email).to_string();
        Self {
            email: email.to_string(),
            display_name,
        }
    }
}
