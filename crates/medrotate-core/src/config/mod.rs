//! Application configuration
//!
//! Resolution order for every field: explicit override > environment >
//! config file > built-in default.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::connectivity::Connectivity;
use crate::error::{Error, Result};
use crate::models::DefaultRotationSet;
use crate::remote::DEFAULT_API_BASE_URL;

const CONFIG_FILE_NAME: &str = "config.json";
const APP_DIR_NAME: &str = "medrotate";
const STORE_FILE_NAME: &str = "medrotate.db";

pub const ENV_API_URL: &str = "MEDROTATE_API_URL";
pub const ENV_REMOTE: &str = "MEDROTATE_REMOTE";
pub const ENV_CONNECTIVITY: &str = "MEDROTATE_CONNECTIVITY";
pub const ENV_DEFAULT_ROTATIONS: &str = "MEDROTATE_DEFAULT_ROTATIONS";
pub const ENV_DB_PATH: &str = "MEDROTATE_DB_PATH";

/// Which remote collaborator receives mutations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteMode {
    /// Log-and-wait stand-in, no network
    #[default]
    Simulated,
    /// Real HTTP calls against `api_base_url`
    Http,
}

impl FromStr for RemoteMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simulated" => Ok(Self::Simulated),
            "http" => Ok(Self::Http),
            other => Err(format!("unknown remote mode '{other}'")),
        }
    }
}

/// How the startup connectivity state is sampled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityMode {
    /// Simulated remote counts as online; HTTP remote is probed
    #[default]
    Auto,
    Online,
    Offline,
}

impl ConnectivityMode {
    /// The forced state, if this mode forces one
    #[must_use]
    pub const fn forced(self) -> Option<Connectivity> {
        match self {
            Self::Auto => None,
            Self::Online => Some(Connectivity::Online),
            Self::Offline => Some(Connectivity::Offline),
        }
    }
}

impl FromStr for ConnectivityMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            other => Err(format!("unknown connectivity mode '{other}'")),
        }
    }
}

/// Persistent application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root of the remote collection API
    pub api_base_url: String,
    pub remote: RemoteMode,
    pub default_rotations: DefaultRotationSet,
    pub connectivity: ConnectivityMode,
    /// Local store file; platform data dir when unset
    pub db_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            remote: RemoteMode::default(),
            default_rotations: DefaultRotationSet::default(),
            connectivity: ConnectivityMode::default(),
            db_path: None,
        }
    }
}

impl AppConfig {
    /// Load from the default config path, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match default_config_path() {
            Some(path) => Self::load_from_path(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load a config file; a missing file yields defaults
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|error| {
            Error::Config(format!(
                "Failed to parse config at {}: {error}",
                path.display()
            ))
        })
    }

    /// Write the config as pretty JSON, creating parent directories
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = non_empty(lookup(ENV_API_URL)) {
            self.api_base_url = url;
        }
        if let Some(remote) = non_empty(lookup(ENV_REMOTE)) {
            self.remote = remote.parse().map_err(Error::Config)?;
        }
        if let Some(mode) = non_empty(lookup(ENV_CONNECTIVITY)) {
            self.connectivity = mode.parse().map_err(Error::Config)?;
        }
        if let Some(set) = non_empty(lookup(ENV_DEFAULT_ROTATIONS)) {
            self.default_rotations = set.parse().map_err(Error::Config)?;
        }
        if let Some(path) = non_empty(lookup(ENV_DB_PATH)) {
            self.db_path = Some(PathBuf::from(path));
        }
        Ok(())
    }

    /// Local store path, falling back to the platform data directory
    pub fn resolved_db_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(STORE_FILE_NAME))
            .ok_or_else(|| Error::Config("Failed to resolve data directory".to_string()))
    }
}

/// `<config dir>/medrotate/config.json`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn non_empty(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
