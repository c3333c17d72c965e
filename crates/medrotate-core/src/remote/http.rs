//! HTTP client for the remote collection API

use std::time::Duration;

use serde::Deserialize;

use super::{BestEffortTasks, RemoteSync};
use crate::connectivity::{Connectivity, ConnectivityProbe};
use crate::error::{Error, Result};
use crate::models::{CurrentUser, Note, NoteId, Rotation, RotationId, SyncEntry};

/// API root used when nothing is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

const REQUEST_TIMEOUT_SECS: u64 = 10;
const PROBE_TIMEOUT_SECS: u64 = 3;

#[derive(Debug, Deserialize)]
struct TestResponse {
    message: String,
}

/// Collection API client. Reads degrade to empty results; writes surface errors.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    base_url: String,
    client: reqwest::Client,
    tasks: BestEffortTasks,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            base_url,
            client,
            tasks: BestEffortTasks::default(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Check that the backend answers; returns its greeting
    pub async fn test_connection(&self) -> Result<String> {
        let response = self
            .client
            .get(self.url("test"))
            .send()
            .await?
            .error_for_status()?;
        let payload = response.json::<TestResponse>().await?;
        tracing::info!("Backend connection: {}", payload.message);
        Ok(payload.message)
    }

    /// All rotations known to the backend, or none if it cannot be reached
    pub async fn fetch_rotations(&self) -> Vec<Rotation> {
        match self.get_json(self.url("rotations")).await {
            Ok(rotations) => rotations,
            Err(error) => {
                tracing::error!("Failed to fetch rotations: {error}");
                Vec::new()
            }
        }
    }

    /// Notes of one rotation, or none if the backend cannot be reached
    pub async fn fetch_notes(&self, rotation_id: &RotationId) -> Vec<Note> {
        let url = format!(
            "{}?rotation_id={}",
            self.url("notes"),
            urlencoding::encode(rotation_id.as_str())
        );
        match self.get_json(url).await {
            Ok(notes) => notes,
            Err(error) => {
                tracing::error!("Failed to fetch notes: {error}");
                Vec::new()
            }
        }
    }

    pub async fn submit_rotation(&self, rotation: &Rotation) -> Result<Rotation> {
        let response = self
            .client
            .post(self.url("rotations"))
            .json(rotation)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn submit_note(&self, note: &Note) -> Result<Note> {
        let response = self
            .client
            .post(self.url("notes"))
            .json(note)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn replace_note(&self, note: &Note) -> Result<Note> {
        let path = format!("notes/{}", urlencoding::encode(note.id.as_str()));
        let response = self
            .client
            .put(self.url(&path))
            .json(note)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn remove_note(&self, id: &NoteId) -> Result<()> {
        let path = format!("notes/{}", urlencoding::encode(id.as_str()));
        self.client
            .delete(self.url(&path))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<Vec<T>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    async fn dispatch(&self, entry: SyncEntry) -> Result<()> {
        match entry {
            SyncEntry::CreateNote(note) => self.submit_note(&note).await.map(drop),
            SyncEntry::UpdateNote(note) => self.replace_note(&note).await.map(drop),
            SyncEntry::DeleteNote(deleted) => self.remove_note(&deleted.id).await,
            SyncEntry::CreateRotation(rotation) => {
                self.submit_rotation(&rotation).await.map(drop)
            }
        }
    }
}

impl RemoteSync for HttpRemote {
    fn sync_mutation(&self, entry: &SyncEntry) {
        let kind = entry.kind();
        tracing::info!(record_id = entry.record_id(), "Syncing {kind} operation");

        let remote = self.clone();
        let entry = entry.clone();
        self.tasks.spawn(kind.as_str(), async move {
            match remote.dispatch(entry).await {
                Ok(()) => tracing::info!("Sync completed for {kind} operation"),
                Err(error) => tracing::warn!("Sync failed for {kind} operation: {error}"),
            }
        });
    }

    fn initial_sync(&self, user: &CurrentUser) {
        tracing::info!("Starting initial sync from server for {}", user.email);

        let remote = self.clone();
        self.tasks.spawn("initial_sync", async move {
            let rotations = remote.fetch_rotations().await;
            tracing::info!(
                "Initial sync completed; server reports {} rotation(s)",
                rotations.len()
            );
        });
    }

    fn tasks(&self) -> &BestEffortTasks {
        &self.tasks
    }
}

/// Samples connectivity by calling the backend's test endpoint
#[derive(Debug, Clone)]
pub struct HttpProbe {
    remote: HttpRemote,
}

impl HttpProbe {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let mut remote = HttpRemote::new(base_url)?;
        remote.client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .build()?;
        Ok(Self { remote })
    }
}

impl ConnectivityProbe for HttpProbe {
    async fn sample(&self) -> Connectivity {
        match self.remote.test_connection().await {
            Ok(_) => Connectivity::Online,
            Err(error) => {
                tracing::warn!("Backend connection failed: {error}");
                Connectivity::Offline
            }
        }
    }
}

fn normalize_base_url(raw: String) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Config("API base URL must not be empty".to_string()));
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.trim_end_matches('/').to_string())
    } else {
        Err(Error::Config(
            "API base URL must include http:// or https://".to_string(),
        ))
    }
}
