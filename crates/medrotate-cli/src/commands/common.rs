use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use medrotate_core::config::{AppConfig, RemoteMode};
use medrotate_core::connectivity::{Connectivity, ConnectivityProbe};
use medrotate_core::remote::{HttpProbe, HttpRemote, RemoteSync, SimulatedRemote};
use medrotate_core::store::{LocalStore, SqliteStore};
use medrotate_core::{App, AppOptions, Note, Rotation};
use serde::Serialize;

use crate::cli::Cli;
use crate::error::CliError;

/// App wired to the on-disk store and the configured remote
pub type CliApp = App<SqliteStore, Box<dyn RemoteSync>>;

/// Longest the process waits for background sync notifications before exit
pub const SETTLE_GRACE: Duration = Duration::from_secs(2);

const SHORT_ID_LEN: usize = 13;

/// Per-invocation overrides from global flags
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    pub db_path: Option<PathBuf>,
    pub connectivity: Option<Connectivity>,
    pub rotation: Option<String>,
}

impl From<&Cli> for OpenOptions {
    fn from(cli: &Cli) -> Self {
        let connectivity = if cli.offline {
            Some(Connectivity::Offline)
        } else if cli.online {
            Some(Connectivity::Online)
        } else {
            None
        };
        Self {
            db_path: cli.db_path.clone(),
            connectivity,
            rotation: cli.rotation.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub rotation_id: String,
    pub title: String,
    pub content: String,
    pub date: String,
    pub relative_time: String,
    pub synced: bool,
}

#[derive(Debug, Serialize)]
pub struct RotationListItem {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub synced: bool,
    pub active: bool,
}

pub fn load_config() -> Result<AppConfig, CliError> {
    Ok(AppConfig::load()?)
}

/// Open the app using the user's config file and environment
pub async fn open_app(options: &OpenOptions) -> Result<CliApp, CliError> {
    open_app_with_config(load_config()?, options).await
}

pub async fn open_app_with_config(
    mut config: AppConfig,
    options: &OpenOptions,
) -> Result<CliApp, CliError> {
    if let Some(path) = &options.db_path {
        config.db_path = Some(path.clone());
    }
    let db_path = config.resolved_db_path()?;
    tracing::debug!("Opening local store at {}", db_path.display());
    let store = LocalStore::new(SqliteStore::open(&db_path)?);

    let remote: Box<dyn RemoteSync> = match config.remote {
        RemoteMode::Simulated => Box::new(SimulatedRemote::default()),
        RemoteMode::Http => Box::new(HttpRemote::new(config.api_base_url.clone())?),
    };
    let connectivity = match options.connectivity {
        Some(forced) => forced,
        None => startup_connectivity(&config).await?,
    };

    let mut app = App::open(
        store,
        remote,
        AppOptions {
            default_rotations: config.default_rotations,
            connectivity,
        },
    )?;

    if let Some(query) = &options.rotation {
        let id = resolve_rotation(app.rotations(), query)?.id.clone();
        app.set_active_rotation(&id)?;
    }

    Ok(app)
}

/// Connectivity to assume at startup when no flag forces one
pub async fn startup_connectivity(config: &AppConfig) -> Result<Connectivity, CliError> {
    if let Some(forced) = config.connectivity.forced() {
        return Ok(forced);
    }
    match config.remote {
        RemoteMode::Simulated => Ok(Connectivity::Online),
        RemoteMode::Http => Ok(HttpProbe::new(config.api_base_url.clone())?.sample().await),
    }
}

/// Probe used by `sync` to re-check connectivity
pub fn connectivity_probe(config: &AppConfig) -> Result<RecheckProbe, CliError> {
    if let Some(forced) = config.connectivity.forced() {
        return Ok(RecheckProbe::Fixed(forced));
    }
    match config.remote {
        RemoteMode::Simulated => Ok(RecheckProbe::Fixed(Connectivity::Online)),
        RemoteMode::Http => Ok(RecheckProbe::Http(HttpProbe::new(
            config.api_base_url.clone(),
        )?)),
    }
}

pub enum RecheckProbe {
    Fixed(Connectivity),
    Http(HttpProbe),
}

impl ConnectivityProbe for RecheckProbe {
    async fn sample(&self) -> Connectivity {
        match self {
            Self::Fixed(state) => *state,
            Self::Http(probe) => probe.sample().await,
        }
    }
}

/// Let in-flight remote notifications finish, within [`SETTLE_GRACE`]
pub async fn finish(app: &CliApp) {
    let abandoned = app.settle(SETTLE_GRACE).await;
    if abandoned > 0 {
        tracing::debug!("{abandoned} background task(s) still running at exit");
    }
}

/// Find a rotation by exact id, case-insensitive name, then unique id prefix
pub fn resolve_rotation<'a>(
    rotations: &'a [Rotation],
    query: &str,
) -> Result<&'a Rotation, CliError> {
    let query = query.trim();
    if let Some(rotation) = rotations.iter().find(|r| r.id.as_str() == query) {
        return Ok(rotation);
    }
    if let Some(rotation) = rotations
        .iter()
        .find(|r| r.name.eq_ignore_ascii_case(query))
    {
        return Ok(rotation);
    }

    let matches = rotations
        .iter()
        .filter(|r| !query.is_empty() && r.id.as_str().starts_with(query))
        .collect::<Vec<_>>();
    match matches.as_slice() {
        [] => Err(CliError::RotationNotFound(query.to_string())),
        [rotation] => Ok(rotation),
        many => Err(ambiguous(query, many.iter().map(|r| r.id.as_str()))),
    }
}

/// Find a note by exact id or unique id prefix
pub fn resolve_note<'a>(notes: &'a [Note], query: &str) -> Result<&'a Note, CliError> {
    let query = normalize_identifier(query)?;
    if let Some(note) = notes.iter().find(|n| n.id.as_str() == query) {
        return Ok(note);
    }

    let matches = notes
        .iter()
        .filter(|n| n.id.as_str().starts_with(&query))
        .collect::<Vec<_>>();
    match matches.as_slice() {
        [] => Err(CliError::NoteNotFound(query)),
        [note] => Ok(note),
        many => Err(ambiguous(&query, many.iter().map(|n| n.id.as_str()))),
    }
}

fn ambiguous<'a>(query: &str, ids: impl Iterator<Item = &'a str>) -> CliError {
    let options = ids.take(3).map(short_id).collect::<Vec<_>>().join(", ");
    CliError::AmbiguousId(format!(
        "ID prefix '{query}' is ambiguous; matches: {options}"
    ))
}

pub fn normalize_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyNoteId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

/// Long-form date, e.g. "March 4, 2025"
pub fn format_note_date(date: DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

pub fn format_relative_time(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - date).num_minutes().max(0);
    let hour = 60;
    let day = 24 * hour;
    let week = 7 * day;

    if diff < 1 {
        "just now".to_string()
    } else if diff < hour {
        format!("{diff}m ago")
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else {
        format_note_date(date)
    }
}

pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let source = if note.title.trim().is_empty() {
        note.paragraphs().join(" ")
    } else {
        note.title.trim().to_string()
    };
    let collapsed = source.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_note_lines(notes: &[Note]) -> Vec<String> {
    let now = Utc::now();
    notes
        .iter()
        .map(|note| {
            let short = short_id(note.id.as_str());
            let preview = note_preview(note, 40);
            let relative_time = format_relative_time(note.date, now);
            let marker = sync_marker(note.synced);
            format!("{short:<13}  {preview:<40}  {relative_time:<16}  {marker}")
        })
        .collect()
}

pub fn format_rotation_lines(rotations: &[Rotation], active: Option<&Rotation>) -> Vec<String> {
    rotations
        .iter()
        .map(|rotation| {
            let current = if active.is_some_and(|a| a.id == rotation.id) {
                "*"
            } else {
                " "
            };
            let short = short_id(rotation.id.as_str());
            format!(
                "{current} {short:<13}  {:<36}  {:<14}  {}",
                rotation.name,
                rotation.icon,
                sync_marker(rotation.synced)
            )
        })
        .collect()
}

pub const fn sync_marker(synced: bool) -> &'static str {
    if synced {
        "synced"
    } else {
        "pending"
    }
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    NoteListItem {
        id: note.id.to_string(),
        rotation_id: note.rotation_id.to_string(),
        title: note.title.clone(),
        content: note.content.clone(),
        date: note.date.to_rfc3339(),
        relative_time: format_relative_time(note.date, Utc::now()),
        synced: note.synced,
    }
}

pub fn rotation_to_list_item(rotation: &Rotation, active: Option<&Rotation>) -> RotationListItem {
    RotationListItem {
        id: rotation.id.to_string(),
        name: rotation.name.clone(),
        icon: rotation.icon.clone(),
        synced: rotation.synced,
        active: active.is_some_and(|a| a.id == rotation.id),
    }
}

/// Content from the flag, else piped stdin, else empty
pub fn resolve_note_content(content: Option<String>) -> Result<String, CliError> {
    if let Some(content) = content {
        return Ok(content);
    }
    Ok(read_piped_stdin()?.unwrap_or_default())
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    let trimmed = buffer.trim_end_matches(['\r', '\n']);
    Ok(Some(trimmed.to_string()))
}

/// Ask a yes/no question on stderr; anything but "y"/"yes" declines
pub fn confirm(prompt: &str) -> Result<bool, CliError> {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt} [y/N] ")?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_affirmative(&answer))
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
