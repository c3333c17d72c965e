use serde::Serialize;

use crate::commands::common::{finish, open_app, CliApp, OpenOptions};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub user: Option<String>,
    pub connectivity: String,
    pub offline_indicator: bool,
    pub active_rotation: Option<String>,
    pub notes: usize,
    pub pending_sync: usize,
}

pub fn status_report(app: &CliApp) -> StatusReport {
    StatusReport {
        user: app.current_user().map(|user| user.email.clone()),
        connectivity: app.connectivity().to_string(),
        offline_indicator: app.offline_indicator_visible(),
        active_rotation: app.active_rotation().map(|rotation| rotation.name.clone()),
        notes: app.notes().len(),
        pending_sync: app.sync_queue().len(),
    }
}

pub fn format_status_lines(report: &StatusReport) -> Vec<String> {
    let mut lines = vec![
        format!("User:          {}", report.user.as_deref().unwrap_or("not signed in")),
        format!("Connectivity:  {}", report.connectivity),
        format!(
            "Rotation:      {}",
            report.active_rotation.as_deref().unwrap_or("none")
        ),
        format!("Notes:         {}", report.notes),
        format!("Pending sync:  {}", report.pending_sync),
    ];
    if report.offline_indicator {
        lines.push("You are offline. Changes will sync when you reconnect.".to_string());
    }
    lines
}

pub async fn run_status(as_json: bool, options: &OpenOptions) -> Result<(), CliError> {
    let app = open_app(options).await?;
    let report = status_report(&app);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in format_status_lines(&report) {
            println!("{line}");
        }
    }

    finish(&app).await;
    Ok(())
}
