use medrotate_core::Connectivity;

use crate::commands::common::{connectivity_probe, finish, load_config, open_app, OpenOptions};
use crate::error::CliError;

/// Start as offline so the queue is only replayed by the re-check below
pub async fn run_sync(options: &OpenOptions) -> Result<(), CliError> {
    let config = load_config()?;
    let startup = OpenOptions {
        connectivity: Some(Connectivity::Offline),
        ..options.clone()
    };
    let mut app = open_app(&startup).await?;

    let update = match options.connectivity {
        Some(forced) => app.set_connectivity(forced)?,
        None => app.recheck_connectivity(&connectivity_probe(&config)?).await?,
    };

    match update.drained {
        Some(report) => println!(
            "Synced {} queued change(s); marked {} rotation(s) and {} note(s) synced",
            report.dispatched, report.rotations_marked, report.notes_marked
        ),
        None if app.connectivity().is_offline() => println!(
            "Offline; {} change(s) will sync when you reconnect",
            app.sync_queue().len()
        ),
        None => println!("Nothing to sync"),
    }

    finish(&app).await;
    Ok(())
}
