use medrotate_core::models::RotationId;
use medrotate_core::remote::HttpRemote;

use crate::commands::common::{
    format_note_lines, format_rotation_lines, load_config, note_to_list_item,
    rotation_to_list_item, NoteListItem, RotationListItem,
};
use crate::error::CliError;

fn http_remote() -> Result<HttpRemote, CliError> {
    let config = load_config()?;
    Ok(HttpRemote::new(config.api_base_url)?)
}

pub async fn run_remote_test() -> Result<(), CliError> {
    let remote = http_remote()?;
    let message = remote.test_connection().await?;
    println!("{}: {message}", remote.base_url());
    Ok(())
}

pub async fn run_remote_rotations(as_json: bool) -> Result<(), CliError> {
    let rotations = http_remote()?.fetch_rotations().await;

    if as_json {
        let items = rotations
            .iter()
            .map(|rotation| rotation_to_list_item(rotation, None))
            .collect::<Vec<RotationListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for line in format_rotation_lines(&rotations, None) {
            println!("{line}");
        }
    }
    Ok(())
}

pub async fn run_remote_notes(rotation: &str, as_json: bool) -> Result<(), CliError> {
    let rotation_id = RotationId::from(rotation.trim());
    let mut notes = http_remote()?.fetch_notes(&rotation_id).await;
    medrotate_core::models::sort_newest_first(&mut notes);

    if as_json {
        let items = notes
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for line in format_note_lines(&notes) {
            println!("{line}");
        }
    }
    Ok(())
}
