use medrotate_core::models::NoteId;

use crate::commands::common::{
    confirm, finish, format_note_lines, note_to_list_item, open_app, resolve_note,
    resolve_note_content, short_id, CliApp, NoteListItem, OpenOptions,
};
use crate::error::CliError;

pub async fn run_notes_list(as_json: bool, options: &OpenOptions) -> Result<(), CliError> {
    let app = open_app(options).await?;
    let notes = app.notes_newest_first();

    if as_json {
        let items = notes
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if notes.is_empty() {
        if let Some(rotation) = app.active_rotation() {
            println!("No notes in {} yet.", rotation.name);
        }
    } else {
        for line in format_note_lines(&notes) {
            println!("{line}");
        }
    }

    finish(&app).await;
    Ok(())
}

pub async fn run_notes_add(
    title: &str,
    content: Option<String>,
    options: &OpenOptions,
) -> Result<(), CliError> {
    let content = resolve_note_content(content)?;
    let mut app = open_app(options).await?;
    let note = app.create_note(title, &content)?;
    println!("{}", note.id);

    finish(&app).await;
    Ok(())
}

pub async fn run_notes_edit(
    id: &str,
    title: Option<&str>,
    content: Option<&str>,
    options: &OpenOptions,
) -> Result<(), CliError> {
    let mut app = open_app(options).await?;
    let id = edit_note(&mut app, id, title, content)?;
    println!("{id}");

    finish(&app).await;
    Ok(())
}

/// Apply an edit; unspecified fields keep their current value
pub fn edit_note(
    app: &mut CliApp,
    query: &str,
    title: Option<&str>,
    content: Option<&str>,
) -> Result<NoteId, CliError> {
    if title.is_none() && content.is_none() {
        return Err(CliError::NothingToEdit);
    }

    let note = resolve_note(app.notes(), query)?.clone();
    let title = title.unwrap_or(note.title.as_str());
    let content = content.unwrap_or(note.content.as_str());

    if title == note.title && content == note.content {
        return Ok(note.id);
    }

    app.update_note(&note.id, title, content)?
        .map(|updated| updated.id)
        .ok_or_else(|| CliError::NoteNotFound(query.to_string()))
}

pub async fn run_notes_delete(id: &str, yes: bool, options: &OpenOptions) -> Result<(), CliError> {
    let mut app = open_app(options).await?;
    let note = resolve_note(app.notes(), id)?.clone();

    let prompt = format!(
        "Delete note {} \"{}\"?",
        short_id(note.id.as_str()),
        note.title
    );
    if !yes && !confirm(&prompt)? {
        println!("Cancelled");
        finish(&app).await;
        return Ok(());
    }

    if app.delete_note(&note.id)? {
        println!("{}", note.id);
    }

    finish(&app).await;
    Ok(())
}
