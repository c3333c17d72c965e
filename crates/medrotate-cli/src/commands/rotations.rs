use crate::commands::common::{
    finish, format_rotation_lines, open_app, rotation_to_list_item, CliApp, OpenOptions,
    RotationListItem,
};
use crate::error::CliError;

pub async fn run_rotations_list(as_json: bool, options: &OpenOptions) -> Result<(), CliError> {
    let app = open_app(options).await?;
    let active = app.active_rotation();

    if as_json {
        let items = app
            .rotations()
            .iter()
            .map(|rotation| rotation_to_list_item(rotation, active))
            .collect::<Vec<RotationListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for line in format_rotation_lines(app.rotations(), active) {
            println!("{line}");
        }
    }

    finish(&app).await;
    Ok(())
}

pub async fn run_rotations_add(
    name_parts: &[String],
    icon: &str,
    options: &OpenOptions,
) -> Result<(), CliError> {
    let mut app = open_app(options).await?;
    let id = add_rotation(&mut app, &name_parts.join(" "), icon)?;
    println!("{id}");

    finish(&app).await;
    Ok(())
}

/// Create a rotation from user input; returns the new id
pub fn add_rotation(app: &mut CliApp, name: &str, icon: &str) -> Result<String, CliError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::EmptyRotationName);
    }
    let rotation = app.create_rotation(name, icon.trim())?;
    Ok(rotation.id.to_string())
}
