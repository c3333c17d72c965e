use crate::commands::common::{finish, open_app, OpenOptions};
use crate::error::CliError;

pub async fn run_login(email: &str, options: &OpenOptions) -> Result<(), CliError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(CliError::EmptyEmail);
    }

    let mut app = open_app(options).await?;
    let user = app.sign_in(email)?;
    println!("Signed in as {} <{}>", user.display_name, user.email);

    finish(&app).await;
    Ok(())
}

pub async fn run_logout(options: &OpenOptions) -> Result<(), CliError> {
    let mut app = open_app(options).await?;
    let was_signed_in = app.current_user().is_some();
    app.sign_out()?;

    if was_signed_in {
        println!("Signed out");
    } else {
        println!("Not signed in");
    }

    finish(&app).await;
    Ok(())
}
