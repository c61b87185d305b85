use logline_core::SessionUser;

use crate::cli::AuthCommands;
use crate::commands::common::CliContext;
use crate::error::CliError;
use crate::local_state::{clear_stored_user, save_stored_user};

pub fn run_auth(command: AuthCommands, context: &CliContext) -> Result<(), CliError> {
    let session_path = context.paths.session_file();

    match command {
        AuthCommands::Login { user_id, email } => {
            let user = login_user(&user_id, email.as_deref())?;
            save_stored_user(&session_path, &user)?;
            println!("Signed in as {}", user.label());
            Ok(())
        }
        AuthCommands::Status => {
            if let Some(user) = context.stored_user()? {
                let email_label = user.email.as_deref().unwrap_or("(no email)");
                println!("Signed in as {} ({email_label})", user.id);
            } else {
                println!("Not signed in.");
            }
            Ok(())
        }
        AuthCommands::Logout => {
            if clear_stored_user(&session_path)? {
                println!("Signed out");
            } else {
                println!("Not signed in.");
            }
            Ok(())
        }
    }
}

/// Build the user to persist from `auth login` flags
pub fn login_user(user_id: &str, email: Option<&str>) -> Result<SessionUser, CliError> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(CliError::EmptyUserId);
    }

    let user = SessionUser::new(user_id);
    Ok(match email.map(str::trim).filter(|email| !email.is_empty()) {
        Some(email) => user.with_email(email),
        None => user,
    })
}
