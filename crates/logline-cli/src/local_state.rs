//! Files the CLI keeps between runs: the signed-in user and settings.

use std::path::Path;

use logline_core::{SessionUser, Settings};

use crate::error::CliError;

pub fn load_stored_user(path: &Path) -> Result<Option<SessionUser>, CliError> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path)?;
    let user = serde_json::from_str::<SessionUser>(&raw).map_err(|error| {
        CliError::Session(format!(
            "Failed to parse stored session at {}: {}",
            path.display(),
            error
        ))
    })?;
    if user.id.trim().is_empty() {
        tracing::warn!("Ignoring stored session with an empty user id");
        return Ok(None);
    }
    Ok(Some(user))
}

pub fn save_stored_user(path: &Path, user: &SessionUser) -> Result<(), CliError> {
    write_json(path, &serde_json::to_string_pretty(user)?)
}

/// Remove the stored session; returns whether one existed.
pub fn clear_stored_user(path: &Path) -> Result<bool, CliError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(error) => Err(CliError::Io(error)),
    }
}

/// Load settings; a missing file or unknown theme falls back to defaults.
pub fn load_settings(path: &Path) -> Result<Settings, CliError> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = std::fs::read_to_string(path)?;
    Ok(Settings::from_json(&raw)?)
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), CliError> {
    write_json(path, &serde_json::to_string_pretty(settings)?)
}

fn write_json(path: &Path, serialized: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serialized)?;
    Ok(())
}
