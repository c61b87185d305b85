use std::path::PathBuf;

use logline_core::config::LoglineConfig;

use crate::cli::ConfigCommands;
use crate::commands::common::CliContext;
use crate::error::CliError;

pub fn run_config(command: Option<ConfigCommands>, context: &CliContext) -> Result<(), CliError> {
    let config_path = context.paths.config_file();

    match command.unwrap_or(ConfigCommands::Show) {
        ConfigCommands::Show => {
            let config = LoglineConfig::load_from_path(&config_path)?;
            println!("Config file: {}", config_path.display());
            println!("Database (active): {}", context.db_path.display());
            for line in describe_config(&config) {
                println!("{line}");
            }
        }
        ConfigCommands::SetDbPath { path } => {
            let config = update_config(context, |config| {
                let trimmed = path.trim();
                config.db_path = (!trimmed.is_empty()).then(|| PathBuf::from(trimmed));
            })?;
            match &config.db_path {
                Some(path) => println!("Database path set to {}", path.display()),
                None => println!("Database path reset to the default"),
            }
        }
        ConfigCommands::SetPollInterval { ms } => {
            update_config(context, |config| config.poll_interval_ms = Some(ms))?;
            println!("Poll interval set to {ms}ms");
        }
    }

    Ok(())
}

/// Load the config file, apply `change`, and save it back
pub fn update_config(
    context: &CliContext,
    change: impl FnOnce(&mut LoglineConfig),
) -> Result<LoglineConfig, CliError> {
    let config_path = context.paths.config_file();
    let mut config = LoglineConfig::load_from_path(&config_path)?;
    change(&mut config);
    config.save_to_path(&config_path)?;
    tracing::debug!("Saved config to {}", config_path.display());
    Ok(config)
}

pub fn describe_config(config: &LoglineConfig) -> Vec<String> {
    let db_path = config
        .db_path
        .as_ref()
        .map_or_else(|| "(default)".to_string(), |path| path.display().to_string());
    vec![
        format!("db_path: {db_path}"),
        format!("poll_interval_ms: {}", config.poll_interval().as_millis()),
    ]
}
