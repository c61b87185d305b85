use logline_core::ThemeName;

use crate::cli::ThemeCommands;
use crate::commands::common::CliContext;
use crate::error::CliError;
use crate::local_state::{load_settings, save_settings};

pub fn run_theme(command: Option<ThemeCommands>, context: &CliContext) -> Result<(), CliError> {
    let settings_path = context.paths.settings_file();
    let mut settings = load_settings(&settings_path)?;

    match command.unwrap_or(ThemeCommands::Show) {
        ThemeCommands::List => {
            for theme in ThemeName::ALL {
                let marker = if theme == settings.theme { "*" } else { " " };
                println!("{marker} {theme}");
            }
        }
        ThemeCommands::Show => println!("{}", settings.theme),
        ThemeCommands::Set { name } => {
            settings.theme = name.parse::<ThemeName>()?;
            save_settings(&settings_path, &settings)?;
            tracing::debug!("Saved settings to {}", settings_path.display());
            println!("Theme set to {}", settings.theme);
        }
    }

    Ok(())
}
