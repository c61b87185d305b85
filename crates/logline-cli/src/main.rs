//! Logline CLI - Keep a personal journal from the terminal
//!
//! Drives the journal store against a local database file.

mod cli;
mod commands;
mod error;
mod local_state;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::auth_cmd::run_auth;
use crate::commands::common::CliContext;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::export::run_export;
use crate::commands::list::run_list;
use crate::commands::tags::run_tags;
use crate::commands::theme::run_theme;
use crate::commands::watch::run_watch;
use crate::error::CliError;

const DEFAULT_LOG_DIRECTIVE: &str = "logline=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help().map_err(CliError::Io)?;
        println!();
        return Ok(());
    };

    if let Commands::Completions { shell, output } = &command {
        return run_completions(*shell, output.as_deref());
    }

    let context = CliContext::resolve(cli.db_path)?;

    match command {
        Commands::Add {
            title,
            tags,
            content,
        } => run_add(&title, tags.as_deref(), &content, &context).await?,
        Commands::Edit {
            id,
            title,
            content,
            tags,
        } => run_edit(&id, title, content, tags.as_deref(), &context).await?,
        Commands::Delete { id } => run_delete(&id, &context).await?,
        Commands::List { search, tag, json } => {
            run_list(search.as_deref(), tag.as_deref(), json, &context).await?;
        }
        Commands::Tags => run_tags(&context).await?,
        Commands::Watch { search, tag } => {
            run_watch(search.as_deref(), tag.as_deref(), &context).await?;
        }
        Commands::Export { format, output } => {
            run_export(format, output.as_deref(), &context).await?;
        }
        Commands::Theme { command } => run_theme(command, &context)?,
        Commands::Config { command } => run_config(command, &context)?,
        Commands::Auth { command } => run_auth(command, &context)?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
