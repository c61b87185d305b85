use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "logline")]
#[command(about = "Keep a personal journal from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local journal database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new journal entry
    #[command(alias = "new")]
    Add {
        /// Entry title
        #[arg(short, long, default_value = "")]
        title: String,
        /// Comma-separated tags
        #[arg(long, value_name = "TAGS")]
        tags: Option<String>,
        /// Entry content (read from stdin when omitted and piped)
        content: Vec<String>,
    },
    /// Edit an existing journal entry
    Edit {
        /// Entry ID or unique ID prefix
        id: String,
        /// New title (empty keeps the current one)
        #[arg(long)]
        title: Option<String>,
        /// New content (empty keeps the current one)
        #[arg(long)]
        content: Option<String>,
        /// Replacement comma-separated tags ("" clears them)
        #[arg(long, value_name = "TAGS")]
        tags: Option<String>,
    },
    /// Delete a journal entry
    Delete {
        /// Entry ID or unique ID prefix
        id: String,
    },
    /// List journal entries
    List {
        /// Only entries whose title or content contains this text
        #[arg(short, long)]
        search: Option<String>,
        /// Only entries carrying this tag
        #[arg(long)]
        tag: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every tag in use
    Tags,
    /// Print the journal list again whenever it changes
    Watch {
        /// Only entries whose title or content contains this text
        #[arg(short, long)]
        search: Option<String>,
        /// Only entries carrying this tag
        #[arg(long)]
        tag: Option<String>,
    },
    /// Export journals
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Show or change the color theme
    Theme {
        #[command(subcommand)]
        command: Option<ThemeCommands>,
    },
    /// Show or change the persisted client configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Sign in, sign out, or show the current user
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl From<ExportFormat> for logline_core::export::ExportFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Json => Self::Json,
            ExportFormat::Markdown => Self::Markdown,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ThemeCommands {
    /// List available themes
    List,
    /// Show the selected theme
    Show,
    /// Select a theme
    Set {
        /// Theme name (dark, light, journaling)
        name: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the config file location and its values
    Show,
    /// Store the journal database path ("" resets to the default)
    SetDbPath {
        /// Database file path
        path: String,
    },
    /// Store how often `watch` polls for outside changes
    SetPollInterval {
        /// Interval in milliseconds
        ms: u64,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in as a local user
    Login {
        /// User identifier that owns the journals
        #[arg(long, value_name = "ID")]
        user_id: String,
        /// Optional email shown in status and exports
        #[arg(long, value_name = "EMAIL")]
        email: Option<String>,
    },
    /// Show who is signed in
    Status,
    /// Sign out
    Logout,
}
