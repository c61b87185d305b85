use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] logline_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Not signed in. Run `logline auth login --user-id <ID>` first.")]
    NotSignedIn,
    #[error("No journal content or title provided")]
    EmptyEntry,
    #[error("Journal ID cannot be empty")]
    EmptyJournalId,
    #[error("User ID cannot be empty")]
    EmptyUserId,
    #[error("Journal not found for id/prefix: {0}")]
    JournalNotFound(String),
    #[error("{0}")]
    AmbiguousJournalId(String),
    #[error("Nothing to change; pass --title, --content, or --tags")]
    NothingToEdit,
    #[error("Session state error: {0}")]
    Session(String),
    #[error("Journal subscription ended unexpectedly")]
    SubscriptionClosed,
    #[error("Timed out waiting for journals to load")]
    SubscriptionTimeout,
}
