//! Error types for logline-core

use thiserror::Error;

/// Result type alias using logline-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in logline-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// A mutation was attempted while nobody is signed in
    #[error("You must be signed in to change journals")]
    Unauthenticated,

    /// The target journal is not in the current user's set.
    ///
    /// Missing and foreign-owned journals are reported identically.
    #[error("You can only change your own journals")]
    Unauthorized,

    /// The document store rejected or failed an operation
    #[error("Document store error: {0}")]
    RemoteStore(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Background work needs an async runtime that is not available
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl From<libsql::Error> for Error {
    fn from(error: libsql::Error) -> Self {
        Self::RemoteStore(error.to_string())
    }
}
