//! logline-core - Core library for Logline
//!
//! This crate contains the journal models, the session and document-store
//! contracts, a local libSQL document store with live queries, and the
//! `JournalStore` that every Logline interface drives.

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod remote;
pub mod session;
pub mod store;
pub mod util;

pub use error::{Error, Result};
pub use models::{JournalEntry, JournalId, JournalPatch, NewJournal, Settings, ThemeName};
pub use remote::{DocumentStore, LocalDocumentStore};
pub use session::{SessionHandle, SessionProvider, SessionState, SessionUser};
pub use store::{JournalStore, JournalSubscription, JournalsState};
