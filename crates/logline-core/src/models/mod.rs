//! Data models for Logline

mod journal;
mod settings;

pub use journal::{
    parse_tag_input, JournalEntry, JournalId, JournalPatch, JournalRecord, JournalUpdate,
    NewJournal, RemoteDocument,
};
pub use settings::{Settings, ThemeName};
