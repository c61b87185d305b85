//! Journal entry model

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier assigned by the document store when a journal is created
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JournalId(String);

impl JournalId {
    /// Wrap an identifier produced by a document store
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh time-sortable identifier (UUID v7)
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JournalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JournalId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for JournalId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Journal payload as stored in the document store.
///
/// Fields missing from a stored payload fall back to empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JournalRecord {
    pub owner_id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// A stored document: the store-assigned id plus its payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDocument {
    pub id: JournalId,
    pub record: JournalRecord,
}

/// A journal entry in the current user's set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    /// Store-assigned identifier
    pub id: JournalId,
    /// User who owns the entry
    pub owner_id: String,
    pub title: String,
    pub content: String,
    /// Tags in the order the user entered them (duplicates allowed)
    pub tags: Vec<String>,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Last update timestamp (RFC 3339), absent until the first update
    pub updated_at: Option<String>,
}

impl JournalEntry {
    /// Title for display, falling back to "Untitled"
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }

    /// Get first line of content as a preview, truncated to `max_len` characters
    #[must_use]
    pub fn content_preview(&self, max_len: usize) -> String {
        self.content
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(max_len)
            .collect()
    }
}

impl From<RemoteDocument> for JournalEntry {
    fn from(document: RemoteDocument) -> Self {
        let RemoteDocument { id, record } = document;
        Self {
            id,
            owner_id: record.owner_id,
            title: record.title,
            content: record.content,
            tags: record.tags,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Candidate journal for creation; missing fields become empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewJournal {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl NewJournal {
    /// Build the stored payload for `owner_id`, stamped with `created_at`
    #[must_use]
    pub fn into_record(self, owner_id: &str, created_at: String) -> JournalRecord {
        JournalRecord {
            owner_id: owner_id.to_string(),
            title: self.title.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            created_at,
            updated_at: None,
        }
    }
}

/// Partial journal update.
///
/// An empty `title` or `content` keeps the stored value, so neither field can
/// be cleared through an update. `tags`, when present, replaces the stored
/// sequence (an empty list clears it).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JournalPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl JournalPatch {
    /// Resolve the patch against the current entry into the full stored update
    #[must_use]
    pub fn resolve(self, current: &JournalEntry, updated_at: String) -> JournalUpdate {
        JournalUpdate {
            title: keep_unless_empty(self.title, &current.title),
            content: keep_unless_empty(self.content, &current.content),
            tags: self.tags.unwrap_or_else(|| current.tags.clone()),
            updated_at,
        }
    }
}

fn keep_unless_empty(candidate: Option<String>, current: &str) -> String {
    candidate
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| current.to_string())
}

/// Fields written by a point update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalUpdate {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub updated_at: String,
}

/// Parse comma-separated tag input, trimming pieces and dropping empties.
///
/// # Examples
///
/// ```
/// use logline_core::models::parse_tag_input;
///
/// assert_eq!(parse_tag_input(" travel, fun,, "), vec!["travel", "fun"]);
/// ```
#[must_use]
pub fn parse_tag_input(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}
