//! Journal export helpers shared by every client.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::models::JournalEntry;

/// Export output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Markdown,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

/// Top-level JSON export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub export_date: String,
    pub user_email: Option<String>,
    pub journals: Vec<ExportJournal>,
}

/// A journal as it appears in an export; ids and owners are left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportJournal {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<&JournalEntry> for ExportJournal {
    fn from(journal: &JournalEntry) -> Self {
        Self {
            title: journal.title.clone(),
            content: journal.content.clone(),
            tags: journal.tags.clone(),
            created_at: journal.created_at.clone(),
            updated_at: journal.updated_at.clone(),
        }
    }
}

/// Build the export document for a user's journals
#[must_use]
pub fn export_document(
    journals: &[JournalEntry],
    user_email: Option<&str>,
    export_date: &str,
) -> ExportDocument {
    ExportDocument {
        export_date: export_date.to_string(),
        user_email: user_email.map(ToString::to_string),
        journals: journals.iter().map(ExportJournal::from).collect(),
    }
}

/// Render journals as pretty-printed JSON.
pub fn render_json_export(
    journals: &[JournalEntry],
    user_email: Option<&str>,
    export_date: &str,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&export_document(journals, user_email, export_date))
}

/// Render journals in Markdown with frontmatter blocks.
#[must_use]
pub fn render_markdown_export(journals: &[JournalEntry]) -> String {
    let mut output = String::new();

    for (index, journal) in journals.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }

        let _ = writeln!(output, "---");
        let _ = writeln!(output, "title: {}", quote_scalar(&journal.title));
        let _ = writeln!(output, "created_at: {}", journal.created_at);
        if let Some(updated_at) = &journal.updated_at {
            let _ = writeln!(output, "updated_at: {updated_at}");
        }
        let _ = writeln!(output, "tags:");
        for tag in &journal.tags {
            let _ = writeln!(output, "  - {}", quote_scalar(tag));
        }
        let _ = writeln!(output, "---");
        let _ = writeln!(output);
        output.push_str(&journal.content);
        output.push('\n');
    }

    output
}

/// Double-quoted frontmatter scalar; line breaks are escaped so free text
/// cannot close the block early.
fn quote_scalar(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}

/// Render journals in the selected format.
pub fn render_journals_export(
    journals: &[JournalEntry],
    format: ExportFormat,
    user_email: Option<&str>,
    export_date: &str,
) -> serde_json::Result<String> {
    match format {
        ExportFormat::Json => render_json_export(journals, user_email, export_date),
        ExportFormat::Markdown => Ok(render_markdown_export(journals)),
    }
}

/// Build a deterministic default file name for export flows.
#[must_use]
pub fn suggested_export_file_name(format: ExportFormat, timestamp_ms: i64) -> String {
    format!("logline-export-{timestamp_ms}.{}", format.extension())
}
