//! Journal list filtering helpers (search + tag filtering).

use std::collections::BTreeSet;

use crate::models::JournalEntry;

/// Active search text and tag selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search_query: String,
    /// Never holds an empty string; an empty selection is `None`
    pub selected_tag: Option<String>,
}

impl FilterState {
    /// Whether any filter narrows the list
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.search_query.trim().is_empty() || self.selected_tag.is_some()
    }
}

/// Return a sorted, deduplicated tag list discovered across journals.
///
/// Empty and whitespace-only tags are skipped.
#[must_use]
pub fn collect_tags(journals: &[JournalEntry]) -> Vec<String> {
    let mut tags = BTreeSet::new();
    for journal in journals {
        for tag in &journal.tags {
            if !tag.trim().is_empty() {
                tags.insert(tag.clone());
            }
        }
    }
    tags.into_iter().collect()
}

/// Filter journals by case-insensitive text query and optional exact tag.
///
/// Both filters must match; the input order is preserved.
#[must_use]
pub fn filter_journals(journals: &[JournalEntry], filters: &FilterState) -> Vec<JournalEntry> {
    let normalized_query = normalize_query(&filters.search_query);
    let tag_filter = filters
        .selected_tag
        .as_deref()
        .filter(|tag| !tag.is_empty());

    journals
        .iter()
        .filter(|journal| journal_matches_query(journal, &normalized_query))
        .filter(|journal| journal_matches_tag_filter(journal, tag_filter))
        .cloned()
        .collect()
}

fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn journal_matches_query(journal: &JournalEntry, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    journal.title.to_lowercase().contains(query) || journal.content.to_lowercase().contains(query)
}

fn journal_matches_tag_filter(journal: &JournalEntry, tag_filter: Option<&str>) -> bool {
    let Some(tag_filter) = tag_filter else {
        return true;
    };
    journal.tags.iter().any(|tag| tag == tag_filter)
}
