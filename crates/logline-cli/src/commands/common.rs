use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use logline_core::config::{resolve_db_path, ConfigPaths, LoglineConfig};
use logline_core::{
    JournalEntry, JournalStore, JournalSubscription, LocalDocumentStore, SessionHandle,
    SessionUser,
};
use serde::Serialize;

use crate::error::CliError;
use crate::local_state::load_stored_user;

pub type CliJournalStore = JournalStore<SessionHandle, LocalDocumentStore>;

const LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolved locations and configuration for one CLI invocation
#[derive(Debug, Clone)]
pub struct CliContext {
    pub paths: ConfigPaths,
    pub config: LoglineConfig,
    pub db_path: PathBuf,
}

impl CliContext {
    pub fn resolve(db_path_flag: Option<PathBuf>) -> Result<Self, CliError> {
        let lookup = |key: &str| env::var(key).ok();
        let paths = ConfigPaths::resolve(lookup)?;
        let config = LoglineConfig::load_from_path(&paths.config_file())?;
        let db_path = resolve_db_path(db_path_flag, &config, lookup)?;
        tracing::debug!("Using journal database at {}", db_path.display());
        Ok(Self {
            paths,
            config,
            db_path,
        })
    }

    pub fn stored_user(&self) -> Result<Option<SessionUser>, CliError> {
        load_stored_user(&self.paths.session_file())
    }

    /// Open the journal store with the stored session restored
    pub async fn open_store(&self) -> Result<CliJournalStore, CliError> {
        let session = SessionHandle::restored(self.stored_user()?);
        let documents = LocalDocumentStore::open_path(&self.db_path).await?;
        Ok(JournalStore::new(session, documents))
    }

    /// Open the store and wait for the signed-in user's first snapshot
    pub async fn load_journals(
        &self,
    ) -> Result<(CliJournalStore, JournalSubscription), CliError> {
        let store = self.open_store().await?;
        if store.session().state().user().is_none() {
            return Err(CliError::NotSignedIn);
        }
        let subscription = store.fetch_journals()?;
        wait_until_loaded(&store).await?;
        Ok((store, subscription))
    }
}

pub async fn wait_until_loaded(store: &CliJournalStore) -> Result<(), CliError> {
    wait_for_state(store, |state| state.loaded).await
}

pub async fn wait_for_state(
    store: &CliJournalStore,
    condition: impl FnMut(&logline_core::JournalsState) -> bool,
) -> Result<(), CliError> {
    let mut rx = store.watch();
    let outcome = tokio::time::timeout(LOAD_TIMEOUT, rx.wait_for(condition))
        .await
        .map(|reached| reached.map(|_| ()));
    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(_)) => Err(CliError::SubscriptionClosed),
        Err(_) => Err(CliError::SubscriptionTimeout),
    }
}

#[derive(Debug, Serialize)]
pub struct JournalListItem {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub relative_time: String,
}

pub fn journal_to_list_item(journal: &JournalEntry) -> JournalListItem {
    let now_ms = Utc::now().timestamp_millis();
    JournalListItem {
        id: journal.id.to_string(),
        title: journal.title.clone(),
        preview: journal.content_preview(80),
        content: journal.content.clone(),
        tags: journal.tags.clone(),
        created_at: journal.created_at.clone(),
        updated_at: journal.updated_at.clone(),
        relative_time: relative_time_label(journal, now_ms),
    }
}

pub fn format_journal_lines(journals: &[JournalEntry]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    journals
        .iter()
        .map(|journal| {
            let id = journal.id.to_string();
            let short_id = id.chars().take(13).collect::<String>();
            let title = truncate_chars(journal.display_title(), 24);
            let preview = journal.content_preview(40);
            let relative_time = relative_time_label(journal, now_ms);
            let tags = render_tags(&journal.tags);

            if tags.is_empty() {
                format!("{short_id:<13}  {title:<24}  {preview:<40}  {relative_time}")
            } else {
                format!("{short_id:<13}  {title:<24}  {preview:<40}  {relative_time:<10}  {tags}")
            }
        })
        .collect()
}

pub fn render_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let mut truncated = value
            .chars()
            .take(max_chars.saturating_sub(3))
            .collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

fn relative_time_label(journal: &JournalEntry, now_ms: i64) -> String {
    let stamp = journal
        .updated_at
        .as_deref()
        .unwrap_or(&journal.created_at);
    parse_timestamp_millis(stamp).map_or_else(
        || stamp.to_string(),
        |timestamp_ms| format_relative_time(timestamp_ms, now_ms),
    )
}

pub fn parse_timestamp_millis(stamp: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(stamp)
        .ok()
        .map(|date_time| date_time.timestamp_millis())
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

/// Find a journal by full id or unique id prefix
pub fn resolve_journal(query: &str, journals: &[JournalEntry]) -> Result<JournalEntry, CliError> {
    if let Some(journal) = journals.iter().find(|journal| journal.id.as_str() == query) {
        return Ok(journal.clone());
    }

    let matches = journals
        .iter()
        .filter(|journal| journal.id.as_str().starts_with(query))
        .collect::<Vec<_>>();

    match matches.as_slice() {
        [] => Err(CliError::JournalNotFound(query.to_string())),
        [journal] => Ok((*journal).clone()),
        _ => {
            let options = matches
                .iter()
                .take(3)
                .map(|journal| journal.id.as_str().chars().take(13).collect::<String>())
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousJournalId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn resolve_entry_content(content_parts: &[String]) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(content);
    }

    Ok(read_piped_stdin()?.unwrap_or_default())
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_journal_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyJournalId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}
