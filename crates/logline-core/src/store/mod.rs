//! Journal store: the signed-in user's live journal set plus derived filters.
//!
//! The journal set is only ever written by the live subscription. Mutations
//! go straight to the document store and become visible once the
//! subscription echoes them back; nothing is applied optimistically.
//!
//! ```text
//!   SessionProvider ──current user──▶ JournalStore ──create/update/delete──▶ DocumentStore
//!                                        ▲                                       │
//!                                        └──── snapshot task ◀── live query ─────┘
//! ```

mod binding;
mod filter;
mod subscription;

pub use binding::SessionBinding;
pub use filter::{collect_tags, filter_journals, FilterState};
pub use subscription::JournalSubscription;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::models::{JournalEntry, JournalId, JournalPatch, NewJournal, RemoteDocument};
use crate::remote::DocumentStore;
use crate::session::SessionProvider;
use crate::util::timestamp_now;
use crate::{Error, Result};

/// Everything the presentation layer renders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JournalsState {
    /// Every journal of the signed-in user, in document-store order
    pub all: Vec<JournalEntry>,
    /// `all` narrowed by `filters`, same order
    pub filtered: Vec<JournalEntry>,
    pub filters: FilterState,
    /// Set once the current subscription delivered its first snapshot
    pub loaded: bool,
}

impl JournalsState {
    fn refresh_view(&mut self) {
        self.filtered = filter_journals(&self.all, &self.filters);
    }

    /// Unique non-empty tags across all journals
    #[must_use]
    pub fn all_tags(&self) -> Vec<String> {
        collect_tags(&self.all)
    }
}

/// State shared between the store and its subscription tasks
pub(crate) struct Shared {
    state: watch::Sender<JournalsState>,
    active_subscriptions: AtomicUsize,
}

impl Shared {
    fn new() -> Self {
        let (state, _) = watch::channel(JournalsState::default());
        Self {
            state,
            active_subscriptions: AtomicUsize::new(0),
        }
    }

    /// Replace the journal set with a snapshot unless the subscription that
    /// produced it was cancelled. Returns whether it was applied.
    fn apply_snapshot(
        &self,
        cancelled: &AtomicBool,
        owner_id: &str,
        documents: Vec<RemoteDocument>,
    ) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|state| {
            // Checked under the state lock so cancel() cannot interleave
            if cancelled.load(Ordering::SeqCst) {
                return false;
            }

            let total = documents.len();
            let journals = documents
                .into_iter()
                .map(JournalEntry::from)
                .filter(|journal| journal.owner_id == owner_id)
                .collect::<Vec<_>>();
            if journals.len() != total {
                tracing::warn!(
                    "Dropped {} journal(s) not owned by {} from snapshot",
                    total - journals.len(),
                    owner_id
                );
            }

            state.all = journals;
            state.loaded = true;
            state.refresh_view();
            applied = true;
            true
        });
        applied
    }

    fn cancel_subscription(&self, cancelled: &AtomicBool) {
        let mut newly_cancelled = false;
        self.state.send_if_modified(|_| {
            newly_cancelled = !cancelled.swap(true, Ordering::SeqCst);
            false
        });
        if newly_cancelled {
            self.active_subscriptions.fetch_sub(1, Ordering::SeqCst);
            tracing::debug!("Journal subscription cancelled");
        }
    }

    fn clear_journals(&self) {
        self.state.send_if_modified(|state| {
            let changed = !state.all.is_empty() || state.loaded;
            state.all.clear();
            state.loaded = false;
            state.refresh_view();
            changed
        });
    }

    fn update_filters(&self, update: impl FnOnce(&mut FilterState)) {
        self.state.send_if_modified(|state| {
            let before = state.filters.clone();
            update(&mut state.filters);
            if state.filters == before {
                return false;
            }
            state.refresh_view();
            true
        });
    }
}

/// Live mirror of the signed-in user's journals.
///
/// The session provider and document store are injected at construction.
pub struct JournalStore<S, R> {
    session: S,
    documents: R,
    shared: Arc<Shared>,
}

impl<S: SessionProvider, R: DocumentStore> JournalStore<S, R> {
    pub fn new(session: S, documents: R) -> Self {
        Self {
            session,
            documents,
            shared: Arc::new(Shared::new()),
        }
    }

    pub const fn session(&self) -> &S {
        &self.session
    }

    pub const fn document_store(&self) -> &R {
        &self.documents
    }

    /// Start mirroring the signed-in user's journals.
    ///
    /// Signed out, the journal set is cleared and an inactive handle is
    /// returned. Calling this again while a previous handle is still active
    /// starts a second, parallel subscription; cancel the old one first.
    pub fn fetch_journals(&self) -> Result<JournalSubscription> {
        let Some(owner_id) = self.session.current_user_id() else {
            tracing::debug!("No signed-in user; clearing journals");
            self.shared.clear_journals();
            return Ok(JournalSubscription::inactive());
        };
        self.subscribe_owner(owner_id)
    }

    fn subscribe_owner(&self, owner_id: String) -> Result<JournalSubscription> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|error| {
            Error::Runtime(format!("journal subscriptions need a tokio runtime: {error}"))
        })?;
        let mut live_query = self.documents.subscribe(&owner_id)?;

        let previous = self.shared.active_subscriptions.fetch_add(1, Ordering::SeqCst);
        if previous > 0 {
            tracing::warn!(
                "Starting a journal subscription while {} other(s) are still active",
                previous
            );
        }
        tracing::debug!("Subscribing to journals of {}", owner_id);

        let cancelled = Arc::new(AtomicBool::new(false));
        let shared = Arc::clone(&self.shared);
        let task_cancelled = Arc::clone(&cancelled);
        let task = runtime.spawn(async move {
            while let Some(documents) = live_query.recv().await {
                if !shared.apply_snapshot(&task_cancelled, &owner_id, documents) {
                    break;
                }
            }
            tracing::debug!("Journal live query for {} ended", owner_id);
        });

        Ok(JournalSubscription::active(
            cancelled,
            Arc::clone(&self.shared),
            task,
        ))
    }

    /// Create a journal owned by the signed-in user
    pub async fn create_journal(&self, journal: NewJournal) -> Result<()> {
        let owner_id = self.require_user_id()?;
        let record = journal.into_record(&owner_id, timestamp_now());
        let id = self.documents.create(record).await?;
        tracing::debug!("Created journal {}", id);
        Ok(())
    }

    /// Update one of the signed-in user's journals.
    ///
    /// Empty `title`/`content` values keep the stored text.
    pub async fn update_journal(&self, id: &JournalId, patch: JournalPatch) -> Result<()> {
        let owner_id = self.require_user_id()?;
        let current = self.owned_journal(id, &owner_id)?;
        let update = patch.resolve(&current, timestamp_now());
        self.documents.update(id, update).await?;
        tracing::debug!("Updated journal {}", id);
        Ok(())
    }

    /// Delete one of the signed-in user's journals
    pub async fn delete_journal(&self, id: &JournalId) -> Result<()> {
        let owner_id = self.require_user_id()?;
        self.owned_journal(id, &owner_id)?;
        self.documents.delete(id).await?;
        tracing::debug!("Deleted journal {}", id);
        Ok(())
    }

    fn require_user_id(&self) -> Result<String> {
        self.session
            .current_user_id()
            .ok_or(Error::Unauthenticated)
    }

    fn owned_journal(&self, id: &JournalId, owner_id: &str) -> Result<JournalEntry> {
        self.shared
            .state
            .borrow()
            .all
            .iter()
            .find(|journal| &journal.id == id && journal.owner_id == owner_id)
            .cloned()
            .ok_or(Error::Unauthorized)
    }

    /// Set the free-text search
    pub fn search_journals(&self, query: impl Into<String>) {
        let query = query.into();
        self.shared
            .update_filters(|filters| filters.search_query = query);
    }

    /// Select a tag; an empty tag removes the tag filter
    pub fn filter_by_tag(&self, tag: impl Into<String>) {
        let tag = Some(tag.into()).filter(|tag| !tag.is_empty());
        self.shared.update_filters(|filters| filters.selected_tag = tag);
    }

    /// Reset search text and tag selection
    pub fn clear_filters(&self) {
        self.shared
            .update_filters(|filters| *filters = FilterState::default());
    }

    /// Unique non-empty tags across all journals, recomputed on each call
    pub fn all_tags(&self) -> Vec<String> {
        self.shared.state.borrow().all_tags()
    }

    /// Filtered journals
    pub fn journals(&self) -> Vec<JournalEntry> {
        self.shared.state.borrow().filtered.clone()
    }

    /// Every journal, ignoring filters
    pub fn all_journals(&self) -> Vec<JournalEntry> {
        self.shared.state.borrow().all.clone()
    }

    pub fn journal(&self, id: &JournalId) -> Option<JournalEntry> {
        self.shared
            .state
            .borrow()
            .all
            .iter()
            .find(|journal| &journal.id == id)
            .cloned()
    }

    pub fn search_query(&self) -> String {
        self.shared.state.borrow().filters.search_query.clone()
    }

    pub fn selected_tag(&self) -> Option<String> {
        self.shared.state.borrow().filters.selected_tag.clone()
    }

    /// Copy of the full current state
    pub fn snapshot(&self) -> JournalsState {
        self.shared.state.borrow().clone()
    }

    /// Observe every change to journals or filters
    pub fn watch(&self) -> watch::Receiver<JournalsState> {
        self.shared.state.subscribe()
    }

    /// Tear down: clear journals and filters
    pub fn reset(&self) {
        self.shared.clear_journals();
        self.clear_filters();
    }
}

#[cfg(test)]
mod tests;
