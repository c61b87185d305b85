//! Cancellation handle for a live journal subscription.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;

use super::Shared;

/// Handle to a live subscription started by
/// [`JournalStore::fetch_journals`](super::JournalStore::fetch_journals).
///
/// Once [`cancel`](Self::cancel) returns, the subscription never touches the
/// journal set again, even for snapshots already in flight. Cancelling twice
/// is a no-op. Dropping the handle cancels it.
pub struct JournalSubscription {
    cancelled: Arc<AtomicBool>,
    shared: Option<Arc<Shared>>,
    task: Option<JoinHandle<()>>,
}

impl JournalSubscription {
    pub(super) fn active(
        cancelled: Arc<AtomicBool>,
        shared: Arc<Shared>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            cancelled,
            shared: Some(shared),
            task: Some(task),
        }
    }

    /// Handle returned when nobody is signed in
    pub(super) fn inactive() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(true)),
            shared: None,
            task: None,
        }
    }

    /// Stop the subscription
    pub fn cancel(&self) {
        if let Some(shared) = &self.shared {
            shared.cancel_subscription(&self.cancelled);
        }
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    /// Whether snapshots are still being applied
    pub fn is_active(&self) -> bool {
        !self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for JournalSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for JournalSubscription {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("JournalSubscription")
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}
