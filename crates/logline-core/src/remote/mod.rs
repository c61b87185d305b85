//! Document store contract used by the journal store.
//!
//! A document store holds journal records keyed by a store-assigned id and
//! supports live queries: a subscriber receives the complete set of matching
//! documents every time any of them changes.

mod local;

pub use local::LocalDocumentStore;

use tokio::sync::mpsc;

use crate::models::{JournalId, JournalRecord, JournalUpdate, RemoteDocument};
use crate::Result;

/// Receiving side of a live query.
///
/// Every message is the full, current result set. Dropping the receiver ends
/// the query.
pub type LiveQuery = mpsc::UnboundedReceiver<Vec<RemoteDocument>>;

/// Storage operations for journal documents (async)
#[allow(async_fn_in_trait)]
pub trait DocumentStore: Send + Sync + 'static {
    /// Open a live query over every document owned by `owner_id`.
    ///
    /// Snapshots are delivered in the order the underlying changes happened.
    fn subscribe(&self, owner_id: &str) -> Result<LiveQuery>;

    /// Insert a record; the store assigns and returns its id
    async fn create(&self, record: JournalRecord) -> Result<JournalId>;

    /// Overwrite the mutable fields of an existing document
    async fn update(&self, id: &JournalId, update: JournalUpdate) -> Result<()>;

    /// Remove a document
    async fn delete(&self, id: &JournalId) -> Result<()>;
}
