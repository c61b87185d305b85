//! libSQL-backed document store with in-process live queries.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use libsql::{params, Connection, Value};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use super::{DocumentStore, LiveQuery};
use crate::db::Database;
use crate::models::{JournalId, JournalRecord, JournalUpdate, RemoteDocument};
use crate::{Error, Result};

const SELECT_OWNER_DOCUMENTS: &str = "SELECT id, owner_id, title, content, tags, created_at, updated_at
     FROM journals
     WHERE owner_id = ?1
     ORDER BY created_at DESC, id DESC";

struct LiveQuerySender {
    owner_id: String,
    sender: mpsc::UnboundedSender<Vec<RemoteDocument>>,
}

/// Document store over a local libSQL database.
///
/// Writes push fresh snapshots to every live query of the affected owner
/// while the database lock is still held, so subscribers observe states in
/// commit order.
#[derive(Clone)]
pub struct LocalDocumentStore {
    db: Arc<Mutex<Database>>,
    db_path: Option<PathBuf>,
    live_queries: Arc<std::sync::Mutex<Vec<LiveQuerySender>>>,
}

impl LocalDocumentStore {
    /// Open a document store at the given filesystem path.
    pub async fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&db_path).await?;
        Ok(Self::with_database(db, Some(db_path)))
    }

    /// Open an in-memory document store (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Ok(Self::with_database(db, None))
    }

    fn with_database(db: Database, db_path: Option<PathBuf>) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            db_path,
            live_queries: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    /// Filesystem location, when not in-memory
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Number of live queries whose receivers are still open
    pub fn live_query_count(&self) -> usize {
        let mut live_queries = self
            .live_queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        live_queries.retain(|query| !query.sender.is_closed());
        live_queries.len()
    }

    /// Watch for commits made through other connections (other processes or
    /// devices sharing the file) and re-push snapshots when one lands.
    pub fn spawn_change_poller(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut last_version: Option<i64> = None;
            loop {
                ticker.tick().await;
                let db = store.db.lock().await;
                match db.data_version().await {
                    Ok(version) => {
                        if last_version.is_some_and(|last| last != version) {
                            tracing::debug!("External change detected (data_version {version})");
                            store.publish_all(db.connection()).await;
                        }
                        last_version = Some(version);
                    }
                    Err(error) => tracing::warn!("Failed to read data_version: {}", error),
                }
            }
        })
    }

    fn senders_for(&self, owner_id: &str) -> Vec<mpsc::UnboundedSender<Vec<RemoteDocument>>> {
        let mut live_queries = self
            .live_queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        live_queries.retain(|query| !query.sender.is_closed());
        live_queries
            .iter()
            .filter(|query| query.owner_id == owner_id)
            .map(|query| query.sender.clone())
            .collect()
    }

    fn subscribed_owners(&self) -> Vec<String> {
        let mut live_queries = self
            .live_queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        live_queries.retain(|query| !query.sender.is_closed());
        let mut owners = live_queries
            .iter()
            .map(|query| query.owner_id.clone())
            .collect::<Vec<_>>();
        owners.sort();
        owners.dedup();
        owners
    }

    /// Push the owner's current documents to its live queries.
    ///
    /// The write already committed, so a failed snapshot read is logged
    /// rather than reported to the writer.
    async fn publish(&self, conn: &Connection, owner_id: &str) {
        let senders = self.senders_for(owner_id);
        if senders.is_empty() {
            return;
        }

        match query_owner_documents(conn, owner_id).await {
            Ok(documents) => {
                for sender in senders {
                    let _ = sender.send(documents.clone());
                }
            }
            Err(error) => {
                tracing::warn!("Failed to load snapshot for owner {}: {}", owner_id, error);
            }
        }
    }

    async fn publish_all(&self, conn: &Connection) {
        for owner_id in self.subscribed_owners() {
            self.publish(conn, &owner_id).await;
        }
    }
}

impl DocumentStore for LocalDocumentStore {
    fn subscribe(&self, owner_id: &str) -> Result<LiveQuery> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|error| {
            Error::RemoteStore(format!("live queries require a tokio runtime: {error}"))
        })?;

        let (sender, receiver) = mpsc::unbounded_channel();
        self.live_queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LiveQuerySender {
                owner_id: owner_id.to_string(),
                sender: sender.clone(),
            });

        let db = Arc::clone(&self.db);
        let owner_id = owner_id.to_string();
        runtime.spawn(async move {
            let db = db.lock().await;
            match query_owner_documents(db.connection(), &owner_id).await {
                Ok(documents) => {
                    let _ = sender.send(documents);
                }
                Err(error) => {
                    tracing::warn!("Initial snapshot for owner {} failed: {}", owner_id, error);
                }
            }
        });

        Ok(receiver)
    }

    async fn create(&self, record: JournalRecord) -> Result<JournalId> {
        let id = JournalId::generate();
        let tags = serde_json::to_string(&record.tags)?;
        let updated_at = record.updated_at.clone().map_or(Value::Null, Value::Text);

        let db = self.db.lock().await;
        db.connection()
            .execute(
                "INSERT INTO journals (id, owner_id, title, content, tags, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id.as_str(),
                    record.owner_id.as_str(),
                    record.title.as_str(),
                    record.content.as_str(),
                    tags,
                    record.created_at.as_str(),
                    updated_at
                ],
            )
            .await?;

        tracing::debug!("Created journal document {}", id);
        self.publish(db.connection(), &record.owner_id).await;
        Ok(id)
    }

    async fn update(&self, id: &JournalId, update: JournalUpdate) -> Result<()> {
        let tags = serde_json::to_string(&update.tags)?;

        let db = self.db.lock().await;
        let owner_id = document_owner(db.connection(), id).await?;
        db.connection()
            .execute(
                "UPDATE journals SET title = ?1, content = ?2, tags = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![
                    update.title.as_str(),
                    update.content.as_str(),
                    tags,
                    update.updated_at.as_str(),
                    id.as_str()
                ],
            )
            .await?;

        tracing::debug!("Updated journal document {}", id);
        self.publish(db.connection(), &owner_id).await;
        Ok(())
    }

    async fn delete(&self, id: &JournalId) -> Result<()> {
        let db = self.db.lock().await;
        let owner_id = document_owner(db.connection(), id).await?;
        db.connection()
            .execute("DELETE FROM journals WHERE id = ?1", params![id.as_str()])
            .await?;

        tracing::debug!("Deleted journal document {}", id);
        self.publish(db.connection(), &owner_id).await;
        Ok(())
    }
}

async fn document_owner(conn: &Connection, id: &JournalId) -> Result<String> {
    let mut rows = conn
        .query(
            "SELECT owner_id FROM journals WHERE id = ?1",
            params![id.as_str()],
        )
        .await?;

    match rows.next().await? {
        Some(row) => Ok(row.get::<String>(0)?),
        None => Err(Error::RemoteStore(format!(
            "journal document not found: {id}"
        ))),
    }
}

async fn query_owner_documents(conn: &Connection, owner_id: &str) -> Result<Vec<RemoteDocument>> {
    let mut rows = conn
        .query(SELECT_OWNER_DOCUMENTS, params![owner_id])
        .await?;

    let mut documents = Vec::new();
    while let Some(row) = rows.next().await? {
        let tags: String = row.get(4)?;
        let updated_at = match row.get_value(6)? {
            Value::Text(value) => Some(value),
            _ => None,
        };

        documents.push(RemoteDocument {
            id: JournalId::new(row.get::<String>(0)?),
            record: JournalRecord {
                owner_id: row.get(1)?,
                title: row.get(2)?,
                content: row.get(3)?,
                tags: serde_json::from_str(&tags)?,
                created_at: row.get(5)?,
                updated_at,
            },
        });
    }

    Ok(documents)
}
