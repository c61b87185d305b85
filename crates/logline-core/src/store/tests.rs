use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

use super::*;
use crate::models::{JournalRecord, JournalUpdate};
use crate::remote::{LiveQuery, LocalDocumentStore};
use crate::session::{SessionHandle, SessionUser};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Subscribe(String),
    Create(JournalRecord),
    Update(JournalId, JournalUpdate),
    Delete(JournalId),
}

#[derive(Default)]
struct FakeInner {
    live_queries: Vec<(String, mpsc::UnboundedSender<Vec<RemoteDocument>>)>,
    calls: Vec<Call>,
    fail_writes: bool,
}

/// Document store that records calls and lets tests push snapshots by hand
#[derive(Clone, Default)]
struct FakeDocumentStore {
    inner: Arc<Mutex<FakeInner>>,
}

impl FakeDocumentStore {
    fn push(&self, owner_id: &str, documents: Vec<RemoteDocument>) {
        let inner = self.inner.lock().unwrap();
        for (owner, sender) in &inner.live_queries {
            if owner == owner_id {
                let _ = sender.send(documents.clone());
            }
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    fn write_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, Call::Subscribe(_)))
            .collect()
    }

    fn fail_writes(&self) {
        self.inner.lock().unwrap().fail_writes = true;
    }

    fn record(&self, call: Call) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call);
        if inner.fail_writes {
            return Err(Error::RemoteStore("permission denied".to_string()));
        }
        Ok(())
    }
}

impl DocumentStore for FakeDocumentStore {
    fn subscribe(&self, owner_id: &str) -> Result<LiveQuery> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Subscribe(owner_id.to_string()));
        inner.live_queries.push((owner_id.to_string(), sender));
        Ok(receiver)
    }

    async fn create(&self, record: JournalRecord) -> Result<JournalId> {
        self.record(Call::Create(record))?;
        Ok(JournalId::new("created"))
    }

    async fn update(&self, id: &JournalId, update: JournalUpdate) -> Result<()> {
        self.record(Call::Update(id.clone(), update))
    }

    async fn delete(&self, id: &JournalId) -> Result<()> {
        self.record(Call::Delete(id.clone()))
    }
}

fn document(id: &str, owner_id: &str, title: &str, content: &str, tags: &[&str]) -> RemoteDocument {
    RemoteDocument {
        id: JournalId::new(id),
        record: JournalRecord {
            owner_id: owner_id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            tags: tags.iter().map(ToString::to_string).collect(),
            created_at: "2024-05-01T10:00:00.000Z".to_string(),
            updated_at: None,
        },
    }
}

fn scenario_documents() -> Vec<RemoteDocument> {
    vec![
        document("1", "alice", "Beach Day", "Sunny", &["travel", "fun"]),
        document("2", "alice", "Work Notes", "Meeting", &["work"]),
    ]
}

fn signed_in(user_id: &str) -> SessionHandle {
    SessionHandle::restored(Some(SessionUser::new(user_id)))
}

fn ids(journals: &[JournalEntry]) -> Vec<String> {
    journals
        .iter()
        .map(|journal| journal.id.to_string())
        .collect()
}

async fn wait_for<S: SessionProvider, R: DocumentStore>(
    store: &JournalStore<S, R>,
    condition: impl FnMut(&JournalsState) -> bool,
) {
    let mut rx = store.watch();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(condition))
        .await
        .expect("state condition should be reached")
        .expect("state channel should stay open");
}

async fn loaded_store(
    documents: Vec<RemoteDocument>,
) -> (
    JournalStore<SessionHandle, FakeDocumentStore>,
    FakeDocumentStore,
    JournalSubscription,
) {
    let remote = FakeDocumentStore::default();
    let store = JournalStore::new(signed_in("alice"), remote.clone());
    let subscription = store.fetch_journals().unwrap();
    remote.push("alice", documents);
    wait_for(&store, |state| state.loaded).await;
    (store, remote, subscription)
}

#[tokio::test(flavor = "multi_thread")]
async fn scenario_search_then_tag_filter() {
    let (store, _remote, _subscription) = loaded_store(scenario_documents()).await;

    store.search_journals("beach");
    assert_eq!(ids(&store.journals()), vec!["1"]);

    store.clear_filters();
    store.filter_by_tag("work");
    assert_eq!(ids(&store.journals()), vec!["2"]);

    let mut tags = store.all_tags();
    tags.sort();
    assert_eq!(tags, vec!["fun", "travel", "work"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn clearing_filters_restores_canonical_order() {
    let (store, _remote, _subscription) = loaded_store(scenario_documents()).await;

    store.search_journals("notes");
    store.filter_by_tag("work");
    assert_eq!(store.search_query(), "notes");
    assert_eq!(store.selected_tag().as_deref(), Some("work"));

    store.clear_filters();
    assert_eq!(store.search_query(), "");
    assert_eq!(store.selected_tag(), None);
    assert_eq!(store.journals(), store.all_journals());
    assert_eq!(ids(&store.journals()), vec!["1", "2"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_tag_selection_means_no_tag_filter() {
    let (store, _remote, _subscription) = loaded_store(scenario_documents()).await;

    store.filter_by_tag("");
    assert_eq!(store.selected_tag(), None);
    assert_eq!(store.journals().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn all_tags_deduplicates_across_entries() {
    let (store, _remote, _subscription) = loaded_store(vec![
        document("1", "alice", "a", "", &["work", "work", " "]),
        document("2", "alice", "b", "", &["work", "home"]),
    ])
    .await;

    assert_eq!(store.all_tags(), vec!["home", "work"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn snapshots_replace_the_set_and_refresh_the_view() {
    let (store, remote, _subscription) = loaded_store(scenario_documents()).await;
    store.search_journals("beach");
    assert_eq!(store.journals().len(), 1);

    remote.push(
        "alice",
        vec![document("3", "alice", "Beach again", "", &["travel"])],
    );
    wait_for(&store, |state| state.all.len() == 1 && state.all[0].id.as_str() == "3").await;

    assert_eq!(ids(&store.journals()), vec!["3"]);
    assert!(store.journal(&JournalId::new("1")).is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn snapshots_drop_foreign_entries() {
    let (store, _remote, _subscription) = loaded_store(vec![
        document("1", "alice", "Mine", "", &[]),
        document("2", "bob", "Not mine", "", &[]),
    ])
    .await;

    assert_eq!(ids(&store.all_journals()), vec!["1"]);

    let error = store
        .delete_journal(&JournalId::new("2"))
        .await
        .unwrap_err();
    assert!(matches!(error, Error::Unauthorized));
}

#[tokio::test(flavor = "multi_thread")]
async fn create_while_signed_out_fails_without_remote_call() {
    let remote = FakeDocumentStore::default();
    let store = JournalStore::new(SessionHandle::restored(None), remote.clone());

    let error = store
        .create_journal(NewJournal {
            title: Some("Hello".to_string()),
            ..NewJournal::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(error, Error::Unauthenticated));
    assert!(remote.calls().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn create_stamps_owner_and_defaults_without_optimistic_update() {
    let (store, remote, _subscription) = loaded_store(Vec::new()).await;

    store
        .create_journal(NewJournal {
            title: Some("Beach Day".to_string()),
            content: None,
            tags: None,
        })
        .await
        .unwrap();

    let calls = remote.write_calls();
    let [Call::Create(record)] = calls.as_slice() else {
        panic!("expected a single create call, got {calls:?}");
    };
    assert_eq!(record.owner_id, "alice");
    assert_eq!(record.title, "Beach Day");
    assert_eq!(record.content, "");
    assert!(record.tags.is_empty());
    assert!(chrono::DateTime::parse_from_rfc3339(&record.created_at).is_ok());
    assert_eq!(record.updated_at, None);

    assert!(store.all_journals().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn update_with_empty_title_keeps_existing_title() {
    let (store, remote, _subscription) = loaded_store(vec![document(
        "1",
        "alice",
        "Trip",
        "Packed",
        &["travel"],
    )])
    .await;

    store
        .update_journal(
            &JournalId::new("1"),
            JournalPatch {
                title: Some(String::new()),
                content: Some("Unpacked".to_string()),
                tags: None,
            },
        )
        .await
        .unwrap();

    let calls = remote.write_calls();
    let [Call::Update(id, update)] = calls.as_slice() else {
        panic!("expected a single update call, got {calls:?}");
    };
    assert_eq!(id.as_str(), "1");
    assert_eq!(update.title, "Trip");
    assert_eq!(update.content, "Unpacked");
    assert_eq!(update.tags, vec!["travel"]);
    assert!(!update.updated_at.is_empty());

    // Nothing changes locally until the subscription echoes the write
    assert_eq!(store.all_journals()[0].content, "Packed");
}

#[tokio::test(flavor = "multi_thread")]
async fn update_unknown_id_is_unauthorized() {
    let (store, remote, _subscription) = loaded_store(scenario_documents()).await;

    let error = store
        .update_journal(&JournalId::new("nope"), JournalPatch::default())
        .await
        .unwrap_err();

    assert!(matches!(error, Error::Unauthorized));
    assert!(remote.write_calls().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_unknown_id_is_unauthorized_without_remote_call() {
    let (store, remote, _subscription) = loaded_store(scenario_documents()).await;

    let error = store
        .delete_journal(&JournalId::new("missing"))
        .await
        .unwrap_err();

    assert!(matches!(error, Error::Unauthorized));
    assert!(remote.write_calls().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_owned_journal_issues_point_delete() {
    let (store, remote, _subscription) = loaded_store(scenario_documents()).await;

    store.delete_journal(&JournalId::new("2")).await.unwrap();
    assert_eq!(
        remote.write_calls(),
        vec![Call::Delete(JournalId::new("2"))]
    );
    // Still present until the live query reports the removal
    assert_eq!(store.all_journals().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn signed_out_mutations_are_unauthenticated() {
    let session = signed_in("alice");
    let remote = FakeDocumentStore::default();
    let store = JournalStore::new(session.clone(), remote.clone());
    let _subscription = store.fetch_journals().unwrap();
    remote.push("alice", scenario_documents());
    wait_for(&store, |state| state.loaded).await;

    session.sign_out();
    let error = store
        .update_journal(
            &JournalId::new("1"),
            JournalPatch {
                title: Some("Renamed".to_string()),
                ..JournalPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(error, Error::Unauthenticated));

    let error = store
        .delete_journal(&JournalId::new("1"))
        .await
        .unwrap_err();
    assert!(matches!(error, Error::Unauthenticated));
    assert!(remote.write_calls().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn document_store_failures_propagate() {
    let (store, remote, _subscription) = loaded_store(scenario_documents()).await;
    remote.fail_writes();

    let error = store
        .create_journal(NewJournal::default())
        .await
        .unwrap_err();
    assert!(matches!(error, Error::RemoteStore(_)));

    let error = store
        .update_journal(
            &JournalId::new("1"),
            JournalPatch {
                content: Some("Cloudy".to_string()),
                ..JournalPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(error, Error::RemoteStore(message) if message == "permission denied"));

    let error = store
        .delete_journal(&JournalId::new("1"))
        .await
        .unwrap_err();
    assert!(matches!(error, Error::RemoteStore(_)));
    assert_eq!(remote.write_calls().len(), 3);
    assert_eq!(store.all_journals()[0].content, "Sunny");
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_while_signed_out_clears_and_returns_inactive_handle() {
    let session = signed_in("alice");
    let remote = FakeDocumentStore::default();
    let store = JournalStore::new(session.clone(), remote.clone());
    let subscription = store.fetch_journals().unwrap();
    remote.push("alice", scenario_documents());
    wait_for(&store, |state| state.loaded).await;
    subscription.cancel();

    session.sign_out();
    let handle = store.fetch_journals().unwrap();

    assert!(!handle.is_active());
    assert!(store.all_journals().is_empty());
    assert!(!store.snapshot().loaded);
    assert_eq!(remote.calls(), vec![Call::Subscribe("alice".to_string())]);
    handle.cancel();
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelled_subscription_ignores_late_snapshots() {
    let (store, remote, subscription) = loaded_store(scenario_documents()).await;

    subscription.cancel();
    subscription.cancel();
    assert!(!subscription.is_active());

    remote.push("alice", Vec::new());
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(ids(&store.all_journals()), vec!["1", "2"]);
}

#[test]
fn cancelled_flag_blocks_snapshot_application() {
    let shared = Shared::new();
    let cancelled = AtomicBool::new(false);
    shared.active_subscriptions.fetch_add(1, Ordering::SeqCst);

    assert!(shared.apply_snapshot(&cancelled, "alice", scenario_documents()));
    shared.cancel_subscription(&cancelled);
    shared.cancel_subscription(&cancelled);
    assert_eq!(shared.active_subscriptions.load(Ordering::SeqCst), 0);

    assert!(!shared.apply_snapshot(&cancelled, "alice", Vec::new()));
    assert_eq!(shared.state.borrow().all.len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn dropping_the_handle_cancels() {
    let (store, remote, subscription) = loaded_store(scenario_documents()).await;
    drop(subscription);

    remote.push("alice", Vec::new());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(store.all_journals().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn parallel_subscriptions_are_tolerated() {
    let (store, remote, _first) = loaded_store(scenario_documents()).await;
    let _second = store.fetch_journals().unwrap();

    assert_eq!(
        remote.calls(),
        vec![
            Call::Subscribe("alice".to_string()),
            Call::Subscribe("alice".to_string())
        ]
    );

    remote.push("alice", vec![document("9", "alice", "Both", "", &[])]);
    wait_for(&store, |state| ids(&state.all) == vec!["9"]).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn reset_clears_journals_and_filters() {
    let (store, _remote, _subscription) = loaded_store(scenario_documents()).await;
    store.search_journals("beach");

    store.reset();
    let state = store.snapshot();
    assert!(state.all.is_empty());
    assert!(state.filtered.is_empty());
    assert_eq!(state.filters, FilterState::default());
}

#[tokio::test(flavor = "multi_thread")]
async fn mutations_echo_through_local_document_store() {
    let documents = LocalDocumentStore::open_in_memory().await.unwrap();
    let store = JournalStore::new(signed_in("alice"), documents);
    let _subscription = store.fetch_journals().unwrap();
    wait_for(&store, |state| state.loaded).await;

    store
        .create_journal(NewJournal {
            title: Some("Trip".to_string()),
            content: Some("Packed bags".to_string()),
            tags: Some(vec!["travel".to_string()]),
        })
        .await
        .unwrap();
    wait_for(&store, |state| state.all.len() == 1).await;
    let created = store.all_journals().remove(0);
    assert_eq!(created.owner_id, "alice");
    assert_eq!(created.updated_at, None);

    store
        .update_journal(
            &created.id,
            JournalPatch {
                title: Some(String::new()),
                content: Some("Back home".to_string()),
                tags: Some(Vec::new()),
            },
        )
        .await
        .unwrap();
    wait_for(&store, |state| {
        state.all.first().is_some_and(|journal| journal.content == "Back home")
    })
    .await;
    let updated = store.journal(&created.id).unwrap();
    assert_eq!(updated.title, "Trip");
    assert!(updated.tags.is_empty());
    assert!(updated.updated_at.is_some());

    store.delete_journal(&created.id).await.unwrap();
    wait_for(&store, |state| state.all.is_empty()).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn follow_session_tracks_sign_in_and_out() {
    let documents = LocalDocumentStore::open_in_memory().await.unwrap();
    for (owner, title) in [("alice", "Alice's"), ("bob", "Bob's")] {
        documents
            .create(JournalRecord {
                owner_id: owner.to_string(),
                title: title.to_string(),
                created_at: "2024-05-01T10:00:00.000Z".to_string(),
                ..JournalRecord::default()
            })
            .await
            .unwrap();
    }

    let session = SessionHandle::new();
    let store = Arc::new(JournalStore::new(session.clone(), documents));
    let binding = store.follow_session().unwrap();
    assert!(binding.is_running());

    session.sign_in(SessionUser::new("alice"));
    wait_for(&store, |state| {
        state.loaded && state.all.iter().all(|journal| journal.title == "Alice's")
    })
    .await;
    assert_eq!(store.all_journals().len(), 1);

    session.sign_in(SessionUser::new("bob"));
    wait_for(&store, |state| {
        state.loaded && state.all.first().is_some_and(|journal| journal.title == "Bob's")
    })
    .await;
    assert!(store.all_journals().iter().all(|journal| journal.owner_id == "bob"));

    session.sign_out();
    wait_for(&store, |state| !state.loaded && state.all.is_empty()).await;

    binding.stop();
}
