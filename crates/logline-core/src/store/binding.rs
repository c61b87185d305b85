//! Keep the journal subscription in step with the session.

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::{JournalStore, JournalSubscription};
use crate::remote::DocumentStore;
use crate::session::{SessionProvider, SessionState};
use crate::{Error, Result};

/// Background task started by [`JournalStore::follow_session`].
///
/// Stopping or dropping the binding also cancels its subscription.
pub struct SessionBinding {
    task: JoinHandle<()>,
}

impl SessionBinding {
    pub fn stop(&self) {
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SessionBinding {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl<S: SessionProvider, R: DocumentStore> JournalStore<S, R> {
    /// Subscribe on sign-in and clear on sign-out, for as long as the
    /// returned binding lives.
    ///
    /// Switching users clears the previous user's journals before the new
    /// subscription starts. `Loading` leaves the current state untouched.
    pub fn follow_session(self: &Arc<Self>) -> Result<SessionBinding> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|error| {
            Error::Runtime(format!("session binding needs a tokio runtime: {error}"))
        })?;

        let store = Arc::clone(self);
        let mut session = self.session.watch_state();
        let task = runtime.spawn(async move {
            let mut subscription: Option<JournalSubscription> = None;
            let mut subscribed_user: Option<String> = None;

            loop {
                let state = session.borrow_and_update().clone();
                match state {
                    SessionState::SignedIn(user) => {
                        if subscribed_user.as_deref() != Some(user.id.as_str()) {
                            if let Some(previous) = subscription.take() {
                                previous.cancel();
                            }
                            store.shared.clear_journals();
                            match store.subscribe_owner(user.id.clone()) {
                                Ok(handle) => {
                                    subscription = Some(handle);
                                    subscribed_user = Some(user.id);
                                }
                                Err(error) => {
                                    tracing::warn!(
                                        "Failed to subscribe to journals of {}: {}",
                                        user.id,
                                        error
                                    );
                                    subscribed_user = None;
                                }
                            }
                        }
                    }
                    SessionState::SignedOut => {
                        if let Some(previous) = subscription.take() {
                            previous.cancel();
                        }
                        subscribed_user = None;
                        store.shared.clear_journals();
                    }
                    SessionState::Loading => {}
                }

                if session.changed().await.is_err() {
                    break;
                }
            }
            tracing::debug!("Session provider closed; journal binding stopped");
        });

        Ok(SessionBinding { task })
    }
}
