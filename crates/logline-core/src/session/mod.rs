//! Session contract consumed by the journal store.
//!
//! The store only needs to know who is signed in right now and when that
//! changes. How users actually authenticate is up to the provider.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// The signed-in actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Opaque user id; journals are owned by this value
    pub id: String,
    /// Optional email, used as the actor's label in exports
    #[serde(default)]
    pub email: Option<String>,
}

impl SessionUser {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Email when known, otherwise the id
    #[must_use]
    pub fn label(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.id)
    }
}

/// Authentication state as seen by the app
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Session restore has not finished yet
    #[default]
    Loading,
    SignedOut,
    SignedIn(SessionUser),
}

impl SessionState {
    #[must_use]
    pub const fn user(&self) -> Option<&SessionUser> {
        match self {
            Self::SignedIn(user) => Some(user),
            Self::Loading | Self::SignedOut => None,
        }
    }
}

/// Source of the current actor's identity
pub trait SessionProvider: Send + Sync + 'static {
    /// Currently signed-in user, if any
    fn current_user(&self) -> Option<SessionUser>;

    /// Receiver that observes every session transition
    fn watch_state(&self) -> watch::Receiver<SessionState>;

    /// Id of the currently signed-in user, if any
    fn current_user_id(&self) -> Option<String> {
        self.current_user().map(|user| user.id)
    }
}

/// In-process session provider backed by a watch channel.
///
/// Cloning the handle shares the same session.
#[derive(Clone)]
pub struct SessionHandle {
    state: Arc<watch::Sender<SessionState>>,
}

impl SessionHandle {
    /// Create a handle in the `Loading` state
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        Self {
            state: Arc::new(state),
        }
    }

    /// Create a handle from a previously persisted user (or signed out)
    #[must_use]
    pub fn restored(user: Option<SessionUser>) -> Self {
        let handle = Self::new();
        match user {
            Some(user) => handle.sign_in(user),
            None => handle.sign_out(),
        }
        handle
    }

    pub fn sign_in(&self, user: SessionUser) {
        tracing::info!("Session signed in as {}", user.id);
        self.state.send_replace(SessionState::SignedIn(user));
    }

    pub fn sign_out(&self) {
        let previous = self.state.send_replace(SessionState::SignedOut);
        if let SessionState::SignedIn(user) = previous {
            tracing::info!("Session signed out ({})", user.id);
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider for SessionHandle {
    fn current_user(&self) -> Option<SessionUser> {
        self.state.borrow().user().cloned()
    }

    fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}
