//! Auth collaborator: sign-in flows and session-change subscriptions.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    pub anonymous: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("anonymous sign-in is disabled")]
    AnonymousDisabled,
    #[error("auth provider unavailable: {0}")]
    Unavailable(String),
}

/// Called with the current session (or `None`) on subscribe and on every change.
pub type SessionListener = Arc<dyn Fn(Option<&Session>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_credentials(&self, credentials: &Credentials) -> Result<Session, AuthError>;

    async fn sign_in_anonymous(&self) -> Result<Session, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    fn current_session(&self) -> Option<Session>;

    /// Registers `listener` and invokes it immediately with the current session.
    fn subscribe(&self, listener: SessionListener) -> SubscriptionId;

    /// Returns false when `id` was not subscribed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

#[derive(Default)]
struct AuthState {
    session: Option<Session>,
    listeners: BTreeMap<SubscriptionId, SessionListener>,
    next_id: u64,
}

struct Account {
    user_id: String,
    password: String,
}

/// In-process provider with a fixed set of registered accounts.
pub struct LocalAuthProvider {
    accounts: HashMap<String, Account>,
    allow_anonymous: bool,
    state: Mutex<AuthState>,
}

impl Default for LocalAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalAuthProvider {
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            allow_anonymous: true,
            state: Mutex::new(AuthState::default()),
        }
    }

    /// Registers an email/password account signing in as `user_id`.
    pub fn with_account(mut self, email: &str, password: &str, user_id: &str) -> Self {
        self.accounts.insert(
            normalize_email(email),
            Account {
                user_id: user_id.to_string(),
                password: password.to_string(),
            },
        );
        self
    }

    pub fn without_anonymous(mut self) -> Self {
        self.allow_anonymous = false;
        self
    }

    fn state(&self) -> MutexGuard<'_, AuthState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn replace_session(&self, session: Option<Session>) {
        let listeners: Vec<SessionListener> = {
            let mut state = self.state();
            state.session = session.clone();
            state.listeners.values().cloned().collect()
        };
        // Listeners run outside the lock so they may call back into the provider.
        for listener in listeners {
            listener(session.as_ref());
        }
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn sign_in_with_credentials(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let email = normalize_email(&credentials.email);
        let account = self
            .accounts
            .get(&email)
            .filter(|account| account.password == credentials.password)
            .ok_or(AuthError::InvalidCredentials)?;
        let session = Session {
            user_id: account.user_id.clone(),
            email: Some(email),
            anonymous: false,
        };
        info!(user_id = %session.user_id, "signed in");
        self.replace_session(Some(session.clone()));
        Ok(session)
    }

    async fn sign_in_anonymous(&self) -> Result<Session, AuthError> {
        if !self.allow_anonymous {
            return Err(AuthError::AnonymousDisabled);
        }
        let session = Session {
            user_id: Uuid::new_v4().simple().to_string(),
            email: None,
            anonymous: true,
        };
        info!(user_id = %session.user_id, "signed in anonymously");
        self.replace_session(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        debug!("signing out");
        self.replace_session(None);
        Ok(())
    }

    fn current_session(&self) -> Option<Session> {
        self.state().session.clone()
    }

    fn subscribe(&self, listener: SessionListener) -> SubscriptionId {
        let (id, current) = {
            let mut state = self.state();
            let id = SubscriptionId(state.next_id);
            state.next_id += 1;
            state.listeners.insert(id, Arc::clone(&listener));
            (id, state.session.clone())
        };
        listener(current.as_ref());
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.state().listeners.remove(&id).is_some()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
