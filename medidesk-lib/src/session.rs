//! Session storage port

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::AuthError;
use crate::identity::Principal;

/// A persisted session: the principal plus when it was issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    /// The signed-in principal.
    pub principal: Principal,
    /// When the session was established.
    pub issued_at: DateTime<Utc>,
}

impl StoredSession {
    /// Creates a session issued now.
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            issued_at: Utc::now(),
        }
    }
}

/// Durable storage for the current session.
///
/// An explicit port injected from the composition root, replacing any
/// module-level session singleton. Implementations may write to local
/// storage, a keychain or a file; the in-memory implementation below
/// covers tests and ephemeral sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the stored session, if any.
    async fn get(&self) -> Result<Option<StoredSession>, AuthError>;

    /// Persists the session.
    async fn set(&self, session: StoredSession) -> Result<(), AuthError>;

    /// Removes the stored session.
    async fn clear(&self) -> Result<(), AuthError>;
}

/// Session storage that lives only as long as the process.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    session: RwLock<Option<StoredSession>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self) -> Result<Option<StoredSession>, AuthError> {
        Ok(self.session.read().await.clone())
    }

    async fn set(&self, session: StoredSession) -> Result<(), AuthError> {
        *self.session.write().await = Some(session);
        Ok(())
    }

    async fn clear(&self) -> Result<(), AuthError> {
        *self.session.write().await = None;
        Ok(())
    }
}
