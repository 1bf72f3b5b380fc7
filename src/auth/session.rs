//! Session management
//!
//! Sessions are opaque UUIDs carried in the `session_id` cookie and
//! mapped to a user id on the server. Handlers only see the
//! [`SessionStore`] trait, so the in-memory registry can be replaced by
//! a persistent backend without touching routes.

use std::collections::HashMap;

use axum::async_trait;
use tokio::sync::RwLock;

use crate::error::AppError;

/// Cookie holding the session id
pub const SESSION_COOKIE: &str = "session_id";

/// Server-side mapping from session id to user id
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Start a session for `user_id` and return its new id
    async fn create(&self, user_id: &str) -> Result<String, AppError>;

    /// Look up the user behind a session id
    async fn resolve(&self, session_id: &str) -> Result<Option<String>, AppError>;

    /// End a session; unknown ids are ignored
    async fn destroy(&self, session_id: &str) -> Result<(), AppError>;

    /// Number of live sessions, reported as `octogate_sessions_active`
    async fn count(&self) -> Result<usize, AppError>;
}

/// Process-local session registry
///
/// Starts empty and is lost when the process exits. Entries never
/// expire and are never evicted.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: &str) -> Result<String, AppError> {
        let session_id = uuid::Uuid::new_v4().to_string();

        self.sessions
            .write()
            .await
            .insert(session_id.clone(), user_id.to_string());

        Ok(session_id)
    }

    async fn resolve(&self, session_id: &str) -> Result<Option<String>, AppError> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn destroy(&self, session_id: &str) -> Result<(), AppError> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }

    async fn count(&self) -> Result<usize, AppError> {
        Ok(self.sessions.read().await.len())
    }
}
