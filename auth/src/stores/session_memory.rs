//! In-memory session store.
//!
//! Used by tests and by single-process deployments without Redis. Sessions
//! are lost on restart.

use crate::error::{AuthError, Result};
use crate::session::{Session, SessionId, SessionStore};
use async_trait::async_trait;
use chrono::Duration;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Process-local session store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
}

impl InMemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get count of stored sessions (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn session_count(&self) -> Result<usize> {
        Ok(self
            .sessions
            .lock()
            .map_err(|_| AuthError::InternalError("Mutex lock failed".to_string()))?
            .len())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_session(&self, session: &Session, _ttl: Duration) -> Result<()> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| AuthError::InternalError("Mutex lock failed".to_string()))?;

        if sessions.contains_key(&session.session_id) {
            return Err(AuthError::InternalError(
                "Session ID already exists".to_string(),
            ));
        }

        // Drop sessions that expired before this one started.
        sessions.retain(|_, existing| !existing.is_expired(session.created_at));
        sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    async fn get_session(&self, session_id: SessionId) -> Result<Session> {
        self.sessions
            .lock()
            .map_err(|_| AuthError::InternalError("Mutex lock failed".to_string()))?
            .get(&session_id)
            .cloned()
            .ok_or(AuthError::SessionNotFound)
    }

    async fn delete_session(&self, session_id: SessionId) -> Result<()> {
        self.sessions
            .lock()
            .map_err(|_| AuthError::InternalError("Mutex lock failed".to_string()))?
            .remove(&session_id);
        Ok(())
    }
}
