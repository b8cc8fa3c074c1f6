//! Login sessions.
//!
//! A session binds an opaque random id (carried by the client in a cookie or
//! a bearer header) to a user id. The user's current identity, including
//! admin rights, is loaded from the user table on every request.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ticketing_core::UserId;

/// Unique identifier for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    /// Generate a new random `SessionId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self)
    }
}

/// A logged-in session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub session_id: SessionId,

    /// Owner of the session.
    pub user_id: UserId,

    /// Session creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Session expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Start a session for `user_id` lasting `ttl` from `now`.
    #[must_use]
    pub fn start(user_id: UserId, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            session_id: SessionId::new(),
            user_id,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Whether the session is no longer valid at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Session storage.
///
/// Implementations may expire entries on their own (Redis TTL); callers
/// still check [`Session::is_expired`].
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a new session.
    ///
    /// # Errors
    ///
    /// Returns error if the id is already taken or the backend fails.
    async fn create_session(&self, session: &Session, ttl: Duration) -> Result<()>;

    /// Load a session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SessionNotFound`](crate::AuthError::SessionNotFound)
    /// for unknown ids.
    async fn get_session(&self, session_id: SessionId) -> Result<Session>;

    /// Delete a session. Deleting an unknown id is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    async fn delete_session(&self, session_id: SessionId) -> Result<()>;

    /// Check that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
