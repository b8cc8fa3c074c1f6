//! # Ticketing Authentication
//!
//! Accounts, password login and sessions for the ticketing service.
//!
//! ## Features
//!
//! - **Argon2id** password hashing in PHC format
//! - **Sessions** keyed by random ids, stored in Redis or in memory
//! - **Explicit callers**: [`IdentityService::resolve`] turns a session id
//!   into a [`Caller`](ticketing_core::Caller) that the web layer passes to
//!   every domain operation
//!
//! ## Example
//!
//! ```rust,ignore
//! let identity = IdentityService::new(users, sessions, clock, Duration::hours(24));
//!
//! identity.register(form).await?;
//! let (session, _) = identity.login(&credentials).await?;
//!
//! let caller = identity.resolve(Some(session.session_id)).await?;
//! reservations.reserve(event_id, &caller, None).await?;
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod error;
pub mod password;
pub mod service;
pub mod session;
pub mod stores;

// Re-export main types for convenience
pub use error::{AuthError, Result};
pub use service::{Credentials, IdentityService, Registration};
pub use session::{Session, SessionId, SessionStore};
pub use stores::{InMemorySessionStore, RedisSessionStore};
