//! Axum boundary for the ticketing service.
//!
//! # Request Flow
//!
//! 1. **Correlate**: the middleware tags the request with a correlation id
//! 2. **Resolve** the caller from the session cookie or bearer header
//! 3. **Call** the core operation with that explicit `Caller`
//! 4. **Answer** a JSON page view, or a `303 See Other` carrying flash
//!    notices for form posts
//!
//! # Example
//!
//! ```ignore
//! use ticketing_web::{build_router, AppState};
//!
//! let state = AppState::new(store, identity, Arc::new(SystemClock));
//! let app = build_router(state);
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cookies;
pub mod error;
pub mod extractors;
pub mod flash;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{CorrelationId, CurrentCaller, SessionToken};
pub use flash::{Flash, Notice, NoticeLevel, Page, SeeOther};
pub use middleware::{correlation_id_layer, CORRELATION_ID_HEADER};
pub use router::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
