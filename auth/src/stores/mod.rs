//! Session store implementations.
//!
//! - **In-memory** - single process, lost on restart
//! - **Redis** - shared across processes, TTL-based expiration

pub mod session_memory;
pub mod session_redis;

// Re-exports
pub use session_memory::InMemorySessionStore;
pub use session_redis::RedisSessionStore;
