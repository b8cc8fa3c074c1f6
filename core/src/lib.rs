//! # Ticketing Core
//!
//! Domain model and engines for a small event-ticketing service.
//!
//! - [`ReservationEngine`] claims one ticket per checkout, decrementing stock
//!   atomically at reservation time.
//! - [`PaymentEngine`] moves pending transactions to `Paid` (confirm) or
//!   `Failed` (cancel, which returns the ticket to stock).
//! - [`CatalogService`] offers public reads and admin-gated event mutation.
//! - [`HistoryView`] lists a caller's own transactions.
//!
//! Every operation receives an explicit [`Caller`]; capability checks are
//! preconditions of the operation itself. Storage sits behind the
//! [`store`] traits, with [`InMemoryStore`] as the process-local backend.

pub mod catalog;
pub mod environment;
pub mod error;
pub mod history;
pub mod identity;
pub mod memory;
pub mod metrics;
pub mod payment;
pub mod reservation;
pub mod store;
pub mod types;

pub use catalog::CatalogService;
pub use environment::{Clock, SystemClock};
pub use error::{Result, TicketingError};
pub use history::HistoryView;
pub use identity::{Caller, Identity};
pub use memory::InMemoryStore;
pub use payment::PaymentEngine;
pub use reservation::ReservationEngine;
pub use store::{CatalogStore, LedgerStore, TicketingStore, UserStore};
pub use types::{
    Event, EventDraft, EventId, Money, NewUser, PaymentMethod, TicketClaim, Transaction,
    TransactionId, TransactionRecord, TransactionStatus, Transition, User, UserId,
};
