//! Storage seams.
//!
//! Three id-keyed tables sit behind these traits: events, users and
//! transactions. Implementations must make [`LedgerStore::claim_ticket`] and
//! [`LedgerStore::apply_transition`] atomic: a concurrent reader observes
//! either all of their writes or none.

use crate::error::Result;
use crate::types::{
    Event, EventDraft, EventId, NewUser, TicketClaim, Transaction, TransactionId,
    TransactionRecord, Transition, User, UserId,
};
use async_trait::async_trait;

/// Event catalog table.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All events in creation order
    async fn list_events(&self) -> Result<Vec<Event>>;

    /// A single event by id
    async fn get_event(&self, id: EventId) -> Result<Option<Event>>;

    /// Insert a new event
    async fn insert_event(&self, event: &Event) -> Result<()>;

    /// Overwrite an event's catalog fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id.
    async fn update_event(&self, id: EventId, draft: EventDraft) -> Result<Event>;

    /// Remove an event.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id and `Validation` when any
    /// transaction still references the event.
    async fn delete_event(&self, id: EventId) -> Result<()>;

    /// Check that the store is reachable
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Transaction ledger. Owns the stock counters' consistency with the
/// transactions that hold tickets.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Atomically take one ticket from the claimed event and record a
    /// pending transaction for it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown user or event and `OutOfStock`
    /// when the event has no ticket left; in every case nothing is written.
    async fn claim_ticket(&self, claim: TicketClaim) -> Result<Transaction>;

    /// Atomically move a transaction owned by `owner` to the transition's
    /// target status. A cancel also returns the ticket to its event.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Forbidden` or `InvalidStateTransition`; nothing
    /// is written on error.
    async fn apply_transition(
        &self,
        id: TransactionId,
        owner: UserId,
        transition: Transition,
    ) -> Result<Transaction>;

    /// A single transaction by id
    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>>;

    /// Transactions owned by `user_id`, newest first, with event titles
    async fn history(&self, user_id: UserId) -> Result<Vec<TransactionRecord>>;
}

/// User accounts table.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the email is already registered.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Look up a user by (lowercase) email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Look up a user by id
    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Grant or revoke administrator rights.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id.
    async fn set_admin(&self, id: UserId, is_admin: bool) -> Result<User>;
}

/// A backend providing every table.
pub trait TicketingStore: CatalogStore + LedgerStore + UserStore {}

impl<T: CatalogStore + LedgerStore + UserStore> TicketingStore for T {}
