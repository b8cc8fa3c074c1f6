//! In-memory store.
//!
//! All three tables sit behind a single mutex, so every operation is
//! serialized and trivially atomic. Used by tests and by the server's
//! `memory` backend.

use crate::error::{Result, TicketingError};
use crate::store::{CatalogStore, LedgerStore, UserStore};
use crate::types::{
    Event, EventDraft, EventId, NewUser, TicketClaim, Transaction, TransactionId,
    TransactionRecord, Transition, User, UserId,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tables {
    events: HashMap<EventId, Event>,
    /// Event ids in creation order
    event_order: Vec<EventId>,
    users: HashMap<UserId, User>,
    users_by_email: HashMap<String, UserId>,
    /// Append-only; transactions are never deleted
    transactions: Vec<Transaction>,
    transaction_index: HashMap<TransactionId, usize>,
}

/// Process-local store for all ticketing tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| TicketingError::storage("Mutex lock failed"))
    }

    /// Number of stored transactions (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn transaction_count(&self) -> Result<usize> {
        Ok(self.tables()?.transactions.len())
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn list_events(&self) -> Result<Vec<Event>> {
        let tables = self.tables()?;
        Ok(tables
            .event_order
            .iter()
            .filter_map(|id| tables.events.get(id).cloned())
            .collect())
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>> {
        Ok(self.tables()?.events.get(&id).cloned())
    }

    async fn insert_event(&self, event: &Event) -> Result<()> {
        let mut tables = self.tables()?;
        if tables.events.contains_key(&event.id) {
            return Err(TicketingError::storage(format!(
                "Event id already exists: {}",
                event.id
            )));
        }
        tables.events.insert(event.id, event.clone());
        tables.event_order.push(event.id);
        Ok(())
    }

    async fn update_event(&self, id: EventId, draft: EventDraft) -> Result<Event> {
        let mut tables = self.tables()?;
        let event = tables
            .events
            .get_mut(&id)
            .ok_or_else(|| TicketingError::not_found("Event", id))?;
        event.apply_draft(draft);
        Ok(event.clone())
    }

    async fn delete_event(&self, id: EventId) -> Result<()> {
        let mut tables = self.tables()?;
        if !tables.events.contains_key(&id) {
            return Err(TicketingError::not_found("Event", id));
        }
        if tables.transactions.iter().any(|tx| tx.event_id == id) {
            return Err(TicketingError::validation(
                "Event has transactions and cannot be deleted",
            ));
        }
        tables.events.remove(&id);
        tables.event_order.retain(|existing| *existing != id);
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn claim_ticket(&self, claim: TicketClaim) -> Result<Transaction> {
        let mut tables = self.tables()?;
        if !tables.users.contains_key(&claim.user_id) {
            return Err(TicketingError::not_found("User", claim.user_id));
        }
        let event = tables
            .events
            .get_mut(&claim.event_id)
            .ok_or_else(|| TicketingError::not_found("Event", claim.event_id))?;
        let amount = event.take_ticket()?;

        let transaction = Transaction::pending(&claim, amount);
        let position = tables.transactions.len();
        tables.transactions.push(transaction.clone());
        tables.transaction_index.insert(transaction.id, position);
        Ok(transaction)
    }

    async fn apply_transition(
        &self,
        id: TransactionId,
        owner: UserId,
        transition: Transition,
    ) -> Result<Transaction> {
        let mut tables = self.tables()?;
        let position = *tables
            .transaction_index
            .get(&id)
            .ok_or_else(|| TicketingError::not_found("Transaction", id))?;

        let current = &tables.transactions[position];
        let next = current.plan(owner, transition)?;
        let event_id = current.event_id;

        if transition.releases_ticket() {
            // An event with transactions cannot be deleted, so it must exist.
            let event = tables
                .events
                .get_mut(&event_id)
                .ok_or_else(|| TicketingError::not_found("Event", event_id))?;
            event.return_ticket();
        }

        let transaction = &mut tables.transactions[position];
        transaction.status = next;
        Ok(transaction.clone())
    }

    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let tables = self.tables()?;
        Ok(tables
            .transaction_index
            .get(&id)
            .map(|&position| tables.transactions[position].clone()))
    }

    async fn history(&self, user_id: UserId) -> Result<Vec<TransactionRecord>> {
        let tables = self.tables()?;
        let mut records: Vec<TransactionRecord> = tables
            .transactions
            .iter()
            .rev()
            .filter(|tx| tx.user_id == user_id)
            .map(|tx| TransactionRecord {
                event_title: tables
                    .events
                    .get(&tx.event_id)
                    .map(|event| event.title.clone())
                    .unwrap_or_default(),
                transaction: tx.clone(),
            })
            .collect();
        // Stable sort keeps reverse insertion order for equal timestamps.
        records.sort_by(|a, b| b.transaction.created_at.cmp(&a.transaction.created_at));
        Ok(records)
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables()?;
        if tables.users_by_email.contains_key(&user.email) {
            return Err(TicketingError::validation("Email is already registered"));
        }
        let user = User {
            id: UserId::new(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            is_admin: user.is_admin,
        };
        tables.users_by_email.insert(user.email.clone(), user.id);
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables()?;
        Ok(tables
            .users_by_email
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.tables()?.users.get(&id).cloned())
    }

    async fn set_admin(&self, id: UserId, is_admin: bool) -> Result<User> {
        let mut tables = self.tables()?;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| TicketingError::not_found("User", id))?;
        user.is_admin = is_admin;
        Ok(user.clone())
    }
}
