//! Payment confirmation engine.
//!
//! Drives the transaction state machine (`Pending → Paid`,
//! `Pending → Failed`). Settlement is a manual self-confirmation by the
//! transaction's owner; no gateway is involved.

use crate::error::{Result, TicketingError};
use crate::identity::Caller;
use crate::metrics;
use crate::store::LedgerStore;
use crate::types::{Transaction, TransactionId, Transition};
use std::sync::Arc;

/// Applies owner-initiated transitions to pending transactions.
#[derive(Clone)]
pub struct PaymentEngine {
    ledger: Arc<dyn LedgerStore>,
}

impl PaymentEngine {
    /// Create an engine over a ledger
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self { ledger }
    }

    /// Load a transaction for its owner (payment page).
    ///
    /// # Errors
    ///
    /// - [`TicketingError::Unauthorized`] for anonymous callers
    /// - [`TicketingError::NotFound`] for an unknown transaction
    /// - [`TicketingError::Forbidden`] when the caller does not own it
    pub async fn get(&self, id: TransactionId, caller: &Caller) -> Result<Transaction> {
        let identity = caller.identity()?;
        let transaction = self
            .ledger
            .get_transaction(id)
            .await?
            .ok_or_else(|| TicketingError::not_found("Transaction", id))?;
        transaction.ensure_owned_by(identity.user_id)?;
        Ok(transaction)
    }

    /// Mark a pending transaction as paid.
    ///
    /// # Errors
    ///
    /// Same as [`PaymentEngine::get`], plus
    /// [`TicketingError::InvalidStateTransition`] when the transaction is no
    /// longer pending.
    #[tracing::instrument(skip_all, fields(transaction_id = %id))]
    pub async fn confirm(&self, id: TransactionId, caller: &Caller) -> Result<Transaction> {
        let transaction = self.transition(id, caller, Transition::Confirm).await?;
        metrics::record_payment_confirmed(transaction.amount.minor());
        tracing::info!(amount = transaction.amount.minor(), "Payment confirmed");
        Ok(transaction)
    }

    /// Cancel a pending transaction, returning its ticket to stock.
    ///
    /// # Errors
    ///
    /// Same as [`PaymentEngine::confirm`].
    #[tracing::instrument(skip_all, fields(transaction_id = %id))]
    pub async fn cancel(&self, id: TransactionId, caller: &Caller) -> Result<Transaction> {
        let transaction = self.transition(id, caller, Transition::Cancel).await?;
        metrics::record_payment_cancelled();
        tracing::info!(event_id = %transaction.event_id, "Transaction cancelled, ticket released");
        Ok(transaction)
    }

    async fn transition(
        &self,
        id: TransactionId,
        caller: &Caller,
        transition: Transition,
    ) -> Result<Transaction> {
        let identity = caller.identity()?;
        self.ledger
            .apply_transition(id, identity.user_id, transition)
            .await
            .inspect_err(|err| {
                if err.is_user_error() {
                    tracing::debug!(error = %err, ?transition, "Transition rejected");
                } else {
                    tracing::error!(error = %err, ?transition, "Transition failed");
                }
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::environment::SystemClock;
    use crate::identity::Identity;
    use crate::memory::test_support::registered;
    use crate::memory::InMemoryStore;
    use crate::reservation::ReservationEngine;
    use crate::store::CatalogStore;
    use crate::types::{Event, EventDraft, EventId, TransactionStatus, UserId};

    struct Fixture {
        store: InMemoryStore,
        payments: PaymentEngine,
        owner: Caller,
        event_id: EventId,
        transaction: Transaction,
    }

    fn stranger() -> Caller {
        Caller::Authenticated(Identity {
            user_id: UserId::new(),
            email: "stranger@example.com".to_string(),
            is_admin: false,
        })
    }

    async fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let event = Event::from_draft(
            EventId::new(),
            EventDraft::new("Workshop Manga", "Belajar menggambar", 200_000, 2).unwrap(),
        );
        store.insert_event(&event).await.unwrap();
        let ledger: Arc<dyn LedgerStore> = Arc::new(store.clone());
        let reservations = ReservationEngine::new(Arc::clone(&ledger), Arc::new(SystemClock));
        let owner = registered(&store, "aoi@example.com", false).await;
        let transaction = reservations.reserve(event.id, &owner, None).await.unwrap();
        Fixture {
            store,
            payments: PaymentEngine::new(ledger),
            owner,
            event_id: event.id,
            transaction,
        }
    }

    #[tokio::test]
    async fn test_confirm_moves_pending_to_paid() {
        let f = fixture().await;
        let paid = f.payments.confirm(f.transaction.id, &f.owner).await.unwrap();
        assert_eq!(paid.status, TransactionStatus::Paid);
        assert_eq!(paid.amount, f.transaction.amount);
    }

    #[tokio::test]
    async fn test_confirm_twice_is_invalid() {
        let f = fixture().await;
        f.payments.confirm(f.transaction.id, &f.owner).await.unwrap();
        let err = f
            .payments
            .confirm(f.transaction.id, &f.owner)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TicketingError::InvalidStateTransition {
                from: TransactionStatus::Paid,
                to: TransactionStatus::Paid,
            }
        );
    }

    #[tokio::test]
    async fn test_non_owner_cannot_confirm_or_view() {
        let f = fixture().await;
        let stranger = stranger();

        let err = f
            .payments
            .confirm(f.transaction.id, &stranger)
            .await
            .unwrap_err();
        assert!(matches!(err, TicketingError::Forbidden(_)));
        assert!(matches!(
            f.payments.get(f.transaction.id, &stranger).await.unwrap_err(),
            TicketingError::Forbidden(_)
        ));

        let unchanged = f.payments.get(f.transaction.id, &f.owner).await.unwrap();
        assert_eq!(unchanged.status, TransactionStatus::Pending);
    }

    #[tokio::test]
    async fn test_cancel_releases_ticket() {
        let f = fixture().await;
        assert_eq!(f.store.get_event(f.event_id).await.unwrap().unwrap().stock, 1);

        let failed = f.payments.cancel(f.transaction.id, &f.owner).await.unwrap();
        assert_eq!(failed.status, TransactionStatus::Failed);
        assert_eq!(f.store.get_event(f.event_id).await.unwrap().unwrap().stock, 2);

        let err = f
            .payments
            .confirm(f.transaction.id, &f.owner)
            .await
            .unwrap_err();
        assert!(matches!(err, TicketingError::InvalidStateTransition { .. }));
    }

    #[tokio::test]
    async fn test_unknown_transaction() {
        let f = fixture().await;
        let err = f
            .payments
            .confirm(TransactionId::new(), &f.owner)
            .await
            .unwrap_err();
        assert!(matches!(err, TicketingError::NotFound { resource: "Transaction", .. }));
    }

    #[tokio::test]
    async fn test_anonymous_cannot_confirm() {
        let f = fixture().await;
        let err = f
            .payments
            .confirm(f.transaction.id, &Caller::Anonymous)
            .await
            .unwrap_err();
        assert_eq!(err, TicketingError::Unauthorized);
    }
}
