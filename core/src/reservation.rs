//! Reservation engine: turns a checkout into a pending transaction.

use crate::environment::Clock;
use crate::error::{Result, TicketingError};
use crate::identity::Caller;
use crate::metrics;
use crate::store::LedgerStore;
use crate::types::{EventId, PaymentMethod, TicketClaim, Transaction, TransactionId};
use std::sync::Arc;

/// Claims tickets on behalf of authenticated callers.
///
/// Stock is decremented at reservation time. The stock check, the decrement
/// and the transaction insert form one atomic unit inside the
/// [`LedgerStore`], so concurrent checkouts for the last ticket produce
/// exactly one winner.
#[derive(Clone)]
pub struct ReservationEngine {
    ledger: Arc<dyn LedgerStore>,
    clock: Arc<dyn Clock>,
}

impl ReservationEngine {
    /// Create an engine over a ledger
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerStore>, clock: Arc<dyn Clock>) -> Self {
        Self { ledger, clock }
    }

    /// Reserve one ticket for `event_id`.
    ///
    /// `payment_method` defaults to QRIS when not given.
    ///
    /// # Errors
    ///
    /// - [`TicketingError::Unauthorized`] for anonymous callers
    /// - [`TicketingError::NotFound`] for an unknown event
    /// - [`TicketingError::OutOfStock`] when the event has no ticket left
    #[tracing::instrument(skip_all, fields(event_id = %event_id))]
    pub async fn reserve(
        &self,
        event_id: EventId,
        caller: &Caller,
        payment_method: Option<PaymentMethod>,
    ) -> Result<Transaction> {
        let identity = caller.identity()?;
        let claim = TicketClaim {
            transaction_id: TransactionId::new(),
            event_id,
            user_id: identity.user_id,
            payment_method: payment_method.unwrap_or_default(),
            requested_at: self.clock.now(),
        };

        match self.ledger.claim_ticket(claim).await {
            Ok(transaction) => {
                metrics::record_reservation_created();
                tracing::info!(
                    transaction_id = %transaction.id,
                    user_id = %transaction.user_id,
                    amount = transaction.amount.minor(),
                    "Ticket reserved"
                );
                Ok(transaction)
            }
            Err(err @ TicketingError::OutOfStock { .. }) => {
                metrics::record_reservation_out_of_stock();
                tracing::info!(user_id = %identity.user_id, "Reservation rejected: sold out");
                Err(err)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Reservation failed");
                Err(err)
            }
        }
    }
}
