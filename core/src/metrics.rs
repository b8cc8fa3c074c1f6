//! Business metrics for the ticketing system.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `ticketing_reservations_total{outcome}` - Reservation attempts by outcome
//!   (created, out_of_stock)
//! - `ticketing_payments_total{status}` - Payment transitions by resulting status
//!   (paid, failed)
//! - `ticketing_payment_revenue_total` - Revenue of confirmed transactions
//! - `ticketing_tickets_released_total` - Tickets returned to stock by cancellation
//! - `ticketing_events_created_total` - Events added to the catalog
//! - `ticketing_logins_total{outcome}` - Login attempts by outcome
//!
//! ## Gauges
//! - `ticketing_pending_transactions` - Transactions awaiting confirmation
//!   since process start

use metrics::{describe_counter, describe_gauge};

/// Initialize and register all business metrics descriptions.
///
/// Call once at application startup, before any metric is recorded.
pub fn register_business_metrics() {
    describe_counter!(
        "ticketing_reservations_total",
        "Total number of reservation attempts by outcome (created, out_of_stock)"
    );
    describe_gauge!(
        "ticketing_pending_transactions",
        "Current number of transactions awaiting confirmation"
    );

    describe_counter!(
        "ticketing_payments_total",
        "Total number of payment transitions by status (paid, failed)"
    );
    describe_counter!(
        "ticketing_payment_revenue_total",
        "Total revenue from confirmed transactions in the smallest currency unit"
    );
    describe_counter!(
        "ticketing_tickets_released_total",
        "Total number of tickets returned to stock by cancellations"
    );

    describe_counter!(
        "ticketing_events_created_total",
        "Total number of events created"
    );

    describe_counter!(
        "ticketing_logins_total",
        "Total number of login attempts by outcome (success, failure)"
    );

    tracing::info!("Business metrics registered");
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record a successful reservation.
pub fn record_reservation_created() {
    metrics::counter!("ticketing_reservations_total", "outcome" => "created").increment(1);
    metrics::gauge!("ticketing_pending_transactions").increment(1.0);
    tracing::debug!("Recorded reservation_created metric");
}

/// Record a reservation rejected because the event sold out.
pub fn record_reservation_out_of_stock() {
    metrics::counter!("ticketing_reservations_total", "outcome" => "out_of_stock").increment(1);
    tracing::debug!("Recorded reservation_out_of_stock metric");
}

/// Record a confirmed payment.
///
/// # Arguments
///
/// * `amount` - Transaction amount in the smallest currency unit
pub fn record_payment_confirmed(amount: u64) {
    metrics::counter!("ticketing_payments_total", "status" => "paid").increment(1);
    metrics::counter!("ticketing_payment_revenue_total").increment(amount);
    metrics::gauge!("ticketing_pending_transactions").decrement(1.0);
    tracing::debug!(amount, "Recorded payment_confirmed metric");
}

/// Record a cancelled transaction.
pub fn record_payment_cancelled() {
    metrics::counter!("ticketing_payments_total", "status" => "failed").increment(1);
    metrics::counter!("ticketing_tickets_released_total").increment(1);
    metrics::gauge!("ticketing_pending_transactions").decrement(1.0);
    tracing::debug!("Recorded payment_cancelled metric");
}

/// Record an event created.
pub fn record_event_created() {
    metrics::counter!("ticketing_events_created_total").increment(1);
    tracing::debug!("Recorded event_created metric");
}

/// Record a login attempt.
///
/// # Arguments
///
/// * `success` - Whether the credentials were accepted
pub fn record_login(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!("ticketing_logins_total", "outcome" => outcome).increment(1);
    tracing::debug!(outcome, "Recorded login metric");
}
