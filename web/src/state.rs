//! Application state shared by all handlers.

use std::sync::Arc;
use ticketing_auth::IdentityService;
use ticketing_core::{
    CatalogService, Clock, HistoryView, PaymentEngine, ReservationEngine, TicketingStore,
};

/// Application state shared across all HTTP handlers.
///
/// Every field is an `Arc`-backed service, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Public event reads and admin-gated mutation
    pub catalog: CatalogService,
    /// Checkout: claims a ticket and opens a pending transaction
    pub reservations: ReservationEngine,
    /// Payment page, confirmation and cancellation
    pub payments: PaymentEngine,
    /// Caller's own transactions
    pub history: HistoryView,
    /// Registration, login and per-request caller resolution
    pub identity: IdentityService,
    /// Mark the session cookie `Secure`
    pub secure_cookies: bool,
}

impl AppState {
    /// Wire every service over one store.
    #[must_use]
    pub fn new<S>(store: Arc<S>, identity: IdentityService, clock: Arc<dyn Clock>) -> Self
    where
        S: TicketingStore + 'static,
    {
        Self {
            catalog: CatalogService::new(store.clone()),
            reservations: ReservationEngine::new(store.clone(), clock),
            payments: PaymentEngine::new(store.clone()),
            history: HistoryView::new(store),
            identity,
            secure_cookies: false,
        }
    }

    /// Set the `Secure` attribute on session cookies.
    #[must_use]
    pub const fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }
}
