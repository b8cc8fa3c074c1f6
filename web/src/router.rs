//! Router configuration.

use crate::handlers::{account, admin, checkout, health, pages, payment, transactions};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Every request runs inside an `http_request` span carrying its
/// correlation id; `TraceLayer` logs requests and responses within it.
pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/events", get(admin::list))
        .route("/events/add", get(admin::add_page).post(admin::add))
        .route("/events/edit/:id", get(admin::edit_page).post(admin::edit))
        .route("/events/delete/:id", post(admin::delete));

    Router::new()
        // Health checks
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Public pages
        .route("/", get(pages::home))
        .route("/events", get(pages::events))
        .route("/event/:id", get(pages::event_detail))
        .route("/tentang", get(pages::about))
        .route("/kontak", get(pages::contact))
        // Accounts
        .route("/register", get(account::register_page).post(account::register))
        .route("/login", get(account::login_page).post(account::login))
        .route("/logout", get(account::logout))
        // Checkout and payment
        .route(
            "/checkout/:event_id",
            get(checkout::checkout_page).post(checkout::checkout),
        )
        .route("/payment/:tx", get(payment::payment_page).post(payment::confirm))
        .route("/payment/:tx/cancel", post(payment::cancel))
        .route("/transactions", get(transactions::list))
        // Catalog administration
        .nest("/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}
