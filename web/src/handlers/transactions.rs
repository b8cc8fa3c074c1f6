//! The caller's own transactions.

use super::{recover, require_login};
use crate::extractors::CurrentCaller;
use crate::flash::{Flash, Page};
use crate::state::AppState;
use axum::{extract::State, response::Response};
use serde::Serialize;
use ticketing_core::TransactionRecord;

/// Transaction list body.
#[derive(Debug, Serialize)]
pub struct TransactionsView {
    /// Newest first, each with its event title
    pub transactions: Vec<TransactionRecord>,
}

/// `GET /transactions`
///
/// # Errors
///
/// Redirects anonymous callers to the login page.
pub async fn list(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    flash: Flash,
) -> Result<Page<TransactionsView>, Response> {
    const HERE: &str = "/transactions";
    require_login(&caller, HERE)?;

    let transactions = state
        .history
        .history(&caller)
        .await
        .map_err(|e| recover(e, "/", HERE))?;

    Ok(Page::new(TransactionsView { transactions }, flash))
}
