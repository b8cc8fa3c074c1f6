//! Payment page, confirmation and cancellation.

use super::{recover, require_login};
use crate::extractors::CurrentCaller;
use crate::flash::{Flash, Notice, Page, SeeOther};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use ticketing_core::{Transaction, TransactionId};
use uuid::Uuid;

/// Payment page body.
#[derive(Debug, Serialize)]
pub struct PaymentView {
    /// The caller's transaction
    pub transaction: Transaction,
    /// Whether confirm/cancel are still possible
    pub actionable: bool,
}

/// `GET /payment/:tx`
///
/// # Errors
///
/// Redirects anonymous callers to the login page and non-owners home with
/// a notice; 404 for an unknown transaction.
pub async fn payment_page(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    Path(tx): Path<Uuid>,
    flash: Flash,
) -> Result<Page<PaymentView>, Response> {
    let here = format!("/payment/{tx}");
    require_login(&caller, &here)?;

    let transaction = state
        .payments
        .get(TransactionId::from_uuid(tx), &caller)
        .await
        .map_err(|e| recover(e, "/", &here))?;
    let actionable = !transaction.status.is_terminal();

    Ok(Page::new(
        PaymentView {
            transaction,
            actionable,
        },
        flash,
    ))
}

/// `POST /payment/:tx`
///
/// Marks the transaction `Paid` and redirects to the transaction list.
pub async fn confirm(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    Path(tx): Path<Uuid>,
) -> Response {
    let here = format!("/payment/{tx}");
    match state
        .payments
        .confirm(TransactionId::from_uuid(tx), &caller)
        .await
    {
        Ok(_) => SeeOther::to("/transactions")
            .notice(Notice::success(
                "Payment confirmed. Your ticket is now active.",
            ))
            .into_response(),
        Err(err) => recover(err, "/", &here),
    }
}

/// `POST /payment/:tx/cancel`
///
/// Marks the transaction `Failed`, returns the ticket to stock and
/// redirects to the transaction list.
pub async fn cancel(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    Path(tx): Path<Uuid>,
) -> Response {
    let here = format!("/payment/{tx}");
    match state
        .payments
        .cancel(TransactionId::from_uuid(tx), &caller)
        .await
    {
        Ok(_) => SeeOther::to("/transactions")
            .notice(Notice::info("Payment cancelled. The ticket has been released."))
            .into_response(),
        Err(err) => recover(err, "/", &here),
    }
}
