//! Checkout: claim a ticket and open a pending transaction.

use super::{recover, require_login};
use crate::extractors::CurrentCaller;
use crate::flash::{Flash, Page, SeeOther};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Form,
};
use serde::{Deserialize, Serialize};
use ticketing_core::{Event, EventId, PaymentMethod};
use uuid::Uuid;

/// Checkout page body.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    /// Event being bought
    pub event: Event,
    /// Accepted payment methods
    pub payment_methods: [PaymentMethod; 3],
}

/// Checkout form.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutForm {
    /// `qris`, `bank_transfer` or `virtual_account`; QRIS when blank
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// `GET /checkout/:event_id`
///
/// # Errors
///
/// Redirects anonymous callers to the login page; 404 for an unknown event.
pub async fn checkout_page(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    Path(event_id): Path<Uuid>,
    flash: Flash,
) -> Result<Page<CheckoutView>, Response> {
    let here = format!("/checkout/{event_id}");
    require_login(&caller, &here)?;

    let event = state
        .catalog
        .get(EventId::from_uuid(event_id))
        .await
        .map_err(|e| recover(e, "/", &here))?;

    Ok(Page::new(
        CheckoutView {
            event,
            payment_methods: [
                PaymentMethod::Qris,
                PaymentMethod::BankTransfer,
                PaymentMethod::VirtualAccount,
            ],
        },
        flash,
    ))
}

/// `POST /checkout/:event_id`
///
/// Redirects to the payment page of the new transaction, or home with a
/// notice when the event is sold out.
pub async fn checkout(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    Path(event_id): Path<Uuid>,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let here = format!("/checkout/{event_id}");

    let payment_method = match form.payment_method.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match raw.parse::<PaymentMethod>() {
            Ok(method) => Some(method),
            Err(err) => return recover(err, &here, &here),
        },
    };

    match state
        .reservations
        .reserve(EventId::from_uuid(event_id), &caller, payment_method)
        .await
    {
        Ok(transaction) => SeeOther::to(format!("/payment/{}", transaction.id)).into_response(),
        Err(err) => recover(err, "/", &here),
    }
}
