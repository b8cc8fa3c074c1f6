//! HTTP handlers.
//!
//! GET handlers answer JSON [`Page`](crate::flash::Page) views; form posts
//! answer `303 See Other`. Domain errors become a notice plus a redirect
//! through [`recover`], except missing resources (404) and storage
//! failures (500), which become an [`AppError`] body.

pub mod account;
pub mod admin;
pub mod checkout;
pub mod health;
pub mod pages;
pub mod payment;
pub mod transactions;

use crate::error::AppError;
use crate::flash::{Notice, SeeOther};
use axum::response::{IntoResponse, Response};
use ticketing_core::{Caller, TicketingError};

/// Shown when an anonymous caller reaches a page that needs a login.
pub const LOGIN_REQUIRED: &str = "Please log in to access this page.";

/// Shown when a non-admin reaches an admin page.
pub const ADMIN_REQUIRED: &str = "You do not have permission to access this page.";

/// Keep `next` only when it is a local path.
///
/// Anything else (absolute URLs, protocol-relative `//host` paths,
/// backslash tricks) falls back to `/`.
#[must_use]
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') =>
        {
            path
        }
        _ => "/",
    }
}

/// Redirect to the login page, coming back to `next` afterwards.
pub fn login_redirect(next: &str) -> SeeOther {
    SeeOther::to(format!("/login?next={}", urlencoding::encode(next)))
        .notice(Notice::info(LOGIN_REQUIRED))
}

/// User-facing text for a refused operation.
fn notice_text(err: &TicketingError) -> String {
    match err {
        TicketingError::OutOfStock { .. } => "Sorry, tickets for this event are sold out.".to_string(),
        TicketingError::Forbidden(message) | TicketingError::Validation(message) => message.clone(),
        TicketingError::InvalidStateTransition { from, .. } => {
            format!("This transaction is already {from}.")
        }
        other => other.to_string(),
    }
}

/// Turn a domain error into the response a browser flow expects.
///
/// - `Unauthorized` redirects to the login page with `next = here`
/// - `NotFound` and `Storage` answer an [`AppError`] body
/// - every other error redirects to `back_to` with an error notice
pub fn recover(err: TicketingError, back_to: &str, here: &str) -> Response {
    match err {
        TicketingError::Unauthorized => login_redirect(here).into_response(),
        TicketingError::NotFound { .. } | TicketingError::Storage(_) => {
            AppError::from(err).into_response()
        }
        other => {
            tracing::debug!(error = %other, redirect = back_to, "Request refused");
            SeeOther::to(back_to)
                .notice(Notice::error(notice_text(&other)))
                .into_response()
        }
    }
}

/// Require a logged-in caller, or redirect to the login page.
#[allow(clippy::result_large_err)]
pub fn require_login(caller: &Caller, here: &str) -> Result<(), Response> {
    if caller.is_authenticated() {
        Ok(())
    } else {
        Err(login_redirect(here).into_response())
    }
}

/// Require an admin caller, or redirect to the login page with a notice.
#[allow(clippy::result_large_err)]
pub fn require_admin(caller: &Caller, here: &str) -> Result<(), Response> {
    match caller.require_admin() {
        Ok(_) => Ok(()),
        Err(TicketingError::Unauthorized) => Err(SeeOther::to(format!(
            "/login?next={}",
            urlencoding::encode(here)
        ))
        .notice(Notice::error(ADMIN_REQUIRED))
        .into_response()),
        Err(_) => Err(SeeOther::to("/login")
            .notice(Notice::error(ADMIN_REQUIRED))
            .into_response()),
    }
}
