//! Catalog administration.
//!
//! Every handler first checks the caller is an admin; everyone else is
//! sent to the login page with a notice.

use super::{recover, require_admin};
use crate::extractors::CurrentCaller;
use crate::flash::{Flash, Notice, Page, SeeOther};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Form,
};
use serde::{Deserialize, Serialize};
use ticketing_core::{Event, EventDraft, EventId, TicketingError};
use uuid::Uuid;

const ADMIN_EVENTS: &str = "/admin/events";
const ADD_EVENT: &str = "/admin/events/add";

/// Admin event list body.
#[derive(Debug, Serialize)]
pub struct AdminEventsView {
    /// All events
    pub events: Vec<Event>,
}

/// Add/edit form body. `event` is `None` on the add page.
#[derive(Debug, Serialize)]
pub struct EventFormView {
    /// Page heading
    pub title: &'static str,
    /// Event being edited
    pub event: Option<Event>,
}

/// Submitted event fields, as typed.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EventForm {
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Price in rupiah
    pub price: String,
    /// Tickets available
    pub stock: String,
}

impl EventForm {
    fn draft(&self) -> Result<EventDraft, TicketingError> {
        EventDraft::parse(&self.title, &self.description, &self.price, &self.stock)
    }
}

fn edit_path(id: Uuid) -> String {
    format!("/admin/events/edit/{id}")
}

/// `GET /admin/events`
///
/// # Errors
///
/// Redirects non-admins to the login page.
pub async fn list(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    flash: Flash,
) -> Result<Page<AdminEventsView>, Response> {
    require_admin(&caller, ADMIN_EVENTS)?;
    let events = state
        .catalog
        .list()
        .await
        .map_err(|e| recover(e, "/", ADMIN_EVENTS))?;
    Ok(Page::new(AdminEventsView { events }, flash))
}

/// `GET /admin/events/add`
///
/// # Errors
///
/// Redirects non-admins to the login page.
#[allow(clippy::unused_async)]
pub async fn add_page(
    CurrentCaller(caller): CurrentCaller,
    flash: Flash,
) -> Result<Page<EventFormView>, Response> {
    require_admin(&caller, ADD_EVENT)?;
    Ok(Page::new(
        EventFormView {
            title: "Add Event",
            event: None,
        },
        flash,
    ))
}

/// `POST /admin/events/add`
pub async fn add(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    Form(form): Form<EventForm>,
) -> Response {
    if let Err(redirect) = require_admin(&caller, ADD_EVENT) {
        return redirect;
    }
    let draft = match form.draft() {
        Ok(draft) => draft,
        Err(err) => return recover(err, ADD_EVENT, ADD_EVENT),
    };

    match state.catalog.create(&caller, draft).await {
        Ok(_) => SeeOther::to(ADMIN_EVENTS)
            .notice(Notice::success("Event added."))
            .into_response(),
        Err(err) => recover(err, ADD_EVENT, ADD_EVENT),
    }
}

/// `GET /admin/events/edit/:id`
///
/// # Errors
///
/// Redirects non-admins to the login page; 404 for an unknown event.
pub async fn edit_page(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    Path(id): Path<Uuid>,
    flash: Flash,
) -> Result<Page<EventFormView>, Response> {
    let here = edit_path(id);
    require_admin(&caller, &here)?;
    let event = state
        .catalog
        .get(EventId::from_uuid(id))
        .await
        .map_err(|e| recover(e, ADMIN_EVENTS, &here))?;
    Ok(Page::new(
        EventFormView {
            title: "Edit Event",
            event: Some(event),
        },
        flash,
    ))
}

/// `POST /admin/events/edit/:id`
pub async fn edit(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    Path(id): Path<Uuid>,
    Form(form): Form<EventForm>,
) -> Response {
    let here = edit_path(id);
    if let Err(redirect) = require_admin(&caller, &here) {
        return redirect;
    }
    let draft = match form.draft() {
        Ok(draft) => draft,
        Err(err) => return recover(err, &here, &here),
    };

    match state
        .catalog
        .update(&caller, EventId::from_uuid(id), draft)
        .await
    {
        Ok(_) => SeeOther::to(ADMIN_EVENTS)
            .notice(Notice::success("Event updated."))
            .into_response(),
        Err(err) => recover(err, &here, &here),
    }
}

/// `POST /admin/events/delete/:id`
///
/// Events with transactions cannot be deleted; the admin is sent back to
/// the list with a notice.
pub async fn delete(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(redirect) = require_admin(&caller, ADMIN_EVENTS) {
        return redirect;
    }
    match state.catalog.delete(&caller, EventId::from_uuid(id)).await {
        Ok(()) => SeeOther::to(ADMIN_EVENTS)
            .notice(Notice::success("Event deleted."))
            .into_response(),
        Err(err) => recover(err, ADMIN_EVENTS, ADMIN_EVENTS),
    }
}
