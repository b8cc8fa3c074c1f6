//! Public pages: home, event list, event detail, about and contact.

use crate::error::AppError;
use crate::flash::{Flash, Page};
use crate::state::AppState;
use axum::extract::{Path, State};
use serde::Serialize;
use ticketing_core::{Event, EventId};
use uuid::Uuid;

/// A list of events.
#[derive(Debug, Serialize)]
pub struct EventsView {
    /// Page heading
    pub title: &'static str,
    /// Events in creation order
    pub events: Vec<Event>,
}

/// One event.
#[derive(Debug, Serialize)]
pub struct EventView {
    /// The event
    pub event: Event,
    /// Whether a ticket can still be bought
    pub available: bool,
}

/// Static informational page.
#[derive(Debug, Serialize)]
pub struct InfoView {
    /// Page heading
    pub title: &'static str,
    /// Page text
    pub body: &'static str,
}

/// `GET /`
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn home(State(state): State<AppState>, flash: Flash) -> Result<Page<EventsView>, AppError> {
    let events = state.catalog.list().await?;
    Ok(Page::new(
        EventsView {
            title: "Home",
            events,
        },
        flash,
    ))
}

/// `GET /events`
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn events(
    State(state): State<AppState>,
    flash: Flash,
) -> Result<Page<EventsView>, AppError> {
    let events = state.catalog.list().await?;
    Ok(Page::new(
        EventsView {
            title: "Events",
            events,
        },
        flash,
    ))
}

/// `GET /event/:id`
///
/// # Errors
///
/// Returns 404 for an unknown event.
pub async fn event_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    flash: Flash,
) -> Result<Page<EventView>, AppError> {
    let event = state.catalog.get(EventId::from_uuid(id)).await?;
    let available = event.stock > 0;
    Ok(Page::new(EventView { event, available }, flash))
}

/// `GET /tentang`
#[allow(clippy::unused_async)]
pub async fn about(flash: Flash) -> Page<InfoView> {
    Page::new(
        InfoView {
            title: "Tentang Kami",
            body: "We sell tickets for anime, manga and J-pop events. Pick an event, \
                   check out, confirm your payment and your ticket is ready.",
        },
        flash,
    )
}

/// `GET /kontak`
#[allow(clippy::unused_async)]
pub async fn contact(flash: Flash) -> Page<InfoView> {
    Page::new(
        InfoView {
            title: "Kontak",
            body: "Questions about an order? Write to support@ticketing.example \
                   with your transaction id.",
        },
        flash,
    )
}
