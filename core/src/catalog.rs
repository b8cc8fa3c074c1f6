//! Event catalog: public reads and admin-gated mutation.

use crate::error::{Result, TicketingError};
use crate::identity::Caller;
use crate::metrics;
use crate::store::CatalogStore;
use crate::types::{Event, EventDraft, EventId};
use std::sync::Arc;

/// Catalog operations over a [`CatalogStore`].
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    /// Create a service over a store
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// All events, in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::Storage`] if the store fails.
    pub async fn list(&self) -> Result<Vec<Event>> {
        self.store.list_events().await
    }

    /// A single event.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::NotFound`] for an unknown id.
    pub async fn get(&self, id: EventId) -> Result<Event> {
        self.store
            .get_event(id)
            .await?
            .ok_or_else(|| TicketingError::not_found("Event", id))
    }

    /// Add an event to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::Unauthorized`] or
    /// [`TicketingError::Forbidden`] unless the caller is an admin.
    pub async fn create(&self, caller: &Caller, draft: EventDraft) -> Result<Event> {
        let admin = caller.require_admin()?;
        let event = Event::from_draft(EventId::new(), draft);
        self.store.insert_event(&event).await?;
        metrics::record_event_created();
        tracing::info!(event_id = %event.id, admin = %admin.email, title = %event.title, "Event created");
        Ok(event)
    }

    /// Overwrite an event's catalog fields, including its stock.
    ///
    /// Transactions already created keep the amount they were charged.
    ///
    /// # Errors
    ///
    /// Admin check as in [`CatalogService::create`], plus
    /// [`TicketingError::NotFound`] for an unknown id.
    pub async fn update(&self, caller: &Caller, id: EventId, draft: EventDraft) -> Result<Event> {
        let admin = caller.require_admin()?;
        let event = self.store.update_event(id, draft).await?;
        tracing::info!(event_id = %id, admin = %admin.email, stock = event.stock, "Event updated");
        Ok(event)
    }

    /// Remove an event.
    ///
    /// # Errors
    ///
    /// Admin check as in [`CatalogService::create`], plus
    /// [`TicketingError::NotFound`] for an unknown id and
    /// [`TicketingError::Validation`] when transactions reference the event.
    pub async fn delete(&self, caller: &Caller, id: EventId) -> Result<()> {
        let admin = caller.require_admin()?;
        self.store.delete_event(id).await?;
        tracing::info!(event_id = %id, admin = %admin.email, "Event deleted");
        Ok(())
    }

    /// Check that the backing store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::Storage`] if it is not.
    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }
}
