//! Per-user transaction history.

use crate::error::Result;
use crate::identity::Caller;
use crate::store::LedgerStore;
use crate::types::TransactionRecord;
use std::sync::Arc;

/// Read-only view over the caller's transactions.
#[derive(Clone)]
pub struct HistoryView {
    ledger: Arc<dyn LedgerStore>,
}

impl HistoryView {
    /// Create a view over a ledger
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self { ledger }
    }

    /// The caller's transactions, newest first, joined with event titles.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::Unauthorized`](crate::TicketingError::Unauthorized)
    /// for anonymous callers.
    pub async fn history(&self, caller: &Caller) -> Result<Vec<TransactionRecord>> {
        let identity = caller.identity()?;
        self.ledger.history(identity.user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::environment::SystemClock;
    use crate::error::TicketingError;
    use crate::memory::test_support::registered;
    use crate::memory::InMemoryStore;
    use crate::reservation::ReservationEngine;
    use crate::store::CatalogStore;
    use crate::types::{Event, EventDraft, EventId};

    async fn stocked(store: &InMemoryStore, title: &str) -> EventId {
        let event = Event::from_draft(
            EventId::new(),
            EventDraft::new(title, "Acara komunitas", 75_000, 5).unwrap(),
        );
        store.insert_event(&event).await.unwrap();
        event.id
    }

    #[tokio::test]
    async fn test_history_is_per_user_and_newest_first() {
        let store = InMemoryStore::new();
        let ledger: Arc<dyn LedgerStore> = Arc::new(store.clone());
        let reservations = ReservationEngine::new(Arc::clone(&ledger), Arc::new(SystemClock));
        let history = HistoryView::new(ledger);

        let matsuri = stocked(&store, "Anime Matsuri").await;
        let konser = stocked(&store, "Konser J-Pop").await;
        let hana = registered(&store, "hana@example.com", false).await;
        let yuki = registered(&store, "yuki@example.com", false).await;

        reservations.reserve(matsuri, &hana, None).await.unwrap();
        reservations.reserve(konser, &yuki, None).await.unwrap();
        reservations.reserve(konser, &hana, None).await.unwrap();

        let titles: Vec<_> = history
            .history(&hana)
            .await
            .unwrap()
            .into_iter()
            .map(|record| record.event_title)
            .collect();
        assert_eq!(titles, vec!["Konser J-Pop", "Anime Matsuri"]);
        assert_eq!(history.history(&yuki).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_anonymous_history_is_unauthorized() {
        let history = HistoryView::new(Arc::new(InMemoryStore::new()));
        assert_eq!(
            history.history(&Caller::Anonymous).await.unwrap_err(),
            TicketingError::Unauthorized
        );
    }
}
