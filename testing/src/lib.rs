//! # Ticketing Testing
//!
//! Testing utilities shared by the ticketing crates.
//!
//! This crate provides:
//! - A deterministic [`Clock`] implementation
//! - Callers and event fixtures
//! - A [`TestWorld`] builder wiring the engines over an in-memory store
//! - proptest strategies for domain types
//!
//! ## Example
//!
//! ```
//! use ticketing_testing::TestWorld;
//!
//! # tokio_test::block_on(async {
//! let world = TestWorld::new().with_event("Anime Matsuri", 50_000, 1).await;
//! let event = world.events[0].clone();
//! let fan = world.customer("fan@example.com").await;
//!
//! let tx = world.reservations.reserve(event.id, &fan, None).await.unwrap();
//! assert_eq!(tx.amount.minor(), 50_000);
//! # });
//! ```

use chrono::{DateTime, Utc};
use ticketing_core::environment::Clock;

/// Mock implementations of injected dependencies.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use ticketing_testing::mocks::FixedClock;
    /// use ticketing_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse, which cannot happen.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Ready-made callers, drafts and events.
pub mod fixtures {
    use ticketing_core::{Caller, Event, EventDraft, EventId, Identity, Money, UserId};

    /// An authenticated non-admin caller whose user id is not stored
    /// anywhere. Stores refuse to reserve for it; see
    /// [`TestWorld::customer`](crate::TestWorld::customer) for a registered one.
    #[must_use]
    pub fn customer(email: &str) -> Caller {
        Caller::Authenticated(Identity {
            user_id: UserId::new(),
            email: email.to_string(),
            is_admin: false,
        })
    }

    /// An authenticated admin caller with a fresh user id
    #[must_use]
    pub fn admin() -> Caller {
        Caller::Authenticated(Identity {
            user_id: UserId::new(),
            email: "admin@example.com".to_string(),
            is_admin: true,
        })
    }

    /// A valid draft with a generated description
    ///
    /// # Panics
    ///
    /// Panics if `title` is blank or longer than 100 characters.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn draft(title: &str, price: u64, stock: u32) -> EventDraft {
        let price = i64::try_from(price).expect("test price fits in i64");
        EventDraft::new(title, &format!("{title} description"), price, i64::from(stock))
            .expect("fixture draft should be valid")
    }

    /// An event value that is not stored anywhere
    #[must_use]
    pub fn event(title: &str, price: u64, stock: u32) -> Event {
        Event {
            id: EventId::new(),
            title: title.to_string(),
            description: format!("{title} description"),
            price: Money::from_minor(price),
            stock,
        }
    }
}

/// Engines wired over a shared in-memory store.
pub mod world {
    use crate::mocks::test_clock;
    use std::sync::Arc;
    use ticketing_core::{
        Caller, CatalogService, CatalogStore, Event, HistoryView, Identity, InMemoryStore,
        LedgerStore, NewUser, PaymentEngine, ReservationEngine, UserStore,
    };

    /// In-memory test environment.
    #[derive(Clone)]
    pub struct TestWorld {
        /// Backing store, for direct inspection
        pub store: InMemoryStore,
        /// Catalog service
        pub catalog: CatalogService,
        /// Reservation engine (fixed clock)
        pub reservations: ReservationEngine,
        /// Payment engine
        pub payments: PaymentEngine,
        /// History view
        pub history: HistoryView,
        /// Events added through [`TestWorld::with_event`], in order
        pub events: Vec<Event>,
    }

    impl TestWorld {
        /// Create an empty world
        #[must_use]
        pub fn new() -> Self {
            let store = InMemoryStore::new();
            let ledger: Arc<dyn LedgerStore> = Arc::new(store.clone());
            Self {
                catalog: CatalogService::new(Arc::new(store.clone())),
                reservations: ReservationEngine::new(Arc::clone(&ledger), Arc::new(test_clock())),
                payments: PaymentEngine::new(Arc::clone(&ledger)),
                history: HistoryView::new(ledger),
                store,
                events: Vec::new(),
            }
        }

        /// Insert an event directly into the store
        ///
        /// # Panics
        ///
        /// Panics if the in-memory store rejects the insert.
        #[allow(clippy::expect_used)]
        pub async fn with_event(mut self, title: &str, price: u64, stock: u32) -> Self {
            let event = crate::fixtures::event(title, price, stock);
            self.store
                .insert_event(&event)
                .await
                .expect("in-memory insert should succeed");
            self.events.push(event);
            self
        }

        /// Register a non-admin user and return its caller
        ///
        /// # Panics
        ///
        /// Panics if `email` is already registered in this world.
        #[allow(clippy::expect_used)]
        pub async fn customer(&self, email: &str) -> Caller {
            let user = self
                .store
                .create_user(NewUser {
                    first_name: "Test".to_string(),
                    last_name: "Customer".to_string(),
                    email: email.to_string(),
                    password_hash: "unused".to_string(),
                    is_admin: false,
                })
                .await
                .expect("email should be unused in this world");
            Caller::Authenticated(Identity::from(&user))
        }
    }

    impl Default for TestWorld {
        fn default() -> Self {
            Self::new()
        }
    }
}

/// proptest strategies for domain types.
pub mod properties {
    use proptest::prelude::*;
    use ticketing_core::{EventDraft, PaymentMethod};

    /// Any payment method
    pub fn payment_method() -> impl Strategy<Value = PaymentMethod> {
        prop_oneof![
            Just(PaymentMethod::Qris),
            Just(PaymentMethod::BankTransfer),
            Just(PaymentMethod::VirtualAccount),
        ]
    }

    /// Drafts that pass validation
    pub fn valid_draft() -> impl Strategy<Value = EventDraft> {
        ("[A-Za-z][A-Za-z0-9 ]{0,40}", "[a-z]{1,60}", 0i64..10_000_000, 0i64..500).prop_filter_map(
            "draft must validate",
            |(title, description, price, stock)| {
                EventDraft::new(&title, &description, price, stock).ok()
            },
        )
    }
}

pub use mocks::{FixedClock, test_clock};
pub use world::TestWorld;
