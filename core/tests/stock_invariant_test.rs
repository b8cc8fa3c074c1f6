//! Property tests for stock accounting.
//!
//! Random sequences of reserve, confirm, cancel (by owners and strangers) and
//! admin price edits must keep the event's stock equal to its initial stock
//! minus the tickets still held by non-failed transactions.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)] // Test code can use unwrap/expect

use proptest::prelude::*;
use std::sync::Arc;
use ticketing_core::{
    Caller, CatalogService, EventDraft, Identity, InMemoryStore, LedgerStore, Money, NewUser,
    PaymentEngine, ReservationEngine, SystemClock, TicketingError, TransactionId,
    TransactionStatus, UserStore,
};

#[derive(Clone, Debug)]
enum Op {
    Reserve { user: usize },
    Confirm { tx: usize, user: usize },
    Cancel { tx: usize, user: usize },
    Reprice { price: u32 },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..3usize).prop_map(|user| Op::Reserve { user }),
        2 => (0..16usize, 0..3usize).prop_map(|(tx, user)| Op::Confirm { tx, user }),
        2 => (0..16usize, 0..3usize).prop_map(|(tx, user)| Op::Cancel { tx, user }),
        1 => (0..100_000u32).prop_map(|price| Op::Reprice { price }),
    ]
}

async fn caller(store: &InMemoryStore, n: usize, is_admin: bool) -> Caller {
    let user = store
        .create_user(NewUser {
            first_name: "User".to_string(),
            last_name: n.to_string(),
            email: format!("user{n}@example.com"),
            password_hash: "unused".to_string(),
            is_admin,
        })
        .await
        .unwrap();
    Caller::Authenticated(Identity::from(&user))
}

async fn run(initial_stock: u32, ops: Vec<Op>) {
    let store = InMemoryStore::new();
    let ledger: Arc<dyn LedgerStore> = Arc::new(store.clone());
    let catalog = CatalogService::new(Arc::new(store.clone()));
    let reservations = ReservationEngine::new(Arc::clone(&ledger), Arc::new(SystemClock));
    let payments = PaymentEngine::new(ledger);

    let admin = caller(&store, 0, true).await;
    let mut users = Vec::new();
    for n in 1..=3 {
        users.push(caller(&store, n, false).await);
    }

    let draft = EventDraft::new("Festival", "Festival anime", 150_000, i64::from(initial_stock))
        .unwrap();
    let event = catalog.create(&admin, draft).await.unwrap();
    let mut price = event.price;
    let mut created: Vec<(TransactionId, Money)> = Vec::new();

    for op in ops {
        let stock_before = catalog.get(event.id).await.unwrap().stock;
        match op {
            Op::Reserve { user } => match reservations.reserve(event.id, &users[user], None).await {
                Ok(tx) => {
                    assert_eq!(tx.amount, price);
                    created.push((tx.id, tx.amount));
                }
                Err(TicketingError::OutOfStock { .. }) => assert_eq!(stock_before, 0),
                Err(other) => panic!("unexpected reserve error: {other}"),
            },
            Op::Confirm { tx, user } => {
                if let Some((id, _)) = created.get(tx) {
                    let _ = payments.confirm(*id, &users[user]).await;
                }
            }
            Op::Cancel { tx, user } => {
                if let Some((id, _)) = created.get(tx) {
                    let _ = payments.cancel(*id, &users[user]).await;
                }
            }
            Op::Reprice { price: new_price } => {
                let draft = EventDraft::new(
                    "Festival",
                    "Festival anime",
                    i64::from(new_price),
                    i64::from(stock_before),
                )
                .unwrap();
                price = catalog.update(&admin, event.id, draft).await.unwrap().price;
            }
        }

        let mut held = 0u32;
        for (id, amount) in &created {
            let stored = store.get_transaction(*id).await.unwrap().unwrap();
            assert_eq!(stored.amount, *amount, "amount is frozen at creation");
            if stored.status != TransactionStatus::Failed {
                held += 1;
            }
        }
        let stock = catalog.get(event.id).await.unwrap().stock;
        assert_eq!(stock + held, initial_stock);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn stock_matches_held_tickets(
        initial_stock in 0u32..5,
        ops in prop::collection::vec(op(), 0..40),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(run(initial_stock, ops));
    }
}
