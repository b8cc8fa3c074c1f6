//! `PostgreSQL` storage for the ticketing system.
//!
//! [`PostgresStore`] implements the catalog, ledger and user store traits
//! from `ticketing-core` on top of a sqlx connection pool.
//!
//! - Reservations lock the event row (`SELECT … FOR UPDATE`), decrement its
//!   stock and insert the transaction in one database transaction.
//! - Status transitions lock the transaction row, then (for a cancel) the
//!   event row. Reservations only ever lock an event row, so lock order is
//!   acyclic.
//! - `CHECK (stock >= 0)` backs the application-level stock check.
//!
//! # Example
//!
//! ```no_run
//! use ticketing_postgres::PostgresStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = sqlx::PgPool::connect("postgres://localhost/ticketing").await?;
//! let store = PostgresStore::new(pool);
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod rows;

use async_trait::async_trait;
use rows::{EventRow, HistoryRow, TransactionRow, UserRow, money_column};
use sqlx::{PgPool, Postgres};
use ticketing_core::{
    CatalogStore, Event, EventDraft, EventId, LedgerStore, NewUser, Result, TicketClaim,
    TicketingError, Transaction, TransactionId, TransactionRecord, Transition, User, UserId,
    UserStore,
};

const EVENT_COLUMNS: &str = "id, title, description, price, stock";
const TRANSACTION_COLUMNS: &str =
    "id, user_id, event_id, amount, status, payment_method, created_at";
const USER_COLUMNS: &str = "id, first_name, last_name, email, password_hash, is_admin";

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> TicketingError {
    move |e| TicketingError::storage(format!("{context}: {e}"))
}

/// sqlx-backed store for every ticketing table.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| TicketingError::storage(format!("Migration failed: {e}")))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    async fn lock_event(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        id: EventId,
    ) -> Result<Event> {
        let row: Option<EventRow> = sqlx::query_as(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 FOR UPDATE"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(db_error("Failed to lock event"))?;

        row.ok_or_else(|| TicketingError::not_found("Event", id))?
            .try_into()
    }

    async fn write_stock(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        event: &Event,
    ) -> Result<()> {
        sqlx::query("UPDATE events SET stock = $2 WHERE id = $1")
            .bind(*event.id.as_uuid())
            .bind(i64::from(event.stock))
            .execute(&mut **tx)
            .await
            .map_err(db_error("Failed to update stock"))?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn list_events(&self) -> Result<Vec<Event>> {
        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list events"))?;

        rows.into_iter().map(Event::try_from).collect()
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>> {
        let row: Option<EventRow> =
            sqlx::query_as(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
                .bind(*id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to get event"))?;

        row.map(Event::try_from).transpose()
    }

    async fn insert_event(&self, event: &Event) -> Result<()> {
        sqlx::query(
            "INSERT INTO events (id, title, description, price, stock) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(*event.id.as_uuid())
        .bind(&event.title)
        .bind(&event.description)
        .bind(money_column(event.price)?)
        .bind(i64::from(event.stock))
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to insert event"))?;
        Ok(())
    }

    async fn update_event(&self, id: EventId, draft: EventDraft) -> Result<Event> {
        let row: Option<EventRow> = sqlx::query_as(&format!(
            "UPDATE events SET title = $2, description = $3, price = $4, stock = $5 \
             WHERE id = $1 RETURNING {EVENT_COLUMNS}"
        ))
        .bind(*id.as_uuid())
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(money_column(draft.price)?)
        .bind(i64::from(draft.stock))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update event"))?;

        row.ok_or_else(|| TicketingError::not_found("Event", id))?
            .try_into()
    }

    async fn delete_event(&self, id: EventId) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;

        // Holding the event lock keeps concurrent reservations out.
        Self::lock_event(&mut tx, id).await?;

        let referenced: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM transactions WHERE event_id = $1)")
                .bind(*id.as_uuid())
                .fetch_one(&mut *tx)
                .await
                .map_err(db_error("Failed to check event references"))?;
        if referenced {
            return Err(TicketingError::validation(
                "Event has transactions and cannot be deleted",
            ));
        }

        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete event"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error("Database ping failed"))?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for PostgresStore {
    async fn claim_ticket(&self, claim: TicketClaim) -> Result<Transaction> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;

        // Dropping `tx` on any early return rolls back.
        let mut event = Self::lock_event(&mut tx, claim.event_id).await?;
        let amount = event.take_ticket()?;
        Self::write_stock(&mut tx, &event).await?;

        let transaction = Transaction::pending(&claim, amount);
        sqlx::query(
            "INSERT INTO transactions \
             (id, user_id, event_id, amount, status, payment_method, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(*transaction.id.as_uuid())
        .bind(*transaction.user_id.as_uuid())
        .bind(*transaction.event_id.as_uuid())
        .bind(money_column(transaction.amount)?)
        .bind(transaction.status.as_str())
        .bind(transaction.payment_method.as_str())
        .bind(transaction.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match &e {
            // The event row is locked above, so the only dangling reference
            // left is the user.
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                TicketingError::not_found("User", transaction.user_id)
            }
            _ => db_error("Failed to insert transaction")(e),
        })?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        tracing::debug!(
            event_id = %event.id,
            remaining = event.stock,
            "Ticket claimed"
        );
        Ok(transaction)
    }

    async fn apply_transition(
        &self,
        id: TransactionId,
        owner: UserId,
        transition: Transition,
    ) -> Result<Transaction> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;

        let row: Option<TransactionRow> = sqlx::query_as(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1 FOR UPDATE"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock transaction"))?;

        let mut transaction: Transaction = row
            .ok_or_else(|| TicketingError::not_found("Transaction", id))?
            .try_into()?;
        let next = transaction.plan(owner, transition)?;

        if transition.releases_ticket() {
            let mut event = Self::lock_event(&mut tx, transaction.event_id).await?;
            event.return_ticket();
            Self::write_stock(&mut tx, &event).await?;
        }

        sqlx::query("UPDATE transactions SET status = $2 WHERE id = $1")
            .bind(*id.as_uuid())
            .bind(next.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to update transaction status"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        transaction.status = next;
        Ok(transaction)
    }

    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let row: Option<TransactionRow> = sqlx::query_as(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to get transaction"))?;

        row.map(Transaction::try_from).transpose()
    }

    async fn history(&self, user_id: UserId) -> Result<Vec<TransactionRecord>> {
        let rows: Vec<HistoryRow> = sqlx::query_as(
            "SELECT t.id, t.user_id, t.event_id, t.amount, t.status, t.payment_method, \
                    t.created_at, e.title AS event_title \
             FROM transactions t \
             JOIN events e ON e.id = t.event_id \
             WHERE t.user_id = $1 \
             ORDER BY t.created_at DESC, t.seq DESC",
        )
        .bind(*user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load transaction history"))?;

        rows.into_iter().map(TransactionRecord::try_from).collect()
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users (id, first_name, last_name, email, password_hash, is_admin) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        ))
        .bind(*UserId::new().as_uuid())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return TicketingError::validation("Email is already registered");
                }
            }
            TicketingError::storage(format!("Failed to create user: {e}"))
        })?;

        Ok(row.into())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to find user"))?;
        Ok(row.map(User::from))
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(*id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to get user"))?;
        Ok(row.map(User::from))
    }

    async fn set_admin(&self, id: UserId, is_admin: bool) -> Result<User> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "UPDATE users SET is_admin = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(*id.as_uuid())
        .bind(is_admin)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update user"))?;

        row.map(User::from)
            .ok_or_else(|| TicketingError::not_found("User", id))
    }
}
