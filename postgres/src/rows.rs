//! Row types and their conversion into domain types.

use chrono::{DateTime, Utc};
use ticketing_core::{
    Event, EventId, Money, TicketingError, Transaction, TransactionId, TransactionRecord, User,
    UserId,
};
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct EventRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub stock: i64,
}

impl TryFrom<EventRow> for Event {
    type Error = TicketingError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EventId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            price: Money::from_minor(column_u64("events.price", row.price)?),
            stock: u32::try_from(row.stock)
                .map_err(|_| TicketingError::storage(format!("events.stock out of range: {}", row.stock)))?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password_hash,
            is_admin: row.is_admin,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TransactionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub amount: i64,
    pub status: String,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = TicketingError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TransactionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            event_id: EventId::from_uuid(row.event_id),
            amount: Money::from_minor(column_u64("transactions.amount", row.amount)?),
            status: row.status.parse()?,
            payment_method: row
                .payment_method
                .parse()
                .map_err(|e: TicketingError| TicketingError::storage(e.to_string()))?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct HistoryRow {
    #[sqlx(flatten)]
    pub transaction: TransactionRow,
    pub event_title: String,
}

impl TryFrom<HistoryRow> for TransactionRecord {
    type Error = TicketingError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            transaction: row.transaction.try_into()?,
            event_title: row.event_title,
        })
    }
}

fn column_u64(column: &str, value: i64) -> Result<u64, TicketingError> {
    u64::try_from(value)
        .map_err(|_| TicketingError::storage(format!("{column} is negative: {value}")))
}

/// Convert a domain amount into a `BIGINT` column value.
pub(crate) fn money_column(money: Money) -> Result<i64, TicketingError> {
    i64::try_from(money.minor())
        .map_err(|_| TicketingError::validation("Amount is too large to store"))
}
