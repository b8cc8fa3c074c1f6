//! Domain types for the ticketing system.
//!
//! Entities live in independent id-keyed tables. A [`Transaction`] refers to
//! its [`User`] and [`Event`] by id only; relationships are resolved through
//! explicit store lookups, never through embedded references.

use crate::error::{Result, TicketingError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random `EventId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `EventId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a user
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random `UserId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `UserId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a ticket transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Creates a new random `TransactionId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `TransactionId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Value Objects
// ============================================================================

/// Monetary amount in the smallest currency unit (no fractional part).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Creates a `Money` value from an amount in the smallest currency unit
    #[must_use]
    pub const fn from_minor(amount: u64) -> Self {
        Self(amount)
    }

    /// Amount in the smallest currency unit
    #[must_use]
    pub const fn minor(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the customer intends to settle a transaction.
///
/// Settlement is a manual self-confirmation; the method is informational.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// QR code payment (default)
    #[default]
    Qris,
    /// Manual bank transfer
    BankTransfer,
    /// Bank virtual account
    VirtualAccount,
}

impl PaymentMethod {
    /// Storage representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Qris => "qris",
            Self::BankTransfer => "bank_transfer",
            Self::VirtualAccount => "virtual_account",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = TicketingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "qris" => Ok(Self::Qris),
            "bank_transfer" => Ok(Self::BankTransfer),
            "virtual_account" => Ok(Self::VirtualAccount),
            other => Err(TicketingError::validation(format!(
                "Unknown payment method: {other}"
            ))),
        }
    }
}

// ============================================================================
// Transaction State Machine
// ============================================================================

/// Lifecycle status of a transaction.
///
/// ```text
/// Pending ──confirm──▶ Paid
///    │
///    └────cancel────▶ Failed
/// ```
///
/// `Paid` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Ticket is held, awaiting confirmation
    Pending,
    /// Customer confirmed payment
    Paid,
    /// Customer cancelled; the ticket went back to stock
    Failed,
}

impl TransactionStatus {
    /// Storage representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Failed => "Failed",
        }
    }

    /// Whether no further transition is possible
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Failed)
    }

    /// Apply a transition, returning the resulting status.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::InvalidStateTransition`] unless the current
    /// status is `Pending`.
    pub const fn apply(self, transition: Transition) -> Result<Self> {
        match self {
            Self::Pending => Ok(transition.target()),
            Self::Paid | Self::Failed => Err(TicketingError::InvalidStateTransition {
                from: self,
                to: transition.target(),
            }),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = TicketingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            "Failed" => Ok(Self::Failed),
            other => Err(TicketingError::storage(format!(
                "Invalid transaction status: {other}"
            ))),
        }
    }
}

/// A user-initiated status change on a pending transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transition {
    /// Mark the transaction as paid
    Confirm,
    /// Abandon the transaction and release the ticket
    Cancel,
}

impl Transition {
    /// Status reached when the transition succeeds
    #[must_use]
    pub const fn target(&self) -> TransactionStatus {
        match self {
            Self::Confirm => TransactionStatus::Paid,
            Self::Cancel => TransactionStatus::Failed,
        }
    }

    /// Whether a successful transition gives the ticket back to the event
    #[must_use]
    pub const fn releases_ticket(&self) -> bool {
        matches!(self, Self::Cancel)
    }
}

// ============================================================================
// Entities
// ============================================================================

/// Maximum length of an event title
pub const MAX_TITLE_LEN: usize = 100;

/// A ticketed occasion with a price and a finite stock of tickets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event identifier
    pub id: EventId,
    /// Title shown in listings
    pub title: String,
    /// Long description
    pub description: String,
    /// Price of one ticket
    pub price: Money,
    /// Tickets still available
    pub stock: u32,
}

impl Event {
    /// Create an event from a validated draft
    #[must_use]
    pub fn from_draft(id: EventId, draft: EventDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            price: draft.price,
            stock: draft.stock,
        }
    }

    /// Overwrite the catalog fields with a validated draft
    pub fn apply_draft(&mut self, draft: EventDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.price = draft.price;
        self.stock = draft.stock;
    }

    /// Take one ticket out of stock, returning the price to charge.
    ///
    /// Callers must hold the event exclusively (row lock or mutex) for the
    /// whole check-and-claim.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::OutOfStock`] when no ticket is left; the
    /// event is not modified.
    pub const fn take_ticket(&mut self) -> Result<Money> {
        match self.stock.checked_sub(1) {
            Some(remaining) => {
                self.stock = remaining;
                Ok(self.price)
            }
            None => Err(TicketingError::OutOfStock { event_id: self.id }),
        }
    }

    /// Put one ticket back into stock
    pub const fn return_ticket(&mut self) {
        self.stock = self.stock.saturating_add(1);
    }
}

/// Validated catalog fields for creating or editing an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Ticket price
    pub price: Money,
    /// Tickets available
    pub stock: u32,
}

impl EventDraft {
    /// Validate raw catalog fields.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::Validation`] when the title or description
    /// is blank, the title is too long, or price/stock are negative or out
    /// of range.
    pub fn new(title: &str, description: &str, price: i64, stock: i64) -> Result<Self> {
        let title = title.trim();
        let description = description.trim();

        if title.is_empty() {
            return Err(TicketingError::validation("Title is required"));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(TicketingError::validation(format!(
                "Title must be at most {MAX_TITLE_LEN} characters"
            )));
        }
        if description.is_empty() {
            return Err(TicketingError::validation("Description is required"));
        }
        let price = u64::try_from(price)
            .map_err(|_| TicketingError::validation("Price cannot be negative"))?;
        let stock = u32::try_from(stock)
            .map_err(|_| TicketingError::validation("Stock must be between 0 and 4294967295"))?;

        Ok(Self {
            title: title.to_string(),
            description: description.to_string(),
            price: Money::from_minor(price),
            stock,
        })
    }

    /// Validate catalog fields submitted as text (admin form).
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::Validation`] when price or stock is not a
    /// whole number, or when [`EventDraft::new`] rejects the values.
    pub fn parse(title: &str, description: &str, price: &str, stock: &str) -> Result<Self> {
        let price: i64 = price
            .trim()
            .parse()
            .map_err(|_| TicketingError::validation("Price must be a whole number"))?;
        let stock: i64 = stock
            .trim()
            .parse()
            .map_err(|_| TicketingError::validation("Stock must be a whole number"))?;
        Self::new(title, description, price, stock)
    }
}

/// A registered account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier
    pub id: UserId,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Login email, unique and lowercase
    pub email: String,
    /// PHC-formatted password hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether the user may manage the catalog
    pub is_admin: bool,
}

/// Account fields for a new user, already validated and hashed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Login email, normalized to lowercase
    pub email: String,
    /// PHC-formatted password hash
    pub password_hash: String,
    /// Whether the user may manage the catalog
    pub is_admin: bool,
}

/// One user's attempt to acquire one ticket for one event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction identifier
    pub id: TransactionId,
    /// Owner of the transaction
    pub user_id: UserId,
    /// Event the ticket belongs to
    pub event_id: EventId,
    /// Event price at creation time; never changes afterwards
    pub amount: Money,
    /// Lifecycle status
    pub status: TransactionStatus,
    /// Chosen settlement method
    pub payment_method: PaymentMethod,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Build the pending transaction for a successful ticket claim
    #[must_use]
    pub const fn pending(claim: &TicketClaim, amount: Money) -> Self {
        Self {
            id: claim.transaction_id,
            user_id: claim.user_id,
            event_id: claim.event_id,
            amount,
            status: TransactionStatus::Pending,
            payment_method: claim.payment_method,
            created_at: claim.requested_at,
        }
    }

    /// Check that `user_id` owns this transaction.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::Forbidden`] for any other user.
    pub fn ensure_owned_by(&self, user_id: UserId) -> Result<()> {
        if self.user_id == user_id {
            Ok(())
        } else {
            Err(TicketingError::Forbidden(
                "You do not have access to this transaction".to_string(),
            ))
        }
    }

    /// Decide the status a transition by `owner` would produce.
    ///
    /// Pure decision shared by every store implementation; the caller
    /// persists the result.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::Forbidden`] when `owner` does not own the
    /// transaction, or [`TicketingError::InvalidStateTransition`] when the
    /// transaction is no longer pending.
    pub fn plan(&self, owner: UserId, transition: Transition) -> Result<TransactionStatus> {
        self.ensure_owned_by(owner)?;
        self.status.apply(transition)
    }
}

/// Request to claim one ticket, produced by the reservation engine and
/// executed atomically by a [`LedgerStore`](crate::store::LedgerStore).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TicketClaim {
    /// Identifier the new transaction will get
    pub transaction_id: TransactionId,
    /// Event to claim from
    pub event_id: EventId,
    /// Claiming user
    pub user_id: UserId,
    /// Chosen settlement method
    pub payment_method: PaymentMethod,
    /// Clock reading at request time
    pub requested_at: DateTime<Utc>,
}

/// History row: a transaction plus the title of its event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// The transaction
    #[serde(flatten)]
    pub transaction: Transaction,
    /// Title of the referenced event
    pub event_title: String,
}
