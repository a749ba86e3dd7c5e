//! Persistence for users, events and ticket transactions.
//!
//! Handlers only see the [`Store`] trait. [`PostgresStore`] is the production
//! backend; [`InMemoryStore`] keeps everything in one mutex-guarded map set and
//! backs the integration tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Event, EventInput, NewPurchase, NewUser, SaleRecord, SalesTotals, TicketSummary, Transaction,
    User,
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("email already registered")]
    DuplicateEmail,

    #[error("insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("{0} is still referenced by transactions")]
    InUse(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Reachability check behind `/health/ready`.
    async fn ping(&self) -> StoreResult<()>;

    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user(&self, id: i64) -> StoreResult<Option<User>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn delete_user(&self, id: i64) -> StoreResult<()>;

    async fn list_events(&self) -> StoreResult<Vec<Event>>;
    /// Events whose name contains `query`, ignoring case.
    async fn search_events(&self, query: &str) -> StoreResult<Vec<Event>>;
    async fn find_event(&self, id: i64) -> StoreResult<Option<Event>>;
    async fn create_event(&self, input: EventInput) -> StoreResult<Event>;
    async fn update_event(&self, id: i64, input: EventInput) -> StoreResult<Event>;
    async fn delete_event(&self, id: i64) -> StoreResult<()>;

    /// Take `purchase.quantity` tickets off the event's stock and record the
    /// transaction. Both happen or neither does; stock is checked against the
    /// current value, never a caller snapshot.
    async fn purchase(&self, purchase: NewPurchase) -> StoreResult<Transaction>;

    /// A member's purchases, newest first.
    async fn tickets_for_user(&self, user_id: i64) -> StoreResult<Vec<TicketSummary>>;
    async fn list_sales(&self) -> StoreResult<Vec<SaleRecord>>;
    async fn sales_totals(&self) -> StoreResult<SalesTotals>;
}
