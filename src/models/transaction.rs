use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// A recorded ticket purchase.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub quantity: i32,
    pub total_paid: Decimal,
    pub purchaser_name: String,
    pub purchaser_email: String,
    pub purchaser_phone: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to record one purchase.
#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub user_id: i64,
    pub event_id: i64,
    pub quantity: i32,
    pub total_paid: Decimal,
    pub purchaser_name: String,
    pub purchaser_email: String,
    pub purchaser_phone: String,
    pub notes: String,
}

/// A member's purchase joined with the event it was for.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TicketSummary {
    pub id: i64,
    pub event_id: i64,
    pub quantity: i32,
    pub total_paid: Decimal,
    pub purchaser_name: String,
    pub purchaser_email: String,
    pub purchaser_phone: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub event_name: String,
    pub event_date: NaiveDate,
    pub event_location: String,
}

/// One row of the admin sales table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SaleRecord {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub quantity: i32,
    pub total_paid: Decimal,
    pub purchaser_name: String,
    pub purchaser_email: String,
    pub purchaser_phone: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub buyer_name: String,
    pub event_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, FromRow)]
pub struct SalesTotals {
    pub total_revenue: Decimal,
    pub tickets_sold: i64,
}

impl Default for SalesTotals {
    fn default() -> Self {
        Self {
            total_revenue: Decimal::ZERO,
            tickets_sold: 0,
        }
    }
}
