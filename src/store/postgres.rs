use async_trait::async_trait;
use sqlx::postgres::PgPool;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    Event, EventInput, NewPurchase, NewUser, SaleRecord, SalesTotals, TicketSummary, Transaction,
    User,
};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";
const EVENT_COLUMNS: &str =
    "id, name, event_date AS date, location, price, stock, description, image";
const TRANSACTION_COLUMNS: &str = "id, user_id, event_id, quantity, total_paid, purchaser_name, \
     purchaser_email, purchaser_phone, notes, created_at";

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn violates(err: &sqlx::Error, code: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(code),
        _ => false,
    }
}

/// Escape LIKE wildcards so user input is matched literally.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl Store for PostgresStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if violates(&e, UNIQUE_VIOLATION) {
                    StoreError::DuplicateEmail
                } else {
                    StoreError::Database(e)
                }
            })
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn delete_user(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if violates(&e, FOREIGN_KEY_VIOLATION) {
                    StoreError::InUse("User")
                } else {
                    StoreError::Database(e)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("User"));
        }
        Ok(())
    }

    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY id");
        let events = sqlx::query_as::<_, Event>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn search_events(&self, query: &str) -> StoreResult<Vec<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE name ILIKE $1 ORDER BY id");
        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(like_pattern(query))
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn find_event(&self, id: i64) -> StoreResult<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn create_event(&self, input: EventInput) -> StoreResult<Event> {
        let sql = format!(
            "INSERT INTO events (name, event_date, location, price, stock, description, image) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {EVENT_COLUMNS}"
        );
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(&input.name)
            .bind(input.date)
            .bind(&input.location)
            .bind(input.price)
            .bind(input.stock)
            .bind(&input.description)
            .bind(&input.image)
            .fetch_one(&self.pool)
            .await?;
        Ok(event)
    }

    async fn update_event(&self, id: i64, input: EventInput) -> StoreResult<Event> {
        let sql = format!(
            "UPDATE events SET name = $1, event_date = $2, location = $3, price = $4, \
             stock = $5, description = $6, image = $7 WHERE id = $8 RETURNING {EVENT_COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&sql)
            .bind(&input.name)
            .bind(input.date)
            .bind(&input.location)
            .bind(input.price)
            .bind(input.stock)
            .bind(&input.description)
            .bind(&input.image)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("Event"))
    }

    async fn delete_event(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if violates(&e, FOREIGN_KEY_VIOLATION) {
                    StoreError::InUse("Event")
                } else {
                    StoreError::Database(e)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Event"));
        }
        Ok(())
    }

    async fn purchase(&self, purchase: NewPurchase) -> StoreResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        let remaining: Option<(i32,)> = sqlx::query_as(
            "UPDATE events SET stock = stock - $1 WHERE id = $2 AND stock >= $1 RETURNING stock",
        )
        .bind(purchase.quantity)
        .bind(purchase.event_id)
        .fetch_optional(&mut *tx)
        .await?;

        if remaining.is_none() {
            let current: Option<(i32,)> = sqlx::query_as("SELECT stock FROM events WHERE id = $1")
                .bind(purchase.event_id)
                .fetch_optional(&mut *tx)
                .await?;

            // Dropping `tx` rolls back
            return Err(match current {
                Some((available,)) => StoreError::InsufficientStock {
                    available,
                    requested: purchase.quantity,
                },
                None => StoreError::NotFound("Event"),
            });
        }

        let sql = format!(
            "INSERT INTO transactions (user_id, event_id, quantity, total_paid, purchaser_name, \
             purchaser_email, purchaser_phone, notes) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {TRANSACTION_COLUMNS}"
        );
        let transaction = sqlx::query_as::<_, Transaction>(&sql)
            .bind(purchase.user_id)
            .bind(purchase.event_id)
            .bind(purchase.quantity)
            .bind(purchase.total_paid)
            .bind(&purchase.purchaser_name)
            .bind(&purchase.purchaser_email)
            .bind(&purchase.purchaser_phone)
            .bind(&purchase.notes)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(transaction)
    }

    async fn tickets_for_user(&self, user_id: i64) -> StoreResult<Vec<TicketSummary>> {
        let tickets = sqlx::query_as::<_, TicketSummary>(
            "SELECT t.id, t.event_id, t.quantity, t.total_paid, t.purchaser_name, \
                    t.purchaser_email, t.purchaser_phone, t.notes, t.created_at, \
                    e.name AS event_name, e.event_date, e.location AS event_location \
             FROM transactions t \
             JOIN events e ON t.event_id = e.id \
             WHERE t.user_id = $1 \
             ORDER BY t.created_at DESC, t.id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tickets)
    }

    async fn list_sales(&self) -> StoreResult<Vec<SaleRecord>> {
        let sales = sqlx::query_as::<_, SaleRecord>(
            "SELECT t.id, t.user_id, t.event_id, t.quantity, t.total_paid, t.purchaser_name, \
                    t.purchaser_email, t.purchaser_phone, t.notes, t.created_at, \
                    u.name AS buyer_name, e.name AS event_name \
             FROM transactions t \
             JOIN users u ON t.user_id = u.id \
             JOIN events e ON t.event_id = e.id \
             ORDER BY t.created_at DESC, t.id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(sales)
    }

    async fn sales_totals(&self) -> StoreResult<SalesTotals> {
        let totals = sqlx::query_as::<_, SalesTotals>(
            "SELECT COALESCE(SUM(total_paid), 0) AS total_revenue, \
                    COALESCE(SUM(quantity), 0)::BIGINT AS tickets_sold \
             FROM transactions",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(totals)
    }
}
