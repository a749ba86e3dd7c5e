use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    Event, EventInput, NewPurchase, NewUser, SaleRecord, SalesTotals, TicketSummary, Transaction,
    User,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    events: BTreeMap<i64, Event>,
    transactions: BTreeMap<i64, Transaction>,
    next_user_id: i64,
    next_event_id: i64,
    next_transaction_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

/// Process-local store with the same semantics as the PostgreSQL backend.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // No write path can panic between mutations, so a poisoned lock is still consistent
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of recorded transactions.
    pub fn transaction_count(&self) -> usize {
        self.tables().transactions.len()
    }
}

fn to_event(id: i64, input: EventInput) -> Event {
    Event {
        id,
        name: input.name,
        date: input.date,
        location: input.location,
        price: input.price,
        stock: input.stock,
        description: input.description,
        image: input.image,
    }
}

fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<Utc>, i64)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl Store for InMemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables();
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let id = Tables::next_id(&mut tables.next_user_id);
        let created = User {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        tables.users.insert(id, created.clone());
        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.tables().users.get(&id).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.tables().users.values().cloned().collect())
    }

    async fn delete_user(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables();
        if !tables.users.contains_key(&id) {
            return Err(StoreError::NotFound("User"));
        }
        if tables.transactions.values().any(|t| t.user_id == id) {
            return Err(StoreError::InUse("User"));
        }
        tables.users.remove(&id);
        Ok(())
    }

    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        Ok(self.tables().events.values().cloned().collect())
    }

    async fn search_events(&self, query: &str) -> StoreResult<Vec<Event>> {
        Ok(self
            .tables()
            .events
            .values()
            .filter(|e| e.name_matches(query))
            .cloned()
            .collect())
    }

    async fn find_event(&self, id: i64) -> StoreResult<Option<Event>> {
        Ok(self.tables().events.get(&id).cloned())
    }

    async fn create_event(&self, input: EventInput) -> StoreResult<Event> {
        let mut tables = self.tables();
        let id = Tables::next_id(&mut tables.next_event_id);
        let event = to_event(id, input);
        tables.events.insert(id, event.clone());
        Ok(event)
    }

    async fn update_event(&self, id: i64, input: EventInput) -> StoreResult<Event> {
        let mut tables = self.tables();
        let slot = tables
            .events
            .get_mut(&id)
            .ok_or(StoreError::NotFound("Event"))?;
        *slot = to_event(id, input);
        Ok(slot.clone())
    }

    async fn delete_event(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables();
        if !tables.events.contains_key(&id) {
            return Err(StoreError::NotFound("Event"));
        }
        if tables.transactions.values().any(|t| t.event_id == id) {
            return Err(StoreError::InUse("Event"));
        }
        tables.events.remove(&id);
        Ok(())
    }

    async fn purchase(&self, purchase: NewPurchase) -> StoreResult<Transaction> {
        let mut tables = self.tables();

        let event = tables
            .events
            .get_mut(&purchase.event_id)
            .ok_or(StoreError::NotFound("Event"))?;
        if !event.has_stock_for(purchase.quantity) {
            return Err(StoreError::InsufficientStock {
                available: event.stock,
                requested: purchase.quantity,
            });
        }
        event.stock -= purchase.quantity;

        let id = Tables::next_id(&mut tables.next_transaction_id);
        let transaction = Transaction {
            id,
            user_id: purchase.user_id,
            event_id: purchase.event_id,
            quantity: purchase.quantity,
            total_paid: purchase.total_paid,
            purchaser_name: purchase.purchaser_name,
            purchaser_email: purchase.purchaser_email,
            purchaser_phone: purchase.purchaser_phone,
            notes: purchase.notes,
            created_at: Utc::now(),
        };
        tables.transactions.insert(id, transaction.clone());
        Ok(transaction)
    }

    async fn tickets_for_user(&self, user_id: i64) -> StoreResult<Vec<TicketSummary>> {
        let tables = self.tables();
        let mut tickets: Vec<TicketSummary> = tables
            .transactions
            .values()
            .filter(|t| t.user_id == user_id)
            .filter_map(|t| {
                let event = tables.events.get(&t.event_id)?;
                Some(TicketSummary {
                    id: t.id,
                    event_id: t.event_id,
                    quantity: t.quantity,
                    total_paid: t.total_paid,
                    purchaser_name: t.purchaser_name.clone(),
                    purchaser_email: t.purchaser_email.clone(),
                    purchaser_phone: t.purchaser_phone.clone(),
                    notes: t.notes.clone(),
                    created_at: t.created_at,
                    event_name: event.name.clone(),
                    event_date: event.date,
                    event_location: event.location.clone(),
                })
            })
            .collect();
        newest_first(&mut tickets, |t| (t.created_at, t.id));
        Ok(tickets)
    }

    async fn list_sales(&self) -> StoreResult<Vec<SaleRecord>> {
        let tables = self.tables();
        let mut sales: Vec<SaleRecord> = tables
            .transactions
            .values()
            .filter_map(|t| {
                let buyer = tables.users.get(&t.user_id)?;
                let event = tables.events.get(&t.event_id)?;
                Some(SaleRecord {
                    id: t.id,
                    user_id: t.user_id,
                    event_id: t.event_id,
                    quantity: t.quantity,
                    total_paid: t.total_paid,
                    purchaser_name: t.purchaser_name.clone(),
                    purchaser_email: t.purchaser_email.clone(),
                    purchaser_phone: t.purchaser_phone.clone(),
                    notes: t.notes.clone(),
                    created_at: t.created_at,
                    buyer_name: buyer.name.clone(),
                    event_name: event.name.clone(),
                })
            })
            .collect();
        newest_first(&mut sales, |s| (s.created_at, s.id));
        Ok(sales)
    }

    async fn sales_totals(&self) -> StoreResult<SalesTotals> {
        let tables = self.tables();
        Ok(tables
            .transactions
            .values()
            .fold(SalesTotals::default(), |mut acc, t| {
                acc.total_revenue += t.total_paid;
                acc.tickets_sold += i64::from(t.quantity);
                acc
            }))
    }
}
