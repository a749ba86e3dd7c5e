//! Ticket purchase: pricing a quote, then committing the sale.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Event, NewPurchase, SessionUser, Transaction};
use crate::store::Store;
use crate::utils::error::AppError;

#[derive(Debug, Deserialize)]
pub struct QuoteForm {
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub quantity: i32,
    pub purchaser_name: Option<String>,
    pub purchaser_email: Option<String>,
    pub purchaser_phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutQuote {
    pub event: Event,
    pub quantity: i32,
    pub total: Decimal,
}

fn validate_quantity(quantity: i32) -> Result<(), AppError> {
    if quantity < 1 {
        return Err(AppError::ValidationError(
            "Ticket quantity must be at least 1.".to_string(),
        ));
    }
    Ok(())
}

async fn sellable_event(store: &dyn Store, event_id: i64, quantity: i32) -> Result<Event, AppError> {
    validate_quantity(quantity)?;

    let event = store
        .find_event(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found.".to_string()))?;

    if !event.has_stock_for(quantity) {
        return Err(AppError::Conflict("Not enough tickets in stock.".to_string()));
    }
    Ok(event)
}

/// Price a purchase without touching stock.
pub async fn quote(store: &dyn Store, event_id: i64, quantity: i32) -> Result<CheckoutQuote, AppError> {
    let event = sellable_event(store, event_id, quantity).await?;
    let total = event.total_for(quantity)?;
    Ok(CheckoutQuote {
        event,
        quantity,
        total,
    })
}

fn or_default(value: Option<String>, fallback: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Sell `form.quantity` tickets to `buyer`. Purchaser contact details fall
/// back to the buyer's own account when left blank.
pub async fn checkout(
    store: &dyn Store,
    buyer: &SessionUser,
    event_id: i64,
    form: CheckoutForm,
) -> Result<Transaction, AppError> {
    // The session outlives an account deleted by an admin
    if store.find_user(buyer.id).await?.is_none() {
        return Err(AppError::AuthError("Please log in first.".to_string()));
    }

    let event = sellable_event(store, event_id, form.quantity).await?;
    let total_paid = event.total_for(form.quantity)?;

    let transaction = store
        .purchase(NewPurchase {
            user_id: buyer.id,
            event_id: event.id,
            quantity: form.quantity,
            total_paid,
            purchaser_name: or_default(form.purchaser_name, &buyer.name),
            purchaser_email: or_default(form.purchaser_email, &buyer.email),
            purchaser_phone: or_default(form.purchaser_phone, ""),
            notes: or_default(form.notes, ""),
        })
        .await?;

    tracing::info!(
        transaction_id = transaction.id,
        event_id = event.id,
        user_id = buyer.id,
        quantity = transaction.quantity,
        "Tickets purchased"
    );
    Ok(transaction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventInput, NewUser, Role};
    use crate::store::InMemoryStore;
    use chrono::NaiveDate;

    async fn setup(stock: i32) -> (InMemoryStore, SessionUser, Event) {
        let store = InMemoryStore::new();
        let user = store
            .create_user(NewUser {
                name: "Dewi".to_string(),
                email: "dewi@example.com".to_string(),
                password_hash: "hash".to_string(),
                role: Role::Member,
            })
            .await
            .unwrap();
        let event = store
            .create_event(EventInput {
                name: "Pestapora".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 9, 20).unwrap(),
                location: "JIExpo".to_string(),
                price: Decimal::new(12_500, 2),
                stock,
                description: String::new(),
                image: String::new(),
            })
            .await
            .unwrap();
        (store, SessionUser::from(&user), event)
    }

    fn form(quantity: i32) -> CheckoutForm {
        CheckoutForm {
            quantity,
            purchaser_name: None,
            purchaser_email: Some("  ".to_string()),
            purchaser_phone: Some("0812".to_string()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_quote_prices_without_writing() {
        let (store, _, event) = setup(4).await;
        let q = quote(&store, event.id, 3).await.unwrap();
        assert_eq!(q.total, Decimal::new(37_500, 2));
        assert_eq!(store.find_event(event.id).await.unwrap().unwrap().stock, 4);
        assert_eq!(store.transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_checkout_defaults_purchaser_to_buyer() {
        let (store, buyer, event) = setup(4).await;
        let tx = checkout(&store, &buyer, event.id, form(2)).await.unwrap();

        assert_eq!(tx.purchaser_name, "Dewi");
        assert_eq!(tx.purchaser_email, "dewi@example.com");
        assert_eq!(tx.purchaser_phone, "0812");
        assert_eq!(tx.total_paid, Decimal::new(25_000, 2));
    }

    #[tokio::test]
    async fn test_sequential_purchases_never_oversell() {
        let (store, buyer, event) = setup(5).await;

        checkout(&store, &buyer, event.id, form(3)).await.unwrap();
        let err = checkout(&store, &buyer, event.id, form(3)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        checkout(&store, &buyer, event.id, form(2)).await.unwrap();

        assert_eq!(store.find_event(event.id).await.unwrap().unwrap().stock, 0);
        assert_eq!(store.sales_totals().await.unwrap().tickets_sold, 5);
    }

    #[tokio::test]
    async fn test_non_positive_quantity_rejected() {
        let (store, buyer, event) = setup(5).await;
        for quantity in [0, -2] {
            assert!(matches!(
                checkout(&store, &buyer, event.id, form(quantity)).await,
                Err(AppError::ValidationError(_))
            ));
        }
        assert_eq!(store.find_event(event.id).await.unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_total_too_large_is_rejected_before_writing() {
        let (store, buyer, event) = setup(5).await;
        let pricey = EventInput {
            name: event.name.clone(),
            date: event.date,
            location: event.location.clone(),
            price: Decimal::new(999_999_999_999, 2),
            stock: 5,
            description: String::new(),
            image: String::new(),
        };
        store.update_event(event.id, pricey).await.unwrap();

        assert!(quote(&store, event.id, 1).await.is_ok());
        assert!(matches!(
            quote(&store, event.id, 2).await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            checkout(&store, &buyer, event.id, form(2)).await,
            Err(AppError::ValidationError(_))
        ));
        assert_eq!(store.find_event(event.id).await.unwrap().unwrap().stock, 5);
        assert_eq!(store.transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_deleted_buyer_cannot_checkout() {
        let (store, buyer, event) = setup(5).await;
        store.delete_user(buyer.id).await.unwrap();

        assert!(matches!(
            checkout(&store, &buyer, event.id, form(1)).await,
            Err(AppError::AuthError(_))
        ));
        assert_eq!(store.find_event(event.id).await.unwrap().unwrap().stock, 5);
        assert_eq!(store.transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_event_is_not_found() {
        let (store, _, _) = setup(5).await;
        assert!(matches!(
            quote(&store, 404, 1).await,
            Err(AppError::NotFound(_))
        ));
    }
}
