use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::error::AppError;

/// Money columns are `NUMERIC(12, 2)`.
const MONEY_SCALE: u32 = 2;

/// Exclusive upper bound of a `NUMERIC(12, 2)` amount.
fn money_limit() -> Decimal {
    Decimal::from(10_000_000_000_i64)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub date: NaiveDate,
    pub location: String,
    pub price: Decimal,
    pub stock: i32,
    pub description: String,
    pub image: String,
}

/// Admin-submitted event fields, used for both create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct EventInput {
    pub name: String,
    pub date: NaiveDate,
    pub location: String,
    pub price: Decimal,
    pub stock: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

impl EventInput {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Event name must not be empty".to_string(),
            ));
        }
        if self.location.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Event location must not be empty".to_string(),
            ));
        }
        if self.price.is_sign_negative() {
            return Err(AppError::ValidationError(
                "Ticket price must not be negative".to_string(),
            ));
        }
        if self.price.round_dp(MONEY_SCALE) != self.price {
            return Err(AppError::ValidationError(
                "Ticket price must have at most two decimal places".to_string(),
            ));
        }
        if self.price >= money_limit() {
            return Err(AppError::ValidationError(
                "Ticket price is too large".to_string(),
            ));
        }
        if self.stock < 0 {
            return Err(AppError::ValidationError(
                "Ticket stock must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl Event {
    /// Whether `quantity` tickets can still be sold.
    pub fn has_stock_for(&self, quantity: i32) -> bool {
        self.stock >= quantity
    }

    /// Price of `quantity` tickets, rejected when it would not fit a money column.
    pub fn total_for(&self, quantity: i32) -> Result<Decimal, AppError> {
        self.price
            .checked_mul(Decimal::from(quantity))
            .filter(|total| *total < money_limit())
            .ok_or_else(|| AppError::ValidationError("Order total is too large.".to_string()))
    }

    /// Case-insensitive substring match on the event name.
    pub fn name_matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn input() -> EventInput {
        EventInput {
            name: "Java Jazz".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            location: "Jakarta".to_string(),
            price: Decimal::from_str("150000.00").unwrap(),
            stock: 100,
            description: String::new(),
            image: String::new(),
        }
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn test_negative_stock_is_rejected() {
        let mut bad = input();
        bad.stock = -1;
        assert!(matches!(bad.validate(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let mut bad = input();
        bad.price = Decimal::from(-5);
        assert!(matches!(bad.validate(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_price_must_fit_money_column() {
        let mut bad = input();
        bad.price = Decimal::from_str("10.005").unwrap();
        assert!(matches!(bad.validate(), Err(AppError::ValidationError(_))));

        bad.price = Decimal::MAX;
        assert!(matches!(bad.validate(), Err(AppError::ValidationError(_))));

        let mut edge = input();
        edge.price = Decimal::from_str("9999999999.99").unwrap();
        assert!(edge.validate().is_ok());

        edge.price = Decimal::from_str("10.500").unwrap();
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_total_overflow_is_rejected() {
        let i = input();
        let event = Event {
            id: 1,
            name: i.name,
            date: i.date,
            location: i.location,
            price: Decimal::MAX,
            stock: 10,
            description: i.description,
            image: i.image,
        };
        assert!(matches!(event.total_for(2), Err(AppError::ValidationError(_))));

        let pricey = Event {
            price: Decimal::from_str("9999999999.99").unwrap(),
            ..event
        };
        assert!(pricey.total_for(1).is_ok());
        assert!(pricey.total_for(2).is_err());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let mut bad = input();
        bad.name = "   ".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_total_and_stock_checks() {
        let i = input();
        let event = Event {
            id: 1,
            name: i.name,
            date: i.date,
            location: i.location,
            price: i.price,
            stock: 3,
            description: i.description,
            image: i.image,
        };

        assert!(event.has_stock_for(3));
        assert!(!event.has_stock_for(4));
        assert_eq!(
            event.total_for(2).unwrap(),
            Decimal::from_str("300000.00").unwrap()
        );
        assert!(event.name_matches("jazz"));
        assert!(!event.name_matches("rock"));
    }
}
