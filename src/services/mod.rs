pub mod accounts;
pub mod checkout;
pub mod dashboard;
