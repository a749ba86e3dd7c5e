pub mod event;
pub mod transaction;
pub mod user;

pub use event::{Event, EventInput};
pub use transaction::{NewPurchase, SaleRecord, SalesTotals, TicketSummary, Transaction};
pub use user::{NewUser, Role, SessionUser, User};
