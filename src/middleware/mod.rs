pub mod auth;

pub use auth::{clear_session, set_current_user, AdminUser, CurrentUser, MemberUser};
