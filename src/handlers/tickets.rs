use axum::extract::{Path, State};
use axum::response::Response;

use crate::middleware::{CurrentUser, MemberUser};
use crate::services::checkout::{self, CheckoutForm, QuoteForm};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::Json;
use crate::utils::response::{created, success};

/// First purchase step: check stock and price the order.
pub async fn purchase(
    State(state): State<AppState>,
    MemberUser(_buyer): MemberUser,
    Path(event_id): Path<i64>,
    Json(form): Json<QuoteForm>,
) -> Result<Response, AppError> {
    let quote = checkout::quote(state.store(), event_id, form.quantity).await?;
    Ok(success(quote, "Review your order before checkout."))
}

pub async fn checkout(
    State(state): State<AppState>,
    MemberUser(buyer): MemberUser,
    Path(event_id): Path<i64>,
    Json(form): Json<CheckoutForm>,
) -> Result<Response, AppError> {
    let transaction = checkout::checkout(state.store(), &buyer, event_id, form).await?;
    Ok(created(transaction, "Purchase successful!"))
}

/// Admins have no purchases, so any logged-in account may look.
pub async fn my_tickets(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Response, AppError> {
    let tickets = state.store().tickets_for_user(user.id).await?;
    Ok(success(tickets, "Your tickets"))
}
