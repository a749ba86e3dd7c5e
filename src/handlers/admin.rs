use axum::extract::{Path, State};
use axum::response::Response;

use crate::middleware::AdminUser;
use crate::models::EventInput;
use crate::services::dashboard;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::Json;
use crate::utils::response::{created, empty_success, success};

pub async fn dashboard(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Response, AppError> {
    let overview = dashboard::load(state.store()).await?;
    Ok(success(overview, "Admin dashboard"))
}

pub async fn create_event(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(input): Json<EventInput>,
) -> Result<Response, AppError> {
    input.validate()?;
    let event = state.store().create_event(input).await?;

    tracing::info!(event_id = event.id, admin_id = admin.id, "Event created");
    Ok(created(event, "Event added successfully!"))
}

pub async fn update_event(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(event_id): Path<i64>,
    Json(input): Json<EventInput>,
) -> Result<Response, AppError> {
    input.validate()?;
    let event = state.store().update_event(event_id, input).await?;

    tracing::info!(event_id, admin_id = admin.id, "Event updated");
    Ok(success(event, "Event updated successfully!"))
}

pub async fn delete_event(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(event_id): Path<i64>,
) -> Result<Response, AppError> {
    state.store().delete_event(event_id).await?;

    tracing::info!(event_id, admin_id = admin.id, "Event deleted");
    Ok(empty_success("Event deleted successfully!"))
}

pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Response, AppError> {
    let users = state.store().list_users().await?;
    Ok(success(users, "Registered users"))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<i64>,
) -> Result<Response, AppError> {
    if user_id == admin.id {
        return Err(AppError::ValidationError(
            "You cannot delete your own account.".to_string(),
        ));
    }
    state.store().delete_user(user_id).await?;

    tracing::info!(user_id, admin_id = admin.id, "User deleted");
    Ok(empty_success("User deleted successfully!"))
}
