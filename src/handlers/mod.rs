use axum::extract::State;
use axum::response::Response;
use serde::Serialize;

use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

pub mod admin;
pub mod auth;
pub mod events;
pub mod tickets;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "festix-api",
    };

    success(payload, "Health check successful")
}

/// Ready once the backing store answers.
pub async fn readiness(State(state): State<AppState>) -> Result<Response, AppError> {
    state.store().ping().await?;

    let payload = HealthPayload {
        status: "ready",
        service: "festix-api",
    };
    Ok(success(payload, "Store reachable"))
}
