use axum::extract::State;
use axum::response::Response;
use serde::Serialize;
use tower_sessions::Session;

use crate::middleware::{clear_session, set_current_user};
use crate::models::{Role, SessionUser};
use crate::services::accounts::{self, LoginForm, RegisterForm};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::Json;
use crate::utils::response::{created, empty_success, success};

#[derive(Serialize)]
pub struct LoginPayload {
    pub user: SessionUser,
    /// Where a browser client should go next.
    pub redirect: &'static str,
}

pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterForm>,
) -> Result<Response, AppError> {
    let user = accounts::register(state.store(), form).await?;
    Ok(created(
        SessionUser::from(&user),
        "Registration successful! Please log in.",
    ))
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Response, AppError> {
    let user = accounts::authenticate(state.store(), &form).await?;
    let current = SessionUser::from(&user);
    set_current_user(&session, &current).await?;

    tracing::info!(user_id = user.id, role = %user.role, "User logged in");

    let redirect = match user.role {
        Role::Admin => "/admin",
        Role::Member => "/",
    };
    let message = format!("Welcome, {}!", user.name);
    Ok(success(
        LoginPayload {
            user: current,
            redirect,
        },
        message,
    ))
}

pub async fn logout(session: Session) -> Result<Response, AppError> {
    clear_session(&session).await?;
    Ok(empty_success("You have been logged out."))
}
