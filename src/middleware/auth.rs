//! Session-backed access control.
//!
//! Handlers opt in by taking one of these extractors:
//!
//! - [`CurrentUser`]: any logged-in account, 401 otherwise.
//! - [`AdminUser`]: logged in with the admin role, 403 for members.
//! - [`MemberUser`]: logged in without the admin role (ticket buyers).

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::config::session::CURRENT_USER_KEY;
use crate::models::SessionUser;
use crate::utils::error::AppError;

pub struct CurrentUser(pub SessionUser);

pub struct AdminUser(pub SessionUser);

pub struct MemberUser(pub SessionUser);

fn session_from(parts: &Parts) -> Result<Session, AppError> {
    parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or_else(|| AppError::InternalServerError("session layer is not installed".to_string()))
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = session_from(parts)?;
        let user = session
            .get::<SessionUser>(CURRENT_USER_KEY)
            .await?
            .ok_or_else(|| AppError::AuthError("Please log in first.".to_string()))?;
        Ok(Self(user))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.role.is_admin() {
            return Err(AppError::Forbidden(
                "Access denied! This page is for admins only.".to_string(),
            ));
        }
        Ok(Self(user))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MemberUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.role.is_admin() {
            return Err(AppError::Forbidden("Admins cannot buy tickets!".to_string()));
        }
        Ok(Self(user))
    }
}

/// Store the identity and rotate the session id.
pub async fn set_current_user(session: &Session, user: &SessionUser) -> Result<(), AppError> {
    session.cycle_id().await?;
    session.insert(CURRENT_USER_KEY, user).await?;
    Ok(())
}

/// Drop everything held for this session.
pub async fn clear_session(session: &Session) -> Result<(), AppError> {
    session.flush().await?;
    Ok(())
}
