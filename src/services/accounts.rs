//! Registration, login and the admin bootstrap account.

use serde::Deserialize;

use crate::config::AdminSeed;
use crate::models::{NewUser, Role, User};
use crate::store::{Store, StoreError};
use crate::utils::error::AppError;
use crate::utils::password::{hash_password, verify_password};

const LOGIN_FAILED: &str = "Login failed. Check email or password.";

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn register(store: &dyn Store, form: RegisterForm) -> Result<User, AppError> {
    let name = form.name.trim();
    let email = normalize_email(&form.email);

    if name.is_empty() || email.is_empty() || form.password.is_empty() {
        return Err(AppError::ValidationError(
            "Name, email and password are required.".to_string(),
        ));
    }

    let user = store
        .create_user(NewUser {
            name: name.to_string(),
            email,
            password_hash: hash_password(&form.password)?,
            role: Role::Member,
        })
        .await?;

    tracing::info!(user_id = user.id, "Member registered");
    Ok(user)
}

/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn authenticate(store: &dyn Store, form: &LoginForm) -> Result<User, AppError> {
    let email = normalize_email(&form.email);

    match store.find_user_by_email(&email).await? {
        Some(user) if verify_password(&form.password, &user.password_hash) => Ok(user),
        _ => Err(AppError::AuthError(LOGIN_FAILED.to_string())),
    }
}

/// Create the configured admin account unless its email is already taken.
pub async fn ensure_admin(store: &dyn Store, seed: &AdminSeed) -> Result<(), AppError> {
    let email = normalize_email(&seed.email);
    if let Some(existing) = store.find_user_by_email(&email).await? {
        if !existing.role.is_admin() {
            tracing::warn!(user_id = existing.id, "Admin email belongs to a member account");
        }
        return Ok(());
    }

    let result = store
        .create_user(NewUser {
            name: seed.name.clone(),
            email,
            password_hash: hash_password(&seed.password)?,
            role: Role::Admin,
        })
        .await;

    match result {
        Ok(admin) => {
            tracing::info!(user_id = admin.id, "Admin account created");
            Ok(())
        }
        // Lost a race with another instance seeding the same account
        Err(StoreError::DuplicateEmail) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
