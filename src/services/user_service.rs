//! User Service - Registration and guest rental linking

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::*;

use crate::auth;
use crate::models::rent::{self, Entity as Rent};
use crate::models::user::{self, Entity as User};

/// Error type for service operations
#[derive(Debug)]
pub enum ServiceError {
    Database(String),
    Validation(String),
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        ServiceError::Database(e.to_string())
    }
}

/// Register a new account and pick up any rentals placed as a guest
/// with the same email.
pub async fn register_user(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
    username: Option<&str>,
) -> Result<user::Model, ServiceError> {
    let email = email.trim();

    if email.is_empty() || !email.contains('@') {
        return Err(ServiceError::Validation(
            "A valid email address is required".to_string(),
        ));
    }

    if password.is_empty() {
        return Err(ServiceError::Validation(
            "A password is required".to_string(),
        ));
    }

    // 1. Emails are unique across accounts
    let existing = User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;

    if existing.is_some() {
        return Err(ServiceError::Validation(
            "A user with this email already exists".to_string(),
        ));
    }

    // 2. Default the username to the local part of the email
    let username = match username.map(str::trim).filter(|u| !u.is_empty()) {
        Some(name) => name.to_owned(),
        None => email.split('@').next().unwrap_or(email).to_owned(),
    };

    let password_hash = auth::hash_password(password).map_err(ServiceError::Database)?;

    let now = Utc::now().to_rfc3339();
    let new_user = user::ActiveModel {
        username: Set(username),
        email: Set(email.to_owned()),
        password_hash: Set(password_hash),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let saved_user = new_user.insert(db).await?;

    // 3. Claim guest rentals placed with this email
    let linked = link_guest_rents(db, &saved_user).await?;
    if linked > 0 {
        tracing::info!(
            "Linked {} guest rental(s) to new user {}",
            linked,
            saved_user.email
        );
    }

    Ok(saved_user)
}

/// Attach rentals placed without an account to the given user, matched
/// by email. Returns how many were linked.
pub async fn link_guest_rents(
    db: &DatabaseConnection,
    user: &user::Model,
) -> Result<u64, ServiceError> {
    let result = Rent::update_many()
        .col_expr(rent::Column::UserId, Expr::value(user.id))
        .filter(rent::Column::Email.eq(&user.email))
        .filter(rent::Column::UserId.is_null())
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
