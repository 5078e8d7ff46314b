use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use sea_orm::*;
use serde::Deserialize;
use serde_json::json;

use crate::auth::{create_jwt, verify_password, Claims};
use crate::models::user::{self, Entity as User};
use crate::services::user_service::{self, ServiceError};

#[derive(Deserialize)]
pub struct RegisterRequest {
    email: String,
    password: String,
    username: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

pub async fn register(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    let created = user_service::register_user(
        &db,
        &payload.email,
        &payload.password,
        payload.username.as_deref(),
    )
    .await;

    match created {
        Ok(user) => {
            let token = match create_jwt(&user.email) {
                Ok(token) => token,
                Err(e) => {
                    tracing::error!("❌ Failed to issue token for {}: {}", user.email, e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": "Failed to issue token" })),
                    )
                        .into_response();
                }
            };

            (
                StatusCode::CREATED,
                Json(json!({
                    "token": token,
                    "user": {
                        "id": user.id,
                        "username": user.username,
                        "email": user.email
                    }
                })),
            )
                .into_response()
        }
        Err(ServiceError::Validation(msg)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
        }
        Err(ServiceError::Database(e)) => {
            tracing::error!("❌ Registration failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Registration failed" })),
            )
                .into_response()
        }
    }
}

pub async fn login(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    tracing::info!("Login attempt for {}", payload.email);

    let user = match User::find()
        .filter(user::Column::Email.eq(payload.email.trim()))
        .one(&db)
        .await
    {
        Ok(Some(u)) => u,
        _ => {
            tracing::warn!("Unknown login email: {}", payload.email);
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid email or password" })),
            )
                .into_response();
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {
            let token = match create_jwt(&user.email) {
                Ok(token) => token,
                Err(e) => {
                    tracing::error!("❌ Failed to issue token for {}: {}", user.email, e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": "Failed to issue token" })),
                    )
                        .into_response();
                }
            };

            (
                StatusCode::OK,
                Json(json!({
                    "token": token,
                    "user": {
                        "id": user.id,
                        "username": user.username,
                        "email": user.email
                    }
                })),
            )
                .into_response()
        }
        _ => {
            tracing::warn!("Password verification failed for {}", user.email);
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid email or password" })),
            )
                .into_response()
        }
    }
}

// Tokens are stateless, so logout is just an acknowledgement for the client
pub async fn logout() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "message": "Logged out" })))
}

pub async fn get_me(claims: Claims, State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match User::find()
        .filter(user::Column::Email.eq(&claims.sub))
        .one(&db)
        .await
    {
        Ok(Some(user)) => (
            StatusCode::OK,
            Json(json!({
                "user": {
                    "id": user.id,
                    "username": user.username,
                    "email": user.email
                }
            })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "User not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
