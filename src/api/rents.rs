use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::models::rent::RentDto;
use crate::services::rent_service::{self, ServiceError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    status: String,
}

/// POST /api/rents - Book a box for a period
pub async fn create_rent(
    State(state): State<AppState>,
    Json(payload): Json<RentDto>,
) -> impl IntoResponse {
    match rent_service::create_rent(&state.db, &state.jobs, payload).await {
        Ok(rent) => (
            StatusCode::CREATED,
            Json(json!({ "rent": rent, "message": "Rental request received" })),
        )
            .into_response(),
        Err(ServiceError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Box not found" })),
        )
            .into_response(),
        Err(ServiceError::InvalidState(msg)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
        }
        Err(ServiceError::Validation(msg)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("{:?}", e) })),
        )
            .into_response(),
    }
}

/// PUT /api/rents/:id/status - Move a rental through its lifecycle
pub async fn update_rent_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateStatusRequest>,
) -> impl IntoResponse {
    match rent_service::update_rent_status(&state.db, &state.jobs, id, &payload.status).await {
        Ok(rent) => (
            StatusCode::OK,
            Json(json!({ "rent": rent, "message": "Rental status updated" })),
        )
            .into_response(),
        Err(ServiceError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Rental not found" })),
        )
            .into_response(),
        Err(ServiceError::InvalidState(msg)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
        }
        Err(ServiceError::Validation(msg)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("{:?}", e) })),
        )
            .into_response(),
    }
}

/// GET /api/users/:id/rents - A user's rentals grouped by facility
pub async fn user_rents(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> impl IntoResponse {
    match rent_service::list_rents_for_user(&state.db, user_id).await {
        Ok((user, storages)) => (
            StatusCode::OK,
            Json(json!({
                "user": {
                    "id": user.id,
                    "username": user.username,
                    "email": user.email
                },
                "storages": storages
            })),
        )
            .into_response(),
        Err(ServiceError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "User not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("{:?}", e) })),
        )
            .into_response(),
    }
}
