use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::services::storage_service;

/// GET /api/home - Random facility with its availability summary
pub async fn home(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match storage_service::home_summary(&db).await {
        Ok(Some(summary)) => (
            StatusCode::OK,
            Json(json!({
                "storage": summary.storage,
                "storage_data": {
                    "total_boxes": summary.total_boxes,
                    "free_boxes": summary.free_boxes,
                    "min_price": summary.min_price,
                    "max_height": summary.max_height
                }
            })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::OK,
            Json(json!({ "storage": null, "storage_data": null })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("{:?}", e) })),
        )
            .into_response(),
    }
}

/// GET /api/storages - All facilities with occupancy stats
pub async fn list_storages(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match storage_service::list_storages_with_stats(&db).await {
        Ok(stats) => (StatusCode::OK, Json(json!({ "storages": stats }))).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("{:?}", e) })),
        )
            .into_response(),
    }
}

/// GET /api/storages/:id/boxes - Boxes still offered at a facility
pub async fn storage_boxes(
    State(db): State<DatabaseConnection>,
    Path(storage_id): Path<i32>,
) -> impl IntoResponse {
    match storage_service::free_boxes(&db, storage_id).await {
        Ok(boxes) => {
            let boxes: Vec<_> = boxes
                .iter()
                .map(|b| {
                    json!({
                        "id": b.id,
                        "number": b.number,
                        "area": b.area,
                        "price": b.monthly_price,
                        "level": b.level,
                        "length": b.length,
                        "width": b.width,
                        "height": b.height
                    })
                })
                .collect();

            (StatusCode::OK, Json(json!({ "boxes": boxes }))).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("{:?}", e) })),
        )
            .into_response(),
    }
}
