pub mod auth;
pub mod faq;
pub mod health;
pub mod rents;
pub mod storages;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::get_me))
        // Facilities
        .route("/home", get(storages::home))
        .route("/storages", get(storages::list_storages))
        .route("/storages/:id/boxes", get(storages::storage_boxes))
        // Rentals
        .route("/rents", post(rents::create_rent))
        .route("/rents/:id/status", put(rents::update_rent_status))
        .route("/users/:id/rents", get(rents::user_rents))
        // FAQ
        .route("/faq", get(faq::get_faq))
        .with_state(state)
}
