//! Application state containing shared resources

use sea_orm::DatabaseConnection;

use crate::jobs::JobQueue;
use crate::mailer::Mailer;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Delayed-job queue backing the rental lifecycle
    pub jobs: JobQueue,
    /// Outbound email transport
    pub mailer: Mailer,
}

impl AppState {
    pub fn new(db: DatabaseConnection, jobs: JobQueue, mailer: Mailer) -> Self {
        Self { db, jobs, mailer }
    }
}

// Implement FromRef to allow extracting DatabaseConnection from AppState
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<AppState> for JobQueue {
    fn from_ref(state: &AppState) -> Self {
        state.jobs.clone()
    }
}
