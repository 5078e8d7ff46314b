use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::scheduled_job::{self, Entity as ScheduledJob};

use super::JobKind;

/// Handle to the persisted delayed-job queue.
///
/// Cloning is cheap; all clones share one wakeup channel so the worker
/// notices enqueues immediately instead of waiting out its sleep.
#[derive(Clone)]
pub struct JobQueue {
    db: DatabaseConnection,
    wakeup: broadcast::Sender<()>,
}

impl JobQueue {
    pub fn new(db: DatabaseConnection) -> Self {
        let (wakeup, _) = broadcast::channel(16);
        Self { db, wakeup }
    }

    /// Insert a job and return its opaque identifier.
    pub async fn enqueue<P: Serialize>(
        &self,
        kind: JobKind,
        payload: &P,
        run_at: DateTime<Utc>,
    ) -> Result<String, DbErr> {
        let id = Uuid::new_v4().to_string();
        let payload = serde_json::to_string(payload).map_err(|e| DbErr::Custom(e.to_string()))?;

        let job = scheduled_job::ActiveModel {
            id: Set(id.clone()),
            kind: Set(kind.as_str().to_owned()),
            payload: Set(payload),
            run_at: Set(run_at.to_rfc3339()),
            is_revoked: Set(false),
            created_at: Set(Utc::now().to_rfc3339()),
        };
        ScheduledJob::insert(job).exec(&self.db).await?;

        tracing::debug!("Enqueued {} job {} for {}", kind.as_str(), id, run_at);
        let _ = self.wakeup.send(());

        Ok(id)
    }

    /// Revoke a pending job. A no-op when the job already ran or never
    /// existed, so callers can revoke blindly.
    pub async fn revoke(&self, job_id: &str) -> Result<(), DbErr> {
        ScheduledJob::update_many()
            .col_expr(scheduled_job::Column::IsRevoked, Expr::value(true))
            .filter(scheduled_job::Column::Id.eq(job_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// The earliest pending job, if any.
    pub async fn peek_next(&self) -> Result<Option<scheduled_job::Model>, DbErr> {
        ScheduledJob::find()
            .filter(scheduled_job::Column::IsRevoked.eq(false))
            .order_by_asc(scheduled_job::Column::RunAt)
            .one(&self.db)
            .await
    }

    /// Remove and return the earliest job due at `now`.
    pub async fn pop_due(
        &self,
        now: &DateTime<Utc>,
    ) -> Result<Option<scheduled_job::Model>, DbErr> {
        let txn = self.db.begin().await?;

        let job = ScheduledJob::find()
            .filter(scheduled_job::Column::IsRevoked.eq(false))
            .filter(scheduled_job::Column::RunAt.lte(now.to_rfc3339()))
            .order_by_asc(scheduled_job::Column::RunAt)
            .one(&txn)
            .await?;

        let Some(job) = job else {
            txn.commit().await?;
            return Ok(None);
        };

        ScheduledJob::delete_by_id(job.id.clone()).exec(&txn).await?;
        txn.commit().await?;

        Ok(Some(job))
    }

    /// Subscribe to enqueue notifications.
    pub fn subscribe_wakeup(&self) -> broadcast::Receiver<()> {
        self.wakeup.subscribe()
    }
}
