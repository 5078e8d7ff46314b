//! Background worker executing due jobs.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sea_orm::*;

use crate::mailer::Mailer;
use crate::models::rent::Entity as Rent;
use crate::models::scheduled_job;
use crate::services::rent_service::{self, ServiceError};

use super::{EmailJob, JobKind, JobQueue, OverdueJob, RentJob};

/// How long to sleep when the queue is empty.
const IDLE_POLL: Duration = Duration::from_secs(60);

pub async fn run_worker(db: DatabaseConnection, jobs: JobQueue, mailer: Mailer) {
    tracing::info!("📬 Job worker started");
    let mut wakeup = jobs.subscribe_wakeup();

    loop {
        match run_due_jobs(&db, &jobs, &mailer).await {
            Ok(executed) => {
                if executed > 0 {
                    tracing::debug!("Executed {} due job(s)", executed);
                }
            }
            Err(e) => {
                tracing::error!("❌ Error executing due jobs: {}", e);
                tokio::time::sleep(Duration::from_secs(5)).await;
                continue;
            }
        }

        // Sleep until the earliest job is due, or until something new is
        // enqueued, whichever comes first
        let sleep_for = match jobs.peek_next().await {
            Ok(Some(job)) => time_until(&job.run_at),
            Ok(None) => IDLE_POLL,
            Err(e) => {
                tracing::error!("❌ Error peeking job queue: {}", e);
                Duration::from_secs(5)
            }
        };

        tokio::select! {
            _ = tokio::time::sleep(sleep_for) => {}
            _ = wakeup.recv() => {}
        }
    }
}

fn time_until(run_at: &str) -> Duration {
    match DateTime::parse_from_rfc3339(run_at) {
        Ok(at) => (at.with_timezone(&Utc) - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO),
        Err(_) => Duration::ZERO,
    }
}

/// Pop and execute every job due right now. Returns the number executed.
pub async fn run_due_jobs(
    db: &DatabaseConnection,
    jobs: &JobQueue,
    mailer: &Mailer,
) -> Result<usize, DbErr> {
    let mut executed = 0;
    while let Some(job) = jobs.pop_due(&Utc::now()).await? {
        execute_job(db, jobs, mailer, &job).await;
        executed += 1;
    }
    Ok(executed)
}

async fn execute_job(
    db: &DatabaseConnection,
    jobs: &JobQueue,
    mailer: &Mailer,
    job: &scheduled_job::Model,
) {
    let Some(kind) = JobKind::parse(&job.kind) else {
        tracing::warn!("⚠️ Unknown job kind '{}' for job {}", job.kind, job.id);
        return;
    };

    match kind {
        JobKind::SendEmail => match serde_json::from_str::<EmailJob>(&job.payload) {
            Ok(email) => {
                if let Err(e) = mailer
                    .send(&email.subject, &email.body, &email.recipient)
                    .await
                {
                    tracing::error!("❌ Failed to send email to {}: {}", email.recipient, e);
                }
            }
            Err(e) => tracing::error!("❌ Bad payload for job {}: {}", job.id, e),
        },
        JobKind::MarkRentExpired => match serde_json::from_str::<RentJob>(&job.payload) {
            Ok(payload) => {
                match rent_service::update_rent_status(db, jobs, payload.rent_id, "expired").await {
                    Ok(_) => tracing::info!("Rental {} marked expired", payload.rent_id),
                    Err(ServiceError::NotFound) => tracing::warn!(
                        "Rental {} no longer exists, skipping expiration",
                        payload.rent_id
                    ),
                    Err(e) => {
                        tracing::error!("❌ Failed to expire rental {}: {:?}", payload.rent_id, e)
                    }
                }
            }
            Err(e) => tracing::error!("❌ Bad payload for job {}: {}", job.id, e),
        },
        JobKind::OverdueReminder => match serde_json::from_str::<OverdueJob>(&job.payload) {
            Ok(payload) => run_overdue_reminder(db, jobs, mailer, payload).await,
            Err(e) => tracing::error!("❌ Bad payload for job {}: {}", job.id, e),
        },
    }
}

/// Send the overdue notice and reschedule it a month out. The chain stops
/// once the rent is gone or has left the expired status.
async fn run_overdue_reminder(
    db: &DatabaseConnection,
    jobs: &JobQueue,
    mailer: &Mailer,
    payload: OverdueJob,
) {
    let rent = match Rent::find_by_id(payload.rent_id).one(db).await {
        Ok(Some(rent)) => rent,
        Ok(None) => {
            tracing::info!(
                "Rental {} is gone, stopping overdue reminders",
                payload.rent_id
            );
            return;
        }
        Err(e) => {
            tracing::error!("❌ Failed to load rental {}: {}", payload.rent_id, e);
            return;
        }
    };

    if rent.status != "expired" {
        tracing::info!(
            "Rental {} is no longer expired, stopping overdue reminders",
            rent.id
        );
        return;
    }

    if let Err(e) = mailer.send(&payload.subject, &payload.body, &rent.email).await {
        tracing::error!(
            "❌ Failed to send overdue notice for rental {}: {}",
            rent.id,
            e
        );
    }

    let run_at = Utc::now() + chrono::Duration::days(30);
    match jobs.enqueue(JobKind::OverdueReminder, &payload, run_at).await {
        Ok(id) => {
            if let Err(e) = rent_service::append_task_id(db, rent.id, &id).await {
                tracing::error!(
                    "❌ Failed to record follow-up job for rental {}: {:?}",
                    rent.id,
                    e
                );
            }
        }
        Err(e) => tracing::error!(
            "❌ Failed to re-enqueue overdue reminder for rental {}: {}",
            rent.id,
            e
        ),
    }
}
