//! Delayed-job queue and worker.
//!
//! Stands in for an external task broker: jobs are rows in the
//! `scheduled_jobs` table, picked up by a background worker loop. Revoking
//! a job soft-deletes its row, so revoking an already-executed job is a
//! harmless no-op.

pub mod queue;
pub mod worker;

pub use queue::JobQueue;

use serde::{Deserialize, Serialize};

/// The job kinds the worker knows how to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    SendEmail,
    MarkRentExpired,
    OverdueReminder,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::SendEmail => "send_email",
            JobKind::MarkRentExpired => "mark_rent_expired",
            JobKind::OverdueReminder => "overdue_reminder",
        }
    }

    pub fn parse(s: &str) -> Option<JobKind> {
        match s {
            "send_email" => Some(JobKind::SendEmail),
            "mark_rent_expired" => Some(JobKind::MarkRentExpired),
            "overdue_reminder" => Some(JobKind::OverdueReminder),
            _ => None,
        }
    }
}

/// Payload for `JobKind::SendEmail`.
#[derive(Debug, Serialize, Deserialize)]
pub struct EmailJob {
    pub subject: String,
    pub body: String,
    pub recipient: String,
}

/// Payload for `JobKind::MarkRentExpired`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RentJob {
    pub rent_id: i32,
}

/// Payload for `JobKind::OverdueReminder`. Subject and body are built once
/// at the expired transition and re-sent on every firing.
#[derive(Debug, Serialize, Deserialize)]
pub struct OverdueJob {
    pub rent_id: i32,
    pub subject: String,
    pub body: String,
}
