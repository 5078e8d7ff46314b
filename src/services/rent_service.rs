//! Rent Service - Business logic for the rental lifecycle
//!
//! Creating a rental books the box and schedules its email timeline;
//! status changes revoke or extend that timeline.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::*;
use serde::Serialize;

use crate::jobs::{EmailJob, JobKind, JobQueue, OverdueJob, RentJob};
use crate::messages;
use crate::models::rent::{self, Entity as Rent, RentDto};
use crate::models::storage::{self, Entity as Storage};
use crate::models::storage_box::{self, Entity as StorageBox};
use crate::models::user::{self, Entity as User};

/// Error type for service operations
#[derive(Debug)]
pub enum ServiceError {
    Database(String),
    NotFound,
    InvalidState(String),
    Validation(String),
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        ServiceError::Database(e.to_string())
    }
}

pub const RENT_STATUSES: [&str; 5] = ["created", "active", "completed", "cancelled", "expired"];

/// Reminder schedule before the end date, furthest out first.
const REMINDER_OFFSETS: [(i64, &str); 4] = [
    (30, "a month"),
    (14, "two weeks"),
    (7, "a week"),
    (3, "3 days"),
];

/// Enriched rental row for the account page
#[derive(Debug, Clone, Serialize)]
pub struct RentWithBox {
    pub id: i32,
    pub box_id: i32,
    pub box_number: String,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
    pub pickup_address: Option<String>,
    pub total_price: f64,
    pub is_delivery_needed: bool,
    pub is_partial_pickup_allowed: bool,
    pub is_near_end: bool,
}

/// A user's rentals grouped by facility
#[derive(Debug, Clone, Serialize)]
pub struct StorageRents {
    pub storage: storage::Model,
    pub rents: Vec<RentWithBox>,
}

/// Create a rental on a free box and schedule its lifecycle jobs.
pub async fn create_rent(
    db: &DatabaseConnection,
    jobs: &JobQueue,
    dto: RentDto,
) -> Result<rent::Model, ServiceError> {
    let now = Utc::now();

    let email = dto.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ServiceError::Validation(
            "A valid email address is required".to_string(),
        ));
    }

    let (start, end) = validate_rental_dates(&dto.start_date, &dto.end_date, &now)?;

    // 1. Check the box exists and is free
    let bx = StorageBox::find_by_id(dto.box_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if bx.is_occupied {
        return Err(ServiceError::InvalidState(
            "Box is already occupied".to_string(),
        ));
    }

    let storage = Storage::find_by_id(bx.storage_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    // 2. Link the rental to an account when the email is already registered
    let user = find_user_by_email(db, email).await?;

    let pickup_address = dto
        .pickup_address
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned);
    let is_delivery_needed = pickup_address.is_some();
    let total_price = rental_price(&start, &end, bx.monthly_price);

    // 3. Create the rental
    let new_rent = rent::ActiveModel {
        user_id: Set(user.as_ref().map(|u| u.id)),
        email: Set(email.to_owned()),
        box_id: Set(bx.id),
        start_date: Set(dto.start_date.clone()),
        end_date: Set(dto.end_date.clone()),
        status: Set("created".to_owned()),
        pickup_address: Set(pickup_address),
        total_price: Set(total_price),
        is_delivery_needed: Set(is_delivery_needed),
        is_partial_pickup_allowed: Set(dto.is_partial_pickup_allowed.unwrap_or(false)),
        task_ids: Set("[]".to_owned()),
        created_at: Set(now.to_rfc3339()),
        updated_at: Set(now.to_rfc3339()),
        ..Default::default()
    };

    let saved_rent = new_rent.insert(db).await?;

    // 4. The box stops being offered once a rental is taken on it
    let mut box_active: storage_box::ActiveModel = bx.clone().into();
    box_active.is_occupied = Set(true);
    box_active.updated_at = Set(now.to_rfc3339());
    box_active.update(db).await?;

    // 5. Schedule the email timeline and record the job ids
    let task_ids = schedule_lifecycle_jobs(jobs, &saved_rent, &bx, &storage, &end, &now).await?;

    let mut rent_active: rent::ActiveModel = saved_rent.into();
    rent_active.task_ids = Set(serialize_task_ids(&task_ids));
    let updated = rent_active.update(db).await?;

    Ok(updated)
}

/// Queue the confirmation, the expiry marker, the end notice and the
/// staged reminders for a fresh rental. Returns the job ids in order.
async fn schedule_lifecycle_jobs(
    jobs: &JobQueue,
    rent: &rent::Model,
    bx: &storage_box::Model,
    storage: &storage::Model,
    end: &NaiveDate,
    now: &DateTime<Utc>,
) -> Result<Vec<String>, ServiceError> {
    let mut task_ids = Vec::new();
    let end_at = date_at_midnight(end);

    // Confirmation goes out right away
    let (subject, body) = messages::confirm_rent(rent, bx, storage);
    let job = EmailJob {
        subject,
        body,
        recipient: rent.email.clone(),
    };
    task_ids.push(jobs.enqueue(JobKind::SendEmail, &job, *now).await?);

    // The rental expires at midnight on its end date
    let job = RentJob { rent_id: rent.id };
    task_ids.push(jobs.enqueue(JobKind::MarkRentExpired, &job, end_at).await?);

    let (subject, body) = messages::end_rent(rent, storage);
    let job = EmailJob {
        subject,
        body,
        recipient: rent.email.clone(),
    };
    task_ids.push(jobs.enqueue(JobKind::SendEmail, &job, end_at).await?);

    // Staged reminders, skipping any already in the past
    for (days_before, time_left) in REMINDER_OFFSETS {
        let run_at = end_at - chrono::Duration::days(days_before);
        if run_at <= *now {
            continue;
        }
        let (subject, body) = messages::end_rent_reminder(rent, storage, time_left);
        let job = EmailJob {
            subject,
            body,
            recipient: rent.email.clone(),
        };
        task_ids.push(jobs.enqueue(JobKind::SendEmail, &job, run_at).await?);
    }

    Ok(task_ids)
}

/// Move a rental to a new status and apply the side effects of the
/// transition.
pub async fn update_rent_status(
    db: &DatabaseConnection,
    jobs: &JobQueue,
    rent_id: i32,
    new_status: &str,
) -> Result<rent::Model, ServiceError> {
    if !RENT_STATUSES.contains(&new_status) {
        return Err(ServiceError::Validation(format!(
            "Unknown rental status '{}'",
            new_status
        )));
    }

    let rent = Rent::find_by_id(rent_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;
    let old_status = rent.status.clone();

    // 1. A closed rental no longer needs its scheduled jobs
    let mut task_ids = parse_task_ids(&rent.task_ids);
    if new_status != old_status && (new_status == "completed" || new_status == "cancelled") {
        for job_id in &task_ids {
            jobs.revoke(job_id).await?;
        }
        task_ids.clear();
    }

    // 2. Recompute the derived fields, mirroring what happens on creation
    let bx = StorageBox::find_by_id(rent.box_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;
    let user = find_user_by_email(db, &rent.email).await?;
    let total_price = match (
        NaiveDate::parse_from_str(&rent.start_date, "%Y-%m-%d"),
        NaiveDate::parse_from_str(&rent.end_date, "%Y-%m-%d"),
    ) {
        (Ok(start), Ok(end)) => rental_price(&start, &end, bx.monthly_price),
        _ => rent.total_price,
    };

    let now = Utc::now();
    let mut rent_active: rent::ActiveModel = rent.clone().into();
    rent_active.status = Set(new_status.to_owned());
    rent_active.task_ids = Set(serialize_task_ids(&task_ids));
    rent_active.user_id = Set(user.map(|u| u.id));
    rent_active.is_delivery_needed = Set(rent
        .pickup_address
        .as_deref()
        .is_some_and(|a| !a.trim().is_empty()));
    rent_active.total_price = Set(total_price);
    rent_active.updated_at = Set(now.to_rfc3339());

    let mut updated = rent_active.update(db).await?;

    // 3. An expired rental starts the monthly overdue chain
    if new_status == "expired" && old_status != "expired" {
        let storage = Storage::find_by_id(bx.storage_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound)?;
        let (subject, body) = messages::overdue_rent(&updated, &storage);
        let payload = OverdueJob {
            rent_id: updated.id,
            subject,
            body,
        };
        let job_id = jobs.enqueue(JobKind::OverdueReminder, &payload, now).await?;
        updated = append_task_id(db, updated.id, &job_id).await?;
    }

    Ok(updated)
}

/// Append a job id to the rental's bookkeeping list.
///
/// Read-modify-write without locking; a concurrent status update can drop
/// an id, which at worst leaves one revoked job unexecuted anyway.
pub async fn append_task_id(
    db: &DatabaseConnection,
    rent_id: i32,
    job_id: &str,
) -> Result<rent::Model, ServiceError> {
    let rent = Rent::find_by_id(rent_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let mut task_ids = parse_task_ids(&rent.task_ids);
    task_ids.push(job_id.to_owned());

    let mut rent_active: rent::ActiveModel = rent.into();
    rent_active.task_ids = Set(serialize_task_ids(&task_ids));
    rent_active.updated_at = Set(Utc::now().to_rfc3339());

    let updated = rent_active.update(db).await?;
    Ok(updated)
}

/// List a user's rentals grouped by facility, newest first.
pub async fn list_rents_for_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<(user::Model, Vec<StorageRents>), ServiceError> {
    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let rents = Rent::find()
        .filter(rent::Column::UserId.eq(user.id))
        .order_by_desc(rent::Column::StartDate)
        .all(db)
        .await?;

    // Collect box IDs to fetch boxes and their facilities
    let box_ids: Vec<i32> = rents.iter().map(|r| r.box_id).collect();

    let mut box_map: HashMap<i32, storage_box::Model> = HashMap::new();
    let mut storage_map: HashMap<i32, storage::Model> = HashMap::new();

    if !box_ids.is_empty() {
        let boxes = StorageBox::find()
            .filter(storage_box::Column::Id.is_in(box_ids))
            .all(db)
            .await?;

        let storage_ids: Vec<i32> = boxes.iter().map(|b| b.storage_id).collect();
        for bx in boxes {
            box_map.insert(bx.id, bx);
        }

        let storages = Storage::find()
            .filter(storage::Column::Id.is_in(storage_ids))
            .all(db)
            .await?;
        for storage in storages {
            storage_map.insert(storage.id, storage);
        }
    }

    let today = Utc::now().date_naive();
    let mut grouped: Vec<StorageRents> = Vec::new();

    for rent in rents {
        let Some(bx) = box_map.get(&rent.box_id) else {
            continue;
        };
        let Some(storage) = storage_map.get(&bx.storage_id) else {
            continue;
        };

        let is_near_end = NaiveDate::parse_from_str(&rent.end_date, "%Y-%m-%d")
            .map(|end| (end - today).num_days() <= 7)
            .unwrap_or(false);

        let row = RentWithBox {
            id: rent.id,
            box_id: rent.box_id,
            box_number: bx.number.clone(),
            start_date: rent.start_date,
            end_date: rent.end_date,
            status: rent.status,
            pickup_address: rent.pickup_address,
            total_price: rent.total_price,
            is_delivery_needed: rent.is_delivery_needed,
            is_partial_pickup_allowed: rent.is_partial_pickup_allowed,
            is_near_end,
        };

        match grouped.iter_mut().find(|g| g.storage.id == storage.id) {
            Some(group) => group.rents.push(row),
            None => grouped.push(StorageRents {
                storage: storage.clone(),
                rents: vec![row],
            }),
        }
    }

    Ok((user, grouped))
}

fn validate_rental_dates(
    start_date: &str,
    end_date: &str,
    now: &DateTime<Utc>,
) -> Result<(NaiveDate, NaiveDate), ServiceError> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").map_err(|_| {
        ServiceError::Validation("Start date must be in YYYY-MM-DD format".to_string())
    })?;
    let end = NaiveDate::parse_from_str(end_date, "%Y-%m-%d").map_err(|_| {
        ServiceError::Validation("End date must be in YYYY-MM-DD format".to_string())
    })?;

    if start < now.date_naive() {
        return Err(ServiceError::Validation(
            "Start date cannot be in the past".to_string(),
        ));
    }

    if end <= start {
        return Err(ServiceError::Validation(
            "End date must be after the start date".to_string(),
        ));
    }

    Ok((start, end))
}

/// Price for the whole period: days are counted inclusively and billed
/// at the monthly rate divided by 30, rounded to cents.
pub fn rental_price(start: &NaiveDate, end: &NaiveDate, monthly_price: f64) -> f64 {
    let days = (*end - *start).num_days() + 1;
    let price = days as f64 * monthly_price / 30.0;
    (price * 100.0).round() / 100.0
}

pub fn parse_task_ids(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn serialize_task_ids(ids: &[String]) -> String {
    serde_json::to_string(ids).unwrap_or_else(|_| "[]".to_string())
}

fn date_at_midnight(date: &NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

async fn find_user_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<user::Model>, ServiceError> {
    let user = User::find()
        .filter(user::Column::Email.eq(email.trim()))
        .one(db)
        .await?;
    Ok(user)
}
