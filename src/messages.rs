//! Subject/body builders for the rental lifecycle emails.

use crate::models::{rent, storage, storage_box};

/// Confirmation sent right after a rental request is submitted.
pub fn confirm_rent(
    rent: &rent::Model,
    bx: &storage_box::Model,
    storage: &storage::Model,
) -> (String, String) {
    let subject = format!("Your rental request for box {} has been received", bx.number);
    let pickup = rent.pickup_address.as_deref().unwrap_or("not requested");
    let body = format!(
        "Rental of box {} at {}, {} from {} to {}. Cargo pickup address: {}",
        bx.number, storage.city, storage.address, rent.start_date, rent.end_date, pickup
    );

    (subject, body)
}

/// Notice delivered on the last day of the rental.
pub fn end_rent(rent: &rent::Model, storage: &storage::Model) -> (String, String) {
    let subject = format!("Rental #{} is ending", rent.id);
    let body = format!(
        "This is a reminder that the rental of your box at the {}, {} facility \
         ends today, {}.\n\n\
         Please contact us to extend the rental or to empty the box.",
        storage.city, storage.address, rent.end_date
    );

    (subject, body)
}

/// Staged reminder; `time_left` is a phrase like "two weeks".
pub fn end_rent_reminder(
    rent: &rent::Model,
    storage: &storage::Model,
    time_left: &str,
) -> (String, String) {
    let subject = format!("Reminder: rental #{} is ending", rent.id);
    let body = format!(
        "This is a reminder that the rental of your box at the {}, {} facility \
         ends in {}, on {}.\n",
        storage.city, storage.address, time_left, rent.end_date
    );

    (subject, body)
}

/// Overdue notice, re-sent monthly while the rental stays expired.
pub fn overdue_rent(rent: &rent::Model, storage: &storage::Model) -> (String, String) {
    let subject = format!("Reminder: rental #{} is overdue", rent.id);
    let body = format!(
        "The rental of your box at the {}, {} facility ended on {}.\n\n\
         Your belongings will be kept for 6 months at an increased rate. \
         If you do not collect them within that period, you may lose them.",
        storage.city, storage.address, rent.end_date
    );

    (subject, body)
}
