//! Storage Service - Facility statistics and box availability

use std::collections::HashSet;

use rand::seq::SliceRandom;
use sea_orm::*;
use serde::Serialize;

use crate::models::rent::{self, Entity as Rent};
use crate::models::storage::{self, Entity as Storage};
use crate::models::storage_box::{self, Entity as StorageBox};

/// Error type for service operations
#[derive(Debug)]
pub enum ServiceError {
    Database(String),
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        ServiceError::Database(e.to_string())
    }
}

/// Availability summary shown on the home page
#[derive(Debug, Clone, Serialize)]
pub struct HomeSummary {
    pub storage: storage::Model,
    pub total_boxes: u64,
    pub free_boxes: u64,
    pub min_price: Option<f64>,
    pub max_height: Option<f64>,
}

/// Per-facility stats for the listing page
#[derive(Debug, Clone, Serialize)]
pub struct StorageStats {
    pub storage: storage::Model,
    pub total_boxes: u64,
    pub occupied_boxes: u64,
    pub available_boxes: u64,
    pub min_price: Option<f64>,
    pub max_height: Option<f64>,
}

/// Pick a random facility and summarize its box availability.
pub async fn home_summary(db: &DatabaseConnection) -> Result<Option<HomeSummary>, ServiceError> {
    let storages = Storage::find().all(db).await?;

    let Some(storage) = storages.choose(&mut rand::thread_rng()).cloned() else {
        return Ok(None);
    };

    let boxes = StorageBox::find()
        .filter(storage_box::Column::StorageId.eq(storage.id))
        .all(db)
        .await?;

    let total_boxes = boxes.len() as u64;
    let free_boxes = boxes.iter().filter(|b| !b.is_occupied).count() as u64;
    let min_price = boxes.iter().map(|b| b.monthly_price).reduce(f64::min);
    let max_height = boxes.iter().map(|b| b.height).reduce(f64::max);

    Ok(Some(HomeSummary {
        storage,
        total_boxes,
        free_boxes,
        min_price,
        max_height,
    }))
}

/// List every facility with its occupancy stats. A box counts as
/// occupied here when it has an active rental on it.
pub async fn list_storages_with_stats(
    db: &DatabaseConnection,
) -> Result<Vec<StorageStats>, ServiceError> {
    let storages = Storage::find()
        .order_by_asc(storage::Column::Id)
        .all(db)
        .await?;

    let mut result = Vec::with_capacity(storages.len());

    for storage in storages {
        let boxes = StorageBox::find()
            .filter(storage_box::Column::StorageId.eq(storage.id))
            .all(db)
            .await?;

        let box_ids: Vec<i32> = boxes.iter().map(|b| b.id).collect();
        let occupied_boxes = if box_ids.is_empty() {
            0
        } else {
            Rent::find()
                .filter(rent::Column::BoxId.is_in(box_ids))
                .filter(rent::Column::Status.eq("active"))
                .all(db)
                .await?
                .iter()
                .map(|r| r.box_id)
                .collect::<HashSet<_>>()
                .len() as u64
        };

        let total_boxes = boxes.len() as u64;
        let min_price = boxes.iter().map(|b| b.monthly_price).reduce(f64::min);
        let max_height = boxes.iter().map(|b| b.height).reduce(f64::max);

        result.push(StorageStats {
            storage,
            total_boxes,
            occupied_boxes,
            available_boxes: total_boxes - occupied_boxes,
            min_price,
            max_height,
        });
    }

    Ok(result)
}

/// Boxes still offered for rental at a facility. Unknown facilities
/// yield an empty list.
pub async fn free_boxes(
    db: &DatabaseConnection,
    storage_id: i32,
) -> Result<Vec<storage_box::Model>, ServiceError> {
    let boxes = StorageBox::find()
        .filter(storage_box::Column::StorageId.eq(storage_id))
        .filter(storage_box::Column::IsOccupied.eq(false))
        .order_by_asc(storage_box::Column::Number)
        .all(db)
        .await?;

    Ok(boxes)
}
