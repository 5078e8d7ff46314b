use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: Option<i32>,
    pub email: String,
    pub box_id: i32,
    pub start_date: String,
    pub end_date: String,
    pub status: String, // 'created', 'active', 'completed', 'cancelled', 'expired'
    pub pickup_address: Option<String>,
    pub total_price: f64,
    pub is_delivery_needed: bool,
    pub is_partial_pickup_allowed: bool,
    pub task_ids: String, // JSON array of scheduled job ids
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::storage_box::Entity",
        from = "Column::BoxId",
        to = "super::storage_box::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Box,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    User,
}

impl Related<super::storage_box::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Box.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Serialize, Deserialize)]
pub struct RentDto {
    pub email: String,
    pub box_id: i32,
    pub start_date: String,
    pub end_date: String,
    pub pickup_address: Option<String>,
    pub is_partial_pickup_allowed: Option<bool>,
}
