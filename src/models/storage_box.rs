use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "boxes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub number: String,
    pub storage_id: i32,
    pub level: i32,
    pub height: f64,
    pub width: f64,
    pub length: f64,
    pub area: f64, // recomputed as width * length on save
    pub monthly_price: f64,
    pub is_occupied: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::storage::Entity",
        from = "Column::StorageId",
        to = "super::storage::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Storage,
    #[sea_orm(has_many = "super::rent::Entity")]
    Rents,
}

impl Related<super::storage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Storage.def()
    }
}

impl Related<super::rent::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
