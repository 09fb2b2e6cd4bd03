use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "batches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub batch_code: String,
    pub received_at: DateTimeUtc,
    pub shelf_life_days: i32,
    pub volume_liters: f64,
    pub fat_percent: Option<f64>,
    pub expiry: DateTimeUtc,
    pub is_deleted: bool,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::consumption_record::Entity")]
    ConsumptionRecord,
}

impl Related<super::consumption_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ConsumptionRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for models::Batch {
    fn from(row: Model) -> Self {
        models::Batch {
            id: row.id,
            batch_code: row.batch_code,
            received_at: row.received_at,
            shelf_life_days: row.shelf_life_days,
            volume_liters: row.volume_liters,
            fat_percent: row.fat_percent,
            expiry: row.expiry,
            is_deleted: row.is_deleted,
            version: row.version,
        }
    }
}
