use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "consumption_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub batch_id: i64,
    pub consumed_at: DateTimeUtc,
    pub order_id: Option<String>,
    pub qty: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::batch::Entity",
        from = "Column::BatchId",
        to = "super::batch::Column::Id",
        on_delete = "Cascade"
    )]
    Batch,
}

impl Related<super::batch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Batch.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for models::ConsumptionRecord {
    fn from(row: Model) -> Self {
        models::ConsumptionRecord {
            id: row.id,
            batch_id: row.batch_id,
            consumed_at: row.consumed_at,
            order_id: row.order_id,
            qty: row.qty,
        }
    }
}
