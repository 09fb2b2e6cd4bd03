use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};
use tracing::debug;

use crate::entities::batch::{self, Entity as BatchEntity};
use crate::entities::consumption_record::{self, Entity as RecordEntity};
use crate::errors::ServiceError;
use crate::models::{
    Batch, BatchUpdate, BatchWrite, ConsumptionRecord, NewBatch, NewConsumptionRecord,
};
use crate::storage::{BatchStore, RecordStore};

/// sea-orm batch backend. The version check rides on the UPDATE itself
/// (`WHERE id = ? AND version <= ?`), so check-and-write is a single
/// statement regardless of the database behind the pool.
pub struct DbBatchStore {
    db: Arc<DatabaseConnection>,
}

impl DbBatchStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn insert(&self, new: NewBatch) -> Result<Batch, ServiceError> {
        let expiry = new.expiry();
        let batch_code = new.batch_code;
        let row = batch::ActiveModel {
            batch_code: Set(batch_code.clone()),
            received_at: Set(new.received_at),
            shelf_life_days: Set(new.shelf_life_days),
            volume_liters: Set(new.volume_liters),
            fat_percent: Set(new.fat_percent),
            expiry: Set(expiry),
            is_deleted: Set(false),
            version: Set(1),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        // batch_code carries a unique index; both backends report a taken
        // code as Conflict
        .map_err(|err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                ServiceError::Conflict(format!("batch_code {batch_code} already exists"))
            }
            _ => ServiceError::DatabaseError(err),
        })?;

        Ok(row.into())
    }

    async fn update(&self, patch: BatchUpdate) -> Result<Batch, ServiceError> {
        let db = &*self.db;
        let current = BatchEntity::find_by_id(patch.id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("batch {} not found", patch.id)))?;

        // expiry is derived; recompute from the effective field values
        let received_at = patch.received_at.unwrap_or(current.received_at);
        let shelf_life_days = patch.shelf_life_days.unwrap_or(current.shelf_life_days);
        let expiry = received_at + Duration::days(i64::from(shelf_life_days));

        let mut update = BatchEntity::update_many()
            .col_expr(batch::Column::ReceivedAt, Expr::value(received_at))
            .col_expr(batch::Column::ShelfLifeDays, Expr::value(shelf_life_days))
            .col_expr(batch::Column::Expiry, Expr::value(expiry))
            .col_expr(
                batch::Column::Version,
                Expr::value(patch.expected_version + 1),
            );
        if let Some(code) = patch.batch_code {
            update = update.col_expr(batch::Column::BatchCode, Expr::value(code));
        }
        if let Some(volume) = patch.volume_liters {
            update = update.col_expr(batch::Column::VolumeLiters, Expr::value(volume));
        }
        if let Some(fat) = patch.fat_percent {
            update = update.col_expr(batch::Column::FatPercent, Expr::value(fat));
        }

        let result = update
            .filter(batch::Column::Id.eq(patch.id))
            .filter(batch::Column::Version.lte(patch.expected_version))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return match BatchEntity::find_by_id(patch.id).one(db).await? {
                Some(_) => {
                    debug!(batch_id = patch.id, expected_version = patch.expected_version,
                           "version check failed, stored row has advanced");
                    Err(ServiceError::ConcurrentModification(patch.id))
                }
                None => Err(ServiceError::NotFound(format!(
                    "batch {} not found",
                    patch.id
                ))),
            };
        }

        let updated = BatchEntity::find_by_id(patch.id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError(format!("batch {} vanished during update", patch.id))
            })?;
        Ok(updated.into())
    }
}

#[async_trait]
impl BatchStore for DbBatchStore {
    async fn upsert(&self, write: BatchWrite) -> Result<Batch, ServiceError> {
        match write {
            BatchWrite::Insert(new) => self.insert(new).await,
            BatchWrite::Update(patch) => self.update(patch).await,
        }
    }

    async fn read_by_id(&self, id: i64) -> Result<Option<Batch>, ServiceError> {
        let row = BatchEntity::find_by_id(id)
            .filter(batch::Column::IsDeleted.eq(false))
            .filter(batch::Column::VolumeLiters.gt(0.0))
            .filter(batch::Column::Expiry.gt(Utc::now()))
            .one(&*self.db)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn list_all_available(&self) -> Result<Vec<Batch>, ServiceError> {
        let rows = BatchEntity::find()
            .filter(batch::Column::IsDeleted.eq(false))
            .filter(batch::Column::VolumeLiters.gt(0.0))
            .filter(batch::Column::Expiry.gt(Utc::now()))
            .all(&*self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_all_between_dates(
        &self,
        min: DateTime<Utc>,
        max: DateTime<Utc>,
    ) -> Result<Vec<Batch>, ServiceError> {
        let rows = BatchEntity::find()
            .filter(batch::Column::IsDeleted.eq(false))
            .filter(batch::Column::VolumeLiters.gt(0.0))
            .filter(batch::Column::Expiry.gt(Utc::now()))
            .filter(batch::Column::Expiry.gte(min))
            .filter(batch::Column::Expiry.lte(max))
            .all(&*self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn soft_delete(&self, id: i64) -> Result<(), ServiceError> {
        let result = BatchEntity::update_many()
            .col_expr(batch::Column::IsDeleted, Expr::value(true))
            .filter(batch::Column::Id.eq(id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("batch {id} not found")));
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Batch>, ServiceError> {
        let rows = BatchEntity::find().all(&*self.db).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// sea-orm consumption record backend.
pub struct DbRecordStore {
    db: Arc<DatabaseConnection>,
}

impl DbRecordStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordStore for DbRecordStore {
    async fn insert(
        &self,
        record: NewConsumptionRecord,
    ) -> Result<ConsumptionRecord, ServiceError> {
        let row = consumption_record::ActiveModel {
            batch_id: Set(record.batch_id),
            consumed_at: Set(record.consumed_at),
            order_id: Set(record.order_id),
            qty: Set(record.qty),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        Ok(row.into())
    }

    async fn list_all(&self) -> Result<Vec<ConsumptionRecord>, ServiceError> {
        let rows = RecordEntity::find().all(&*self.db).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
