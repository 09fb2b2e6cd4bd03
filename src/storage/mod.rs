//! Storage ports and their two backends.
//!
//! Both backends must agree on observable semantics; the shared conformance
//! suite in `tests/storage_conformance_test.rs` holds them to that. Every
//! returned value is a copy of stored state; the only mutation path is the
//! version-checked [`BatchStore::upsert`].

pub mod database;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::ServiceError;
use crate::models::{Batch, BatchWrite, ConsumptionRecord, NewConsumptionRecord};

pub use database::{DbBatchStore, DbRecordStore};
pub use memory::{MemoryBatchStore, MemoryRecordStore};

/// Persistence port for batches.
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Insert ([`BatchWrite::Insert`]) or version-checked partial update
    /// ([`BatchWrite::Update`]).
    ///
    /// Inserts assign the id and start the version at 1. Updates apply only
    /// the fields the caller set, recompute `expiry` when `received_at` or
    /// `shelf_life_days` changes, and store `expected_version + 1`; when the
    /// stored version has already advanced past `expected_version` the write
    /// is rejected with [`ServiceError::ConcurrentModification`].
    async fn upsert(&self, write: BatchWrite) -> Result<Batch, ServiceError>;

    /// Available-only lookup. `Ok(None)` when the batch is unknown, deleted,
    /// depleted or expired.
    async fn read_by_id(&self, id: i64) -> Result<Option<Batch>, ServiceError>;

    async fn list_all_available(&self) -> Result<Vec<Batch>, ServiceError>;

    /// Available batches whose expiry falls within `[min, max]`.
    async fn list_all_between_dates(
        &self,
        min: DateTime<Utc>,
        max: DateTime<Utc>,
    ) -> Result<Vec<Batch>, ServiceError>;

    /// Marks the batch deleted without touching its version. Repeat deletes
    /// of a known id are no-ops; an unknown id is `NotFound`.
    async fn soft_delete(&self, id: i64) -> Result<(), ServiceError>;

    /// Unrestricted listing for administrative visibility; includes deleted,
    /// depleted and expired rows.
    async fn list_all(&self) -> Result<Vec<Batch>, ServiceError>;
}

/// Persistence port for consumption records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(
        &self,
        record: NewConsumptionRecord,
    ) -> Result<ConsumptionRecord, ServiceError>;

    async fn list_all(&self) -> Result<Vec<ConsumptionRecord>, ServiceError>;
}
