use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::errors::ServiceError;
use crate::models::{
    Batch, BatchUpdate, BatchWrite, ConsumptionRecord, NewBatch, NewConsumptionRecord,
};
use crate::storage::{BatchStore, RecordStore};

/// In-process batch backend. A single mutex guards the table, so the version
/// check and the write happen atomically; the version token still carries the
/// concurrency semantics so this backend is interchangeable with the
/// database-backed one.
pub struct MemoryBatchStore {
    state: Mutex<BatchTable>,
}

struct BatchTable {
    rows: BTreeMap<i64, Batch>,
    next_id: i64,
}

impl MemoryBatchStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BatchTable {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Pre-populated with the same two demo batches the seed migration
    /// creates for the database backend.
    pub fn seeded() -> Self {
        let store = Self::new();
        {
            let mut table = store.lock();
            let now = Utc::now();
            for (code, shelf_life_days, volume, fat) in [
                ("SCH-20251204-0001", 7, 1000.0, 3.5),
                ("SCH-20251204-0002", 14, 2000.0, 5.2),
            ] {
                let id = table.next_id;
                table.next_id += 1;
                table.rows.insert(
                    id,
                    Batch {
                        id,
                        batch_code: code.to_string(),
                        received_at: now,
                        shelf_life_days,
                        volume_liters: volume,
                        fat_percent: Some(fat),
                        expiry: now + Duration::days(i64::from(shelf_life_days)),
                        is_deleted: false,
                        version: 1,
                    },
                );
            }
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, BatchTable> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn insert_locked(table: &mut BatchTable, new: NewBatch) -> Result<Batch, ServiceError> {
        // batch_code is unique across all rows, soft-deleted included
        if table.rows.values().any(|b| b.batch_code == new.batch_code) {
            return Err(ServiceError::Conflict(format!(
                "batch_code {} already exists",
                new.batch_code
            )));
        }
        let id = table.next_id;
        table.next_id += 1;
        let batch = Batch {
            id,
            batch_code: new.batch_code.clone(),
            received_at: new.received_at,
            shelf_life_days: new.shelf_life_days,
            volume_liters: new.volume_liters,
            fat_percent: new.fat_percent,
            expiry: new.expiry(),
            is_deleted: false,
            version: 1,
        };
        table.rows.insert(id, batch.clone());
        Ok(batch)
    }

    fn update_locked(table: &mut BatchTable, patch: BatchUpdate) -> Result<Batch, ServiceError> {
        let stored = table
            .rows
            .get_mut(&patch.id)
            .ok_or_else(|| ServiceError::NotFound(format!("batch {} not found", patch.id)))?;

        if stored.version > patch.expected_version {
            return Err(ServiceError::ConcurrentModification(patch.id));
        }

        if let Some(code) = patch.batch_code {
            stored.batch_code = code;
        }
        if let Some(received_at) = patch.received_at {
            stored.received_at = received_at;
        }
        if let Some(days) = patch.shelf_life_days {
            stored.shelf_life_days = days;
        }
        if let Some(volume) = patch.volume_liters {
            stored.volume_liters = volume;
        }
        if let Some(fat) = patch.fat_percent {
            stored.fat_percent = Some(fat);
        }
        stored.expiry = stored.received_at + Duration::days(i64::from(stored.shelf_life_days));
        stored.version = patch.expected_version + 1;

        Ok(stored.clone())
    }
}

impl Default for MemoryBatchStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BatchStore for MemoryBatchStore {
    async fn upsert(&self, write: BatchWrite) -> Result<Batch, ServiceError> {
        let mut table = self.lock();
        match write {
            BatchWrite::Insert(new) => Self::insert_locked(&mut table, new),
            BatchWrite::Update(patch) => Self::update_locked(&mut table, patch),
        }
    }

    async fn read_by_id(&self, id: i64) -> Result<Option<Batch>, ServiceError> {
        let now = Utc::now();
        let table = self.lock();
        Ok(table
            .rows
            .get(&id)
            .filter(|batch| batch.is_available(now))
            .cloned())
    }

    async fn list_all_available(&self) -> Result<Vec<Batch>, ServiceError> {
        let now = Utc::now();
        let table = self.lock();
        Ok(table
            .rows
            .values()
            .filter(|batch| batch.is_available(now))
            .cloned()
            .collect())
    }

    async fn list_all_between_dates(
        &self,
        min: DateTime<Utc>,
        max: DateTime<Utc>,
    ) -> Result<Vec<Batch>, ServiceError> {
        let now = Utc::now();
        let table = self.lock();
        Ok(table
            .rows
            .values()
            .filter(|batch| batch.is_available(now) && min <= batch.expiry && batch.expiry <= max)
            .cloned()
            .collect())
    }

    async fn soft_delete(&self, id: i64) -> Result<(), ServiceError> {
        let mut table = self.lock();
        let stored = table
            .rows
            .get_mut(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("batch {id} not found")))?;
        stored.is_deleted = true;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Batch>, ServiceError> {
        let table = self.lock();
        Ok(table.rows.values().cloned().collect())
    }
}

/// In-process consumption record backend.
pub struct MemoryRecordStore {
    state: Mutex<RecordTable>,
}

struct RecordTable {
    rows: Vec<ConsumptionRecord>,
    next_id: i64,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RecordTable {
                rows: Vec::new(),
                next_id: 1,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RecordTable> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(
        &self,
        record: NewConsumptionRecord,
    ) -> Result<ConsumptionRecord, ServiceError> {
        let mut table = self.lock();
        let id = table.next_id;
        table.next_id += 1;
        let stored = ConsumptionRecord {
            id,
            batch_id: record.batch_id,
            consumed_at: record.consumed_at,
            order_id: record.order_id,
            qty: record.qty,
        };
        table.rows.push(stored.clone());
        Ok(stored)
    }

    async fn list_all(&self) -> Result<Vec<ConsumptionRecord>, ServiceError> {
        Ok(self.lock().rows.clone())
    }
}
