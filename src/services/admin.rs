use std::sync::Arc;

use crate::errors::ServiceError;
use crate::models::{Batch, ConsumptionRecord};
use crate::storage::{BatchStore, RecordStore};

/// Read-only aggregator for operational inspection. No business rules;
/// listings are unrestricted and include deleted, depleted and expired rows.
#[derive(Clone)]
pub struct AdminService {
    batches: Arc<dyn BatchStore>,
    records: Arc<dyn RecordStore>,
}

impl AdminService {
    pub fn new(batches: Arc<dyn BatchStore>, records: Arc<dyn RecordStore>) -> Self {
        Self { batches, records }
    }

    pub async fn list_all_batches(&self) -> Result<Vec<Batch>, ServiceError> {
        self.batches.list_all().await
    }

    pub async fn list_all_records(&self) -> Result<Vec<ConsumptionRecord>, ServiceError> {
        self.records.list_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BatchWrite, NewBatch};
    use crate::storage::{MemoryBatchStore, MemoryRecordStore};
    use chrono::Utc;

    #[tokio::test]
    async fn admin_listing_sees_deleted_batches() {
        let batches = Arc::new(MemoryBatchStore::new());
        let records = Arc::new(MemoryRecordStore::new());
        let admin = AdminService::new(batches.clone(), records);

        let batch = batches
            .upsert(BatchWrite::Insert(NewBatch {
                batch_code: "SCH-20251204-0001".into(),
                received_at: Utc::now(),
                shelf_life_days: 7,
                volume_liters: 100.0,
                fat_percent: None,
            }))
            .await
            .unwrap();
        batches.soft_delete(batch.id).await.unwrap();

        assert!(batches.list_all_available().await.unwrap().is_empty());
        let all = admin.list_all_batches().await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].is_deleted);
    }
}
