use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::errors::ServiceError;
use crate::models::{Batch, BatchWrite, NewBatch, NewConsumptionRecord};
use crate::storage::{BatchStore, RecordStore};

/// Retry budget for the optimistic consume loop. Backoff is linear:
/// after attempt n the loop sleeps `n * base_delay`.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
        }
    }
}

/// Business rules for batches. Holds no state of its own; all mutation goes
/// through the version-checked store upsert.
#[derive(Clone)]
pub struct BatchService {
    batches: Arc<dyn BatchStore>,
    records: Arc<dyn RecordStore>,
    retry: RetryConfig,
}

impl BatchService {
    pub fn new(batches: Arc<dyn BatchStore>, records: Arc<dyn RecordStore>) -> Self {
        Self::with_retry(batches, records, RetryConfig::default())
    }

    pub fn with_retry(
        batches: Arc<dyn BatchStore>,
        records: Arc<dyn RecordStore>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            batches,
            records,
            retry,
        }
    }

    #[instrument(skip(self, new), fields(batch_code = %new.batch_code))]
    pub async fn create(&self, new: NewBatch) -> Result<Batch, ServiceError> {
        new.validate()?;
        let batch = self.batches.upsert(BatchWrite::Insert(new)).await?;
        info!(batch_id = batch.id, "batch created");
        Ok(batch)
    }

    pub async fn read_by_id(&self, batch_id: i64) -> Result<Batch, ServiceError> {
        self.batches
            .read_by_id(batch_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("batch {batch_id} not found")))
    }

    pub async fn list_all(&self) -> Result<Vec<Batch>, ServiceError> {
        self.batches.list_all_available().await
    }

    /// Available batches expiring within the next `n_days` days.
    pub async fn list_near_expiry(&self, n_days: i64) -> Result<Vec<Batch>, ServiceError> {
        if n_days < 1 {
            return Err(ServiceError::ValidationError(
                "n_days must be at least 1".into(),
            ));
        }
        let now = Utc::now();
        self.batches
            .list_all_between_dates(now, now + ChronoDuration::days(n_days))
            .await
    }

    /// Debit `qty` liters from a batch.
    ///
    /// Optimistic read-modify-write: overdraw is rejected outright (retrying
    /// against the same state would fail identically), while a version
    /// conflict means another writer won the race, so the loop re-reads and
    /// tries again up to the budget. Exhausting the budget surfaces as
    /// [`ServiceError::Conflict`], a transient error the caller may retry.
    #[instrument(skip(self, order_id))]
    pub async fn consume(
        &self,
        batch_id: i64,
        qty: f64,
        order_id: Option<String>,
    ) -> Result<Batch, ServiceError> {
        let record_template = NewConsumptionRecord {
            batch_id,
            consumed_at: Utc::now(),
            order_id,
            qty,
        };
        record_template.validate()?;

        let mut attempt = 0;
        loop {
            attempt += 1;

            let batch = self.read_by_id(batch_id).await?;
            let new_volume = batch.volume_liters - qty;
            if new_volume < 0.0 {
                return Err(ServiceError::InsufficientVolume(format!(
                    "cannot consume {qty} L from batch {batch_id}; {} L available",
                    batch.volume_liters
                )));
            }

            match self.batches.upsert(batch.with_volume(new_volume)).await {
                Ok(updated) => {
                    // The consumption is durably complete only once the audit
                    // record exists; an insert failure must surface.
                    let record = NewConsumptionRecord {
                        consumed_at: Utc::now(),
                        ..record_template.clone()
                    };
                    self.records.insert(record).await?;
                    info!(
                        batch_id,
                        qty,
                        volume_left = updated.volume_liters,
                        attempts = attempt,
                        "consumption applied"
                    );
                    return Ok(updated);
                }
                Err(ServiceError::ConcurrentModification(_)) => {
                    if attempt >= self.retry.max_attempts {
                        warn!(
                            batch_id,
                            attempts = attempt,
                            "retry budget exhausted under contention"
                        );
                        return Err(ServiceError::Conflict(format!(
                            "batch {batch_id} is locked, try again later"
                        )));
                    }
                    let delay = self.retry.base_delay * attempt;
                    debug!(batch_id, attempt, ?delay, "version conflict, backing off");
                    sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Soft delete. Idempotent at this boundary: unknown ids are ignored.
    #[instrument(skip(self))]
    pub async fn delete(&self, batch_id: i64) -> Result<(), ServiceError> {
        match self.batches.soft_delete(batch_id).await {
            Ok(()) => {
                info!(batch_id, "batch soft-deleted");
                Ok(())
            }
            Err(ServiceError::NotFound(_)) => {
                debug!(batch_id, "delete of unknown batch ignored");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
