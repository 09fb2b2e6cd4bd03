use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    /// Batch codes look like `SCH-20251204-0001`.
    pub static ref BATCH_CODE_RE: Regex = Regex::new(r"^[A-Z]{3}-\d{8}-\d{4}$").unwrap();
}

/// A stored batch of product. Returned by value from the storage layer;
/// mutating a `Batch` never changes stored state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: i64,
    pub batch_code: String,
    pub received_at: DateTime<Utc>,
    pub shelf_life_days: i32,
    pub volume_liters: f64,
    pub fat_percent: Option<f64>,
    pub expiry: DateTime<Utc>,
    pub is_deleted: bool,
    /// Optimistic-lock token, starts at 1 and increments on every update.
    pub version: i32,
}

impl Batch {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry <= now
    }

    /// Available batches are the only ones visible to non-admin reads.
    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        self.volume_liters > 0.0 && !self.is_deleted && now < self.expiry
    }

    /// Partial update that replaces the volume, conditioned on the version
    /// this copy was read at.
    pub fn with_volume(&self, volume_liters: f64) -> BatchWrite {
        let mut update = BatchUpdate::new(self.id, self.version);
        update.volume_liters = Some(volume_liters);
        BatchWrite::Update(update)
    }
}

/// Fields for a batch that does not exist yet. Id and version are assigned
/// by storage on insert.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewBatch {
    #[validate(regex = "BATCH_CODE_RE")]
    pub batch_code: String,
    pub received_at: DateTime<Utc>,
    #[validate(range(min = 1, max = 30))]
    pub shelf_life_days: i32,
    #[validate(range(min = 0.0))]
    pub volume_liters: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub fat_percent: Option<f64>,
}

impl NewBatch {
    pub fn expiry(&self) -> DateTime<Utc> {
        self.received_at + Duration::days(i64::from(self.shelf_life_days))
    }
}

/// Version-checked partial update. `None` fields are left untouched by the
/// store; the update is rejected when the stored version has advanced past
/// `expected_version`.
#[derive(Debug, Clone)]
pub struct BatchUpdate {
    pub id: i64,
    pub expected_version: i32,
    pub batch_code: Option<String>,
    pub received_at: Option<DateTime<Utc>>,
    pub shelf_life_days: Option<i32>,
    pub volume_liters: Option<f64>,
    pub fat_percent: Option<f64>,
}

impl BatchUpdate {
    pub fn new(id: i64, expected_version: i32) -> Self {
        Self {
            id,
            expected_version,
            batch_code: None,
            received_at: None,
            shelf_life_days: None,
            volume_liters: None,
            fat_percent: None,
        }
    }
}

/// The single write entry point of [`crate::storage::BatchStore`].
#[derive(Debug, Clone)]
pub enum BatchWrite {
    Insert(NewBatch),
    Update(BatchUpdate),
}
