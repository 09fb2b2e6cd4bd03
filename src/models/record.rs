use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    /// Order references look like `ORDER-20251204-1234`.
    pub static ref ORDER_ID_RE: Regex = Regex::new(r"^[A-Z]{5}-\d{8}-\d{4}$").unwrap();
}

/// Audit entry for one successful debit against a batch. Immutable once
/// inserted; never updated or deleted by normal operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    pub id: i64,
    pub batch_id: i64,
    pub consumed_at: DateTime<Utc>,
    pub order_id: Option<String>,
    pub qty: f64,
}

/// Record fields before storage assigns an id.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewConsumptionRecord {
    pub batch_id: i64,
    pub consumed_at: DateTime<Utc>,
    #[validate(regex = "ORDER_ID_RE")]
    pub order_id: Option<String>,
    #[validate(range(min = 0.0))]
    pub qty: f64,
}
