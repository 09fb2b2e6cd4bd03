//! Domain value types shared by the service layer, storage backends and the
//! HTTP boundary. Storage-managed fields (`id`, `version`, `is_deleted`,
//! `expiry`) have no public constructors or setters; they change only through
//! the store's conditional upsert path.

pub mod batch;
pub mod record;
pub mod time;

pub use batch::{Batch, BatchUpdate, BatchWrite, NewBatch};
pub use record::{ConsumptionRecord, NewConsumptionRecord};
