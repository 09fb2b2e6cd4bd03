pub mod admin;
pub mod batches;

pub use admin::AdminService;
pub use batches::{BatchService, RetryConfig};
