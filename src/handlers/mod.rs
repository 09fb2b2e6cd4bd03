pub mod admin;
pub mod batches;
