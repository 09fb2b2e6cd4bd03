pub mod batch;
pub mod consumption_record;
