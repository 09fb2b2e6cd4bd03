pub use sea_orm_migration::prelude::*;

mod m20251204_000001_create_batches_table;
mod m20251204_000002_create_consumption_records_table;
mod m20251204_000003_seed_initial_batches;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251204_000001_create_batches_table::Migration),
            Box::new(m20251204_000002_create_consumption_records_table::Migration),
            Box::new(m20251204_000003_seed_initial_batches::Migration),
        ]
    }
}
