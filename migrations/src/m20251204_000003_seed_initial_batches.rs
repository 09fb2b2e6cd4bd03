use chrono::{Duration, Utc};
use sea_orm_migration::prelude::*;

use crate::m20251204_000001_create_batches_table::Batches;

/// Two demo batches for bootstrap environments. Not part of any caller
/// contract; tests create their own data.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = Utc::now();
        let seeds: [(&str, i32, f64, f64); 2] = [
            ("SCH-20251204-0001", 7, 1000.0, 3.5),
            ("SCH-20251204-0002", 14, 2000.0, 5.2),
        ];

        for (code, shelf_life_days, volume, fat) in seeds {
            let insert = Query::insert()
                .into_table(Batches::Table)
                .columns([
                    Batches::BatchCode,
                    Batches::ReceivedAt,
                    Batches::ShelfLifeDays,
                    Batches::VolumeLiters,
                    Batches::FatPercent,
                    Batches::Expiry,
                    Batches::IsDeleted,
                    Batches::Version,
                ])
                .values_panic([
                    code.into(),
                    now.into(),
                    shelf_life_days.into(),
                    volume.into(),
                    fat.into(),
                    (now + Duration::days(shelf_life_days as i64)).into(),
                    false.into(),
                    1.into(),
                ])
                .to_owned();
            manager.exec_stmt(insert).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(Batches::Table)
            .and_where(
                Expr::col(Batches::BatchCode)
                    .is_in(["SCH-20251204-0001", "SCH-20251204-0002"]),
            )
            .to_owned();
        manager.exec_stmt(delete).await?;
        Ok(())
    }
}
