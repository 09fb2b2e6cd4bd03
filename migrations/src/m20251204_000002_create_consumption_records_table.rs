use sea_orm_migration::prelude::*;

use crate::m20251204_000001_create_batches_table::Batches;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ConsumptionRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConsumptionRecords::Id)
                            .big_integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConsumptionRecords::BatchId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConsumptionRecords::ConsumedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConsumptionRecords::OrderId)
                            .string_len(64)
                            .null(),
                    )
                    .col(ColumnDef::new(ConsumptionRecords::Qty).double().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_consumption_records_batch_id")
                            .from(ConsumptionRecords::Table, ConsumptionRecords::BatchId)
                            .to(Batches::Table, Batches::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_consumption_records_batch_id")
                    .table(ConsumptionRecords::Table)
                    .col(ConsumptionRecords::BatchId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ConsumptionRecords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ConsumptionRecords {
    Table,
    Id,
    BatchId,
    ConsumedAt,
    OrderId,
    Qty,
}
