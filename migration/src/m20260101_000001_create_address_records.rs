use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AddressRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AddressRecords::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AddressRecords::Address).string().not_null())
                    .col(ColumnDef::new(AddressRecords::Currency).string().not_null())
                    .col(ColumnDef::new(AddressRecords::SourceUrl).string().not_null())
                    .col(ColumnDef::new(AddressRecords::SourceName).string().not_null())
                    .col(
                        ColumnDef::new(AddressRecords::FirstSeen)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AddressRecords::LastSeen)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AddressRecords::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AddressRecords::Category).string())
                    .col(
                        ColumnDef::new(AddressRecords::RiskScore)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AddressRecords::Balance)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(AddressRecords::TransactionCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(AddressRecords::Tags).json().not_null())
                    .col(ColumnDef::new(AddressRecords::Notes).text())
                    .col(
                        ColumnDef::new(AddressRecords::IsWatched)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // Concurrent jobs rely on this constraint to converge on one record
        manager
            .create_index(
                Index::create()
                    .name("uq_address_records_address")
                    .table(AddressRecords::Table)
                    .col(AddressRecords::Address)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_address_records_currency")
                    .table(AddressRecords::Table)
                    .col(AddressRecords::Currency)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AddressRecords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AddressRecords {
    Table,
    Id,
    Address,
    Currency,
    SourceUrl,
    SourceName,
    FirstSeen,
    LastSeen,
    LastUpdated,
    Category,
    RiskScore,
    Balance,
    TransactionCount,
    Tags,
    Notes,
    IsWatched,
}
