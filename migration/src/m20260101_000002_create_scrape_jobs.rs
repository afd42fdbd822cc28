use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ScrapeJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScrapeJobs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ScrapeJobs::Url).string().not_null())
                    .col(ColumnDef::new(ScrapeJobs::DisplayName).string().not_null())
                    .col(ColumnDef::new(ScrapeJobs::NetworkLayer).string().not_null())
                    .col(
                        ColumnDef::new(ScrapeJobs::RequiresProxy)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ScrapeJobs::Status).string().not_null())
                    .col(
                        ColumnDef::new(ScrapeJobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(ScrapeJobs::StartedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(ScrapeJobs::CompletedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ScrapeJobs::AddressesExtracted)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ScrapeJobs::AddressesNew)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ScrapeJobs::FetchAttempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ScrapeJobs::FailureKind).string())
                    .col(ColumnDef::new(ScrapeJobs::Error).text())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_scrape_jobs_created_at")
                    .table(ScrapeJobs::Table)
                    .col(ScrapeJobs::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScrapeJobs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ScrapeJobs {
    Table,
    Id,
    Url,
    DisplayName,
    NetworkLayer,
    RequiresProxy,
    Status,
    CreatedAt,
    StartedAt,
    CompletedAt,
    AddressesExtracted,
    AddressesNew,
    FetchAttempts,
    FailureKind,
    Error,
}
