//! 访客计数表迁移
//!
//! 创建 `visitor_counts` 表：以日期为主键，保证每天至多一行，
//! 使 upsert-increment 可以依赖主键冲突完成原子累加。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VisitorCounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VisitorCounts::VisitDate)
                            .date()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VisitorCounts::VisitCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VisitorCounts::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum VisitorCounts {
    #[sea_orm(iden = "visitor_counts")]
    Table,
    VisitDate,
    VisitCount,
}
