use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuditLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditLog::AuditLogId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AuditLog::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(AuditLog::IdentityId).uuid().null())
                    .col(ColumnDef::new(AuditLog::Username).string().null())
                    .col(ColumnDef::new(AuditLog::EventTypeId).uuid().not_null())
                    .col(ColumnDef::new(AuditLog::EventParams).json_binary().not_null())
                    .to_owned(),
            )
            .await?;

        for (name, col) in [
            ("idx_audit_log_identity_id", AuditLog::IdentityId),
            ("idx_audit_log_username", AuditLog::Username),
            ("idx_audit_log_created_at", AuditLog::CreatedAt),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(AuditLog::Table)
                        .col(col)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditLog::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AuditLog {
    Table,
    AuditLogId,
    CreatedAt,
    IdentityId,
    Username,
    EventTypeId,
    EventParams,
}
