use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ResetCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ResetCodes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ResetCodes::Code).string().not_null())
                    .col(ColumnDef::new(ResetCodes::Email).string())
                    .col(ColumnDef::new(ResetCodes::Phone).string())
                    .col(ColumnDef::new(ResetCodes::Method).string().not_null())
                    .col(
                        ColumnDef::new(ResetCodes::PrincipalKind)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResetCodes::IsUsed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ResetCodes::VerificationToken).string())
                    .col(
                        ColumnDef::new(ResetCodes::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResetCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(ResetCodes::Table)
                    .col(ResetCodes::Code)
                    .name("idx_reset_codes_code")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(ResetCodes::Table)
                    .col(ResetCodes::Email)
                    .name("idx_reset_codes_email")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(ResetCodes::Table)
                    .col(ResetCodes::Phone)
                    .name("idx_reset_codes_phone")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(ResetCodes::Table)
                    .col(ResetCodes::VerificationToken)
                    .name("idx_reset_codes_verification_token")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ResetCodes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ResetCodes {
    Table,
    Id,
    Code,
    Email,
    Phone,
    Method,
    PrincipalKind,
    IsUsed,
    VerificationToken,
    ExpiresAt,
    CreatedAt,
}
