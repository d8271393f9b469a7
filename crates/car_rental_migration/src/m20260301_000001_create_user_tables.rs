use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(User::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(User::Username).string_len(150).not_null().unique_key())
                    .col(ColumnDef::new(User::Email).string_len(254).not_null().unique_key())
                    .col(ColumnDef::new(User::PasswordHash).string().not_null())
                    .col(ColumnDef::new(User::IsClient).boolean().default(false).not_null())
                    .col(ColumnDef::new(User::IsSuperuser).boolean().default(false).not_null())
                    .col(ColumnDef::new(User::IsActive).boolean().default(true).not_null())
                    .col(ColumnDef::new(User::CreatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        // 客户资料与账号一对一，删除账号时级联删除
        manager
            .create_table(
                Table::create()
                    .table(ClientProfile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClientProfile::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClientProfile::UserId).integer().not_null().unique_key())
                    .col(ColumnDef::new(ClientProfile::FullName).string_len(200).not_null())
                    .col(ColumnDef::new(ClientProfile::Address).text().not_null())
                    .col(ColumnDef::new(ClientProfile::Phone).string_len(20).not_null())
                    .col(ColumnDef::new(ClientProfile::IsBlocked).boolean().default(false).not_null())
                    .col(ColumnDef::new(ClientProfile::CreatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_profile_user")
                            .from(ClientProfile::Table, ClientProfile::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClientProfile::Table).to_owned())
            .await?;
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum User {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    IsClient,
    IsSuperuser,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum ClientProfile {
    Table,
    Id,
    UserId,
    FullName,
    Address,
    Phone,
    IsBlocked,
    CreatedAt,
}
