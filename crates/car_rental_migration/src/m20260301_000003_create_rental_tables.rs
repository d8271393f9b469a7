use sea_orm_migration::prelude::*;

use crate::m20260301_000001_create_user_tables::ClientProfile;
use crate::m20260301_000002_create_fleet_tables::Car;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rental::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rental::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rental::ClientId).integer().not_null())
                    .col(ColumnDef::new(Rental::CarId).integer().not_null())
                    .col(ColumnDef::new(Rental::StartDate).date().not_null())
                    .col(ColumnDef::new(Rental::ExpectedEndDate).date().not_null())
                    .col(ColumnDef::new(Rental::ActualEndDate).date())
                    .col(ColumnDef::new(Rental::DepositCents).big_integer().not_null())
                    .col(ColumnDef::new(Rental::DailyCostCents).big_integer().not_null())
                    .col(ColumnDef::new(Rental::TotalCostCents).big_integer().default(0).not_null())
                    .col(ColumnDef::new(Rental::Status).string_len(20).default("pending").not_null())
                    .col(ColumnDef::new(Rental::DamageLevel).integer().default(0).not_null())
                    .col(ColumnDef::new(Rental::LateDays).integer().default(0).not_null())
                    .col(ColumnDef::new(Rental::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Rental::UpdatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rental_client")
                            .from(Rental::Table, Rental::ClientId)
                            .to(ClientProfile::Table, ClientProfile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rental_car")
                            .from(Rental::Table, Rental::CarId)
                            .to(Car::Table, Car::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Fine::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Fine::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Fine::RentalId).integer().not_null())
                    .col(ColumnDef::new(Fine::Reason).string_len(200).not_null())
                    .col(ColumnDef::new(Fine::AmountCents).big_integer().not_null())
                    .col(ColumnDef::new(Fine::CreatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fine_rental")
                            .from(Fine::Table, Fine::RentalId)
                            .to(Rental::Table, Rental::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payment::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payment::RentalId).integer().not_null())
                    .col(ColumnDef::new(Payment::PaymentType).string_len(20).not_null())
                    .col(ColumnDef::new(Payment::AmountCents).big_integer().not_null())
                    .col(ColumnDef::new(Payment::CreatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_rental")
                            .from(Payment::Table, Payment::RentalId)
                            .to(Rental::Table, Rental::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Payment::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Fine::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Rental::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum Rental {
    Table,
    Id,
    ClientId,
    CarId,
    StartDate,
    ExpectedEndDate,
    ActualEndDate,
    DepositCents,
    DailyCostCents,
    TotalCostCents,
    Status,
    DamageLevel,
    LateDays,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Fine {
    Table,
    Id,
    RentalId,
    Reason,
    AmountCents,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Payment {
    Table,
    Id,
    RentalId,
    PaymentType,
    AmountCents,
    CreatedAt,
}
