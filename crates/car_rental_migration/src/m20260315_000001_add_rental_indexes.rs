use sea_orm_migration::prelude::*;

use crate::m20260301_000003_create_rental_tables::{Fine, Payment, Rental};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 日期冲突检查按 (car_id, status, start_date, expected_end_date) 过滤
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_rental_car_status_dates")
                    .table(Rental::Table)
                    .col(Rental::CarId)
                    .col(Rental::Status)
                    .col(Rental::StartDate)
                    .col(Rental::ExpectedEndDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_rental_client_id")
                    .table(Rental::Table)
                    .col(Rental::ClientId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_fine_rental_id")
                    .table(Fine::Table)
                    .col(Fine::RentalId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_payment_rental_type")
                    .table(Payment::Table)
                    .col(Payment::RentalId)
                    .col(Payment::PaymentType)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_payment_rental_type").table(Payment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_fine_rental_id").table(Fine::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_rental_client_id").table(Rental::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_rental_car_status_dates").table(Rental::Table).to_owned())
            .await
    }
}
