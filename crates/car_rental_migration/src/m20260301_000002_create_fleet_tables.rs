use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CarType::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CarType::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CarType::Name).string_len(50).not_null().unique_key())
                    .col(ColumnDef::new(CarType::Description).text().default("").not_null())
                    .to_owned(),
            )
            .await?;

        // 车型被引用时禁止删除
        manager
            .create_table(
                Table::create()
                    .table(Car::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Car::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Car::Brand).string_len(50).not_null())
                    .col(ColumnDef::new(Car::Model).string_len(50).not_null())
                    .col(ColumnDef::new(Car::CarTypeId).integer().not_null())
                    .col(ColumnDef::new(Car::Year).integer().not_null())
                    .col(ColumnDef::new(Car::DailyPriceCents).big_integer().not_null())
                    .col(ColumnDef::new(Car::Photo).string())
                    .col(ColumnDef::new(Car::Description).text().default("").not_null())
                    .col(ColumnDef::new(Car::Status).string_len(20).default("available").not_null())
                    .col(ColumnDef::new(Car::CreatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_car_car_type")
                            .from(Car::Table, Car::CarTypeId)
                            .to(CarType::Table, CarType::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_car_status")
                    .table(Car::Table)
                    .col(Car::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Car::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(CarType::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum CarType {
    Table,
    Id,
    Name,
    Description,
}

#[derive(DeriveIden)]
pub enum Car {
    Table,
    Id,
    Brand,
    Model,
    CarTypeId,
    Year,
    DailyPriceCents,
    Photo,
    Description,
    Status,
    CreatedAt,
}
