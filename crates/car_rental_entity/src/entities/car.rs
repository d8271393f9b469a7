use sea_orm::entity::prelude::*;

use crate::custom_type::CarStatus;

/// 车队中的一辆车
///
/// 金额统一以分为单位存储，避免 SQLite 浮点误差
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "car")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub brand: String,
    pub model: String,
    pub car_type_id: i32,
    pub year: i32,
    pub daily_price_cents: i64,
    pub photo: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub status: CarStatus,
    pub created_at: String,
}

impl Model {
    pub fn is_available(&self) -> bool {
        self.status == CarStatus::Available
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::car_type::Entity",
        from = "Column::CarTypeId",
        to = "super::car_type::Column::Id",
        on_delete = "Restrict"
    )]
    CarType,
    #[sea_orm(has_many = "super::rental::Entity")]
    Rental,
}

impl Related<super::car_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CarType.def()
    }
}

impl Related<super::rental::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rental.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
