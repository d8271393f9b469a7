use sea_orm::entity::prelude::*;

use crate::custom_type::RentalStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "rental")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub client_id: i32,
    pub car_id: i32,
    pub start_date: Date,
    pub expected_end_date: Date,
    pub actual_end_date: Option<Date>,
    pub deposit_cents: i64,
    pub daily_cost_cents: i64,
    pub total_cost_cents: i64,
    pub status: RentalStatus,
    /// 0 无损伤，1 轻微，2 中等，3 严重
    pub damage_level: i32,
    pub late_days: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl Model {
    /// 租赁天数（含首尾两天），未归还时按 today 计算
    pub fn days_rented(&self, today: Date) -> i64 {
        let end = self.actual_end_date.unwrap_or(today);
        (end - self.start_date).num_days() + 1
    }

    pub fn is_overdue(&self, today: Date) -> bool {
        self.status == RentalStatus::Active && today > self.expected_end_date
    }

    /// 统计口径中的结束日期：优先实际归还日期
    pub fn end_date(&self) -> Date {
        self.actual_end_date.unwrap_or(self.expected_end_date)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client_profile::Entity",
        from = "Column::ClientId",
        to = "super::client_profile::Column::Id",
        on_delete = "Cascade"
    )]
    ClientProfile,
    #[sea_orm(
        belongs_to = "super::car::Entity",
        from = "Column::CarId",
        to = "super::car::Column::Id",
        on_delete = "Restrict"
    )]
    Car,
    #[sea_orm(has_many = "super::fine::Entity")]
    Fine,
    #[sea_orm(has_many = "super::payment::Entity")]
    Payment,
}

impl Related<super::client_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientProfile.def()
    }
}

impl Related<super::car::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Car.def()
    }
}

impl Related<super::fine::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fine.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
