use sea_orm::entity::prelude::*;

/// 损伤或逾期罚款
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "fine")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub rental_id: i32,
    pub reason: String,
    pub amount_cents: i64,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rental::Entity",
        from = "Column::RentalId",
        to = "super::rental::Column::Id",
        on_delete = "Cascade"
    )]
    Rental,
}

impl Related<super::rental::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rental.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
