use sea_orm::entity::prelude::*;

/// 系统账号，客户与管理员共用
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub is_client: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::client_profile::Entity")]
    ClientProfile,
}

impl Related<super::client_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientProfile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
