use super::active_flag::ActiveFlag;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "motorcycles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub year: i32,

    pub model: String,

    pub plate: String,

    pub active: ActiveFlag,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
