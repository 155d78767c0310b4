use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Soft-delete marker stored as a single character.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum ActiveFlag {
    #[default]
    #[sea_orm(string_value = "S")]
    #[serde(rename = "S")]
    Active,
    #[sea_orm(string_value = "N")]
    #[serde(rename = "N")]
    Inactive,
}
