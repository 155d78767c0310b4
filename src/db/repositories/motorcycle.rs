use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, Set,
};

use crate::entities::{ActiveFlag, motorcycles};

/// Writable motorcycle fields.
#[derive(Debug, Clone)]
pub struct MotorcycleFields {
    pub year: i32,
    pub model: String,
    pub plate: String,
}

pub struct MotorcycleRepository {
    conn: DatabaseConnection,
}

impl MotorcycleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, fields: MotorcycleFields) -> Result<motorcycles::Model> {
        let model = motorcycles::ActiveModel {
            id: NotSet,
            year: Set(fields.year),
            model: Set(fields.model),
            plate: Set(fields.plate),
            active: Set(ActiveFlag::Active),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        model
            .insert(&self.conn)
            .await
            .context("Failed to insert motorcycle")
    }

    /// Overwrites every writable field of an active motorcycle.
    ///
    /// Returns `false` when the row is missing or soft-deleted.
    pub async fn update(&self, id: i32, fields: MotorcycleFields) -> Result<bool> {
        let result = motorcycles::Entity::update_many()
            .col_expr(motorcycles::Column::Year, Expr::value(fields.year))
            .col_expr(motorcycles::Column::Model, Expr::value(fields.model))
            .col_expr(motorcycles::Column::Plate, Expr::value(fields.plate))
            .filter(motorcycles::Column::Id.eq(id))
            .filter(motorcycles::Column::Active.eq(ActiveFlag::Active))
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to update motorcycle {id}"))?;

        Ok(result.rows_affected == 1)
    }
}
