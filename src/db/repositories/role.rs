use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, Set,
};

use crate::entities::{ActiveFlag, roles};

/// Writable role fields.
#[derive(Debug, Clone)]
pub struct RoleFields {
    pub name: String,
    pub description: String,
}

pub struct RoleRepository {
    conn: DatabaseConnection,
}

impl RoleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, fields: RoleFields) -> Result<roles::Model> {
        let model = roles::ActiveModel {
            id: NotSet,
            name: Set(fields.name),
            description: Set(fields.description),
            active: Set(ActiveFlag::Active),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        model.insert(&self.conn).await.context("Failed to insert role")
    }

    /// Overwrites every writable field. Returns `false` if no row has this id.
    pub async fn update(&self, id: i32, fields: RoleFields) -> Result<bool> {
        let result = roles::Entity::update_many()
            .col_expr(roles::Column::Name, Expr::value(fields.name))
            .col_expr(roles::Column::Description, Expr::value(fields.description))
            .filter(roles::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to update role {id}"))?;

        Ok(result.rows_affected == 1)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<roles::Model>> {
        roles::Entity::find()
            .filter(roles::Column::Name.eq(name))
            .filter(roles::Column::Active.eq(ActiveFlag::Active))
            .one(&self.conn)
            .await
            .context("Failed to query role by name")
    }
}
