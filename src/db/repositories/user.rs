use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QuerySelect, Set,
};

use crate::entities::{ActiveFlag, roles, users};

/// Writable user fields. The password is already hashed.
#[derive(Debug, Clone)]
pub struct UserFields {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: i32,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, fields: UserFields) -> Result<users::Model> {
        let model = users::ActiveModel {
            id: NotSet,
            username: Set(fields.username),
            email: Set(fields.email),
            password_hash: Set(fields.password_hash),
            active: Set(ActiveFlag::Active),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            role_id: Set(fields.role_id),
        };

        model.insert(&self.conn).await.context("Failed to insert user")
    }

    /// Overwrites every writable field. Returns `false` if no row has this id.
    pub async fn update(&self, id: i32, fields: UserFields) -> Result<bool> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::Username, Expr::value(fields.username))
            .col_expr(users::Column::Email, Expr::value(fields.email))
            .col_expr(users::Column::PasswordHash, Expr::value(fields.password_hash))
            .col_expr(users::Column::RoleId, Expr::value(fields.role_id))
            .filter(users::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to update user {id}"))?;

        Ok(result.rows_affected == 1)
    }

    /// Whether a row with this id exists, active or not.
    pub async fn exists(&self, id: i32) -> Result<bool> {
        let count = users::Entity::find_by_id(id)
            .count(&self.conn)
            .await
            .with_context(|| format!("Failed to check user {id}"))?;

        Ok(count > 0)
    }

    /// Exact, case-sensitive username match over active users.
    pub async fn find_active_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .filter(users::Column::Active.eq(ActiveFlag::Active))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")
    }

    /// Name of the active role linked to the user, if any.
    pub async fn find_active_role_name(&self, user_id: i32) -> Result<Option<String>> {
        let name: Option<String> = roles::Entity::find()
            .inner_join(users::Entity)
            .filter(users::Column::Id.eq(user_id))
            .filter(roles::Column::Active.eq(ActiveFlag::Active))
            .select_only()
            .column(roles::Column::Name)
            .into_tuple()
            .one(&self.conn)
            .await
            .context("Failed to resolve role for user")?;

        Ok(name.filter(|n| !n.trim().is_empty()))
    }

    pub async fn role_is_active(&self, role_id: i32) -> Result<bool> {
        let count = roles::Entity::find()
            .filter(roles::Column::Id.eq(role_id))
            .filter(roles::Column::Active.eq(ActiveFlag::Active))
            .count(&self.conn)
            .await
            .context("Failed to check role")?;

        Ok(count > 0)
    }
}
