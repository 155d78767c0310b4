use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use std::marker::PhantomData;

use crate::entities::{ActiveFlag, motorcycles, roles, users};

/// An entity whose rows are never physically removed, only flagged inactive.
pub trait SoftDeletable: EntityTrait {
    /// Human readable name used in error context.
    const NAME: &'static str;

    fn id_column() -> Self::Column;

    fn active_column() -> Self::Column;
}

impl SoftDeletable for users::Entity {
    const NAME: &'static str = "user";

    fn id_column() -> Self::Column {
        users::Column::Id
    }

    fn active_column() -> Self::Column {
        users::Column::Active
    }
}

impl SoftDeletable for roles::Entity {
    const NAME: &'static str = "role";

    fn id_column() -> Self::Column {
        roles::Column::Id
    }

    fn active_column() -> Self::Column {
        roles::Column::Active
    }
}

impl SoftDeletable for motorcycles::Entity {
    const NAME: &'static str = "motorcycle";

    fn id_column() -> Self::Column {
        motorcycles::Column::Id
    }

    fn active_column() -> Self::Column {
        motorcycles::Column::Active
    }
}

/// List, lookup and soft-delete shared by every resource table.
pub struct ResourceRepository<E> {
    conn: DatabaseConnection,
    _entity: PhantomData<E>,
}

impl<E> ResourceRepository<E>
where
    E: SoftDeletable,
    E::Model: Sync,
{
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn,
            _entity: PhantomData,
        }
    }

    /// One window of active rows ordered by id, plus the total active count.
    ///
    /// `page` is 1-based. Pages past the end yield an empty window without
    /// querying, which also keeps the offset within SQLite's signed range.
    pub async fn list_active(&self, page: u64, page_size: u64) -> Result<(Vec<E::Model>, u64)> {
        let query = E::find()
            .filter(E::active_column().eq(ActiveFlag::Active))
            .order_by_asc(E::id_column());

        let total = query
            .clone()
            .count(&self.conn)
            .await
            .with_context(|| format!("Failed to count active {} rows", E::NAME))?;

        let offset = page.saturating_sub(1).saturating_mul(page_size);
        if offset >= total {
            return Ok((Vec::new(), total));
        }

        let items = query
            .offset(offset)
            .limit(page_size)
            .all(&self.conn)
            .await
            .with_context(|| format!("Failed to list active {} rows", E::NAME))?;

        Ok((items, total))
    }

    pub async fn find_active(&self, id: i32) -> Result<Option<E::Model>> {
        E::find()
            .filter(E::id_column().eq(id))
            .filter(E::active_column().eq(ActiveFlag::Active))
            .one(&self.conn)
            .await
            .with_context(|| format!("Failed to query {} {id}", E::NAME))
    }

    /// Flips an active row to inactive in a single conditional update.
    ///
    /// Returns `false` when the row is missing or already inactive.
    pub async fn soft_delete(&self, id: i32) -> Result<bool> {
        let result = E::update_many()
            .col_expr(E::active_column(), Expr::value(ActiveFlag::Inactive))
            .filter(E::id_column().eq(id))
            .filter(E::active_column().eq(ActiveFlag::Active))
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to soft-delete {} {id}", E::NAME))?;

        Ok(result.rows_affected == 1)
    }
}
