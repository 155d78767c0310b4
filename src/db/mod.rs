use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{motorcycles, roles, users};

pub mod migrator;
pub mod repositories;

pub use repositories::motorcycle::MotorcycleFields;
pub use repositories::resource::SoftDeletable;
pub use repositories::role::RoleFields;
pub use repositories::user::UserFields;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

fn is_memory_url(db_url: &str) -> bool {
    db_url.trim_start_matches("sqlite:").starts_with(":memory:")
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let memory = is_memory_url(db_url);
        if !memory {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        // Every connection to an in-memory SQLite URL opens its own empty database.
        if memory {
            opt.max_connections(1).min_connections(1);
        } else {
            opt.max_connections(max_connections)
                .min_connections(min_connections)
                .idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn resource_repo<E>(&self) -> repositories::resource::ResourceRepository<E>
    where
        E: SoftDeletable,
        E::Model: Sync,
    {
        repositories::resource::ResourceRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn role_repo(&self) -> repositories::role::RoleRepository {
        repositories::role::RoleRepository::new(self.conn.clone())
    }

    fn motorcycle_repo(&self) -> repositories::motorcycle::MotorcycleRepository {
        repositories::motorcycle::MotorcycleRepository::new(self.conn.clone())
    }

    // ========== Shared Resource Methods ==========

    pub async fn list_active<E>(&self, page: u64, page_size: u64) -> Result<(Vec<E::Model>, u64)>
    where
        E: SoftDeletable,
        E::Model: Sync,
    {
        self.resource_repo::<E>().list_active(page, page_size).await
    }

    pub async fn find_active<E>(&self, id: i32) -> Result<Option<E::Model>>
    where
        E: SoftDeletable,
        E::Model: Sync,
    {
        self.resource_repo::<E>().find_active(id).await
    }

    pub async fn soft_delete<E>(&self, id: i32) -> Result<bool>
    where
        E: SoftDeletable,
        E::Model: Sync,
    {
        self.resource_repo::<E>().soft_delete(id).await
    }

    // ========== User Repository Methods ==========

    pub async fn create_user(&self, fields: UserFields) -> Result<users::Model> {
        self.user_repo().insert(fields).await
    }

    pub async fn update_user(&self, id: i32, fields: UserFields) -> Result<bool> {
        self.user_repo().update(id, fields).await
    }

    pub async fn user_exists(&self, id: i32) -> Result<bool> {
        self.user_repo().exists(id).await
    }

    pub async fn find_active_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<users::Model>> {
        self.user_repo().find_active_by_username(username).await
    }

    pub async fn find_active_role_name(&self, user_id: i32) -> Result<Option<String>> {
        self.user_repo().find_active_role_name(user_id).await
    }

    pub async fn role_is_active(&self, role_id: i32) -> Result<bool> {
        self.user_repo().role_is_active(role_id).await
    }

    // ========== Role Repository Methods ==========

    pub async fn create_role(&self, fields: RoleFields) -> Result<roles::Model> {
        self.role_repo().insert(fields).await
    }

    pub async fn update_role(&self, id: i32, fields: RoleFields) -> Result<bool> {
        self.role_repo().update(id, fields).await
    }

    pub async fn find_role_by_name(&self, name: &str) -> Result<Option<roles::Model>> {
        self.role_repo().find_by_name(name).await
    }

    // ========== Motorcycle Repository Methods ==========

    pub async fn create_motorcycle(&self, fields: MotorcycleFields) -> Result<motorcycles::Model> {
        self.motorcycle_repo().insert(fields).await
    }

    pub async fn update_motorcycle(&self, id: i32, fields: MotorcycleFields) -> Result<bool> {
        self.motorcycle_repo().update(id, fields).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ActiveFlag;

    async fn memory_store() -> Store {
        Store::new("sqlite::memory:").await.unwrap()
    }

    fn bike(plate: &str) -> MotorcycleFields {
        MotorcycleFields {
            year: 2022,
            model: "Mottu Sport 110i".to_string(),
            plate: plate.to_string(),
        }
    }

    #[test]
    fn test_memory_url_detection() {
        assert!(is_memory_url("sqlite::memory:"));
        assert!(is_memory_url(":memory:"));
        assert!(!is_memory_url("sqlite:data/motofleet.db"));
    }

    #[tokio::test]
    async fn test_roles_are_seeded() {
        let store = memory_store().await;
        let (roles, total) = store.list_active::<roles::Entity>(1, 10).await.unwrap();

        assert_eq!(total, 2);
        assert_eq!(roles[0].name, "ADMIN");
        assert_eq!(roles[1].name, "USER");
        assert_eq!(roles[0].created_at, "2023-01-01T10:00:00+00:00");
        assert!(roles.iter().all(|r| r.active == ActiveFlag::Active));
    }

    #[tokio::test]
    async fn test_list_active_windows_and_skips_inactive() {
        let store = memory_store().await;
        for i in 0..7 {
            store.create_motorcycle(bike(&format!("ABC{i}"))).await.unwrap();
        }
        assert!(store.soft_delete::<motorcycles::Entity>(2).await.unwrap());

        let (page, total) = store.list_active::<motorcycles::Entity>(2, 3).await.unwrap();
        assert_eq!(total, 6);
        let ids: Vec<i32> = page.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![5, 6, 7]);

        let (beyond, total) = store.list_active::<motorcycles::Entity>(9, 3).await.unwrap();
        assert!(beyond.is_empty());
        assert_eq!(total, 6);
    }

    #[tokio::test]
    async fn test_list_active_far_past_the_end() {
        let store = memory_store().await;
        store.create_motorcycle(bike("FAR1")).await.unwrap();

        let page = u64::try_from(i64::MAX).unwrap();
        let (items, total) = store
            .list_active::<motorcycles::Entity>(page, 1000)
            .await
            .unwrap();
        assert!(items.is_empty());
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_user_exists_ignores_active_flag() {
        let store = memory_store().await;
        let user = store
            .create_user(UserFields {
                username: "carol".to_string(),
                email: "carol@example.com".to_string(),
                password_hash: "hash".to_string(),
                role_id: 2,
            })
            .await
            .unwrap();

        assert!(store.user_exists(user.id).await.unwrap());
        store.soft_delete::<users::Entity>(user.id).await.unwrap();
        assert!(store.user_exists(user.id).await.unwrap());
        assert!(!store.user_exists(999).await.unwrap());
    }

    #[tokio::test]
    async fn test_soft_delete_is_not_repeatable() {
        let store = memory_store().await;
        let created = store.create_motorcycle(bike("XYZ1")).await.unwrap();

        assert!(store.soft_delete::<motorcycles::Entity>(created.id).await.unwrap());
        assert!(!store.soft_delete::<motorcycles::Entity>(created.id).await.unwrap());
        assert!(!store.soft_delete::<motorcycles::Entity>(999).await.unwrap());
        assert!(
            store
                .find_active::<motorcycles::Entity>(created.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_inactive_motorcycle_cannot_be_updated() {
        let store = memory_store().await;
        let created = store.create_motorcycle(bike("OLD1")).await.unwrap();

        assert!(store.update_motorcycle(created.id, bike("NEW1")).await.unwrap());
        let updated = store
            .find_active::<motorcycles::Entity>(created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.plate, "NEW1");
        assert_eq!(updated.created_at, created.created_at);

        store.soft_delete::<motorcycles::Entity>(created.id).await.unwrap();
        assert!(!store.update_motorcycle(created.id, bike("NEW2")).await.unwrap());
    }

    #[tokio::test]
    async fn test_role_name_resolution() {
        let store = memory_store().await;
        let user = store
            .create_user(UserFields {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: "hash".to_string(),
                role_id: 2,
            })
            .await
            .unwrap();

        assert_eq!(
            store.find_active_role_name(user.id).await.unwrap().as_deref(),
            Some("USER")
        );
        assert!(store.find_active_role_name(999).await.unwrap().is_none());

        store.soft_delete::<roles::Entity>(2).await.unwrap();
        assert!(store.find_active_role_name(user.id).await.unwrap().is_none());
        assert!(!store.role_is_active(2).await.unwrap());
    }

    #[tokio::test]
    async fn test_username_lookup_is_exact_and_active_only() {
        let store = memory_store().await;
        let user = store
            .create_user(UserFields {
                username: "Bob".to_string(),
                email: "bob@example.com".to_string(),
                password_hash: "hash".to_string(),
                role_id: 1,
            })
            .await
            .unwrap();

        assert!(store.find_active_user_by_username("Bob").await.unwrap().is_some());
        assert!(store.find_active_user_by_username("bob").await.unwrap().is_none());

        store.soft_delete::<users::Entity>(user.id).await.unwrap();
        assert!(store.find_active_user_by_username("Bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_user_requires_existing_role() {
        let store = memory_store().await;
        let result = store
            .create_user(UserFields {
                username: "ghost".to_string(),
                email: "ghost@example.com".to_string(),
                password_hash: "hash".to_string(),
                role_id: 42,
            })
            .await;

        assert!(result.is_err());
    }
}
