use crate::entities::prelude::*;
use crate::entities::{ActiveFlag, roles};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ActiveEnum, Schema};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Creation timestamp shared by the built-in roles.
const SEED_CREATED_AT: &str = "2023-01-01T10:00:00+00:00";

const SEED_ROLES: [(&str, &str); 2] = [
    ("ADMIN", "Full system access"),
    ("USER", "Restricted system access"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Roles)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // users.role_id references roles(id) ON DELETE RESTRICT
        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        let mut insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Roles)
            .columns([
                roles::Column::Name,
                roles::Column::Description,
                roles::Column::Active,
                roles::Column::CreatedAt,
            ])
            .to_owned();

        for (name, description) in SEED_ROLES {
            insert.values_panic([
                name.into(),
                description.into(),
                ActiveFlag::Active.to_value().into(),
                SEED_CREATED_AT.into(),
            ]);
        }

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Roles).to_owned())
            .await?;

        Ok(())
    }
}
