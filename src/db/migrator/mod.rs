use sea_orm_migration::prelude::*;

mod m20250523_initial;
mod m20251001_add_motorcycles;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250523_initial::Migration),
            Box::new(m20251001_add_motorcycles::Migration),
        ]
    }
}
