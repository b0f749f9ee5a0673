pub use sea_orm_migration::prelude::*;

pub mod collections;

mod m20250614_000001_create_collections;
mod m20250614_123131_update_weddingcakeinquiry_create_rule;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250614_000001_create_collections::Migration),
            Box::new(m20250614_123131_update_weddingcakeinquiry_create_rule::Migration),
        ]
    }
}
