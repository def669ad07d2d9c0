use sea_orm_migration::prelude::*;

mod m0001_create_audit_log;

pub use sea_orm_migration::MigratorTrait;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m0001_create_audit_log::Migration)]
    }
}
