use sea_orm_migration::prelude::*;

mod m20260801_000001_create_students;
mod m20260801_000002_create_companies;
mod m20260801_000003_create_reset_codes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_create_students::Migration),
            Box::new(m20260801_000002_create_companies::Migration),
            Box::new(m20260801_000003_create_reset_codes::Migration),
        ]
    }
}
