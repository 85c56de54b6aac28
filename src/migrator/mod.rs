use sea_orm_migration::prelude::*;

mod m20260801_000001_create_catalog;
mod m20260801_000002_create_thresholds;
mod m20260802_000001_create_alerts;
mod m20260802_000002_create_schedule_rules;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_create_catalog::Migration),
            Box::new(m20260801_000002_create_thresholds::Migration),
            Box::new(m20260802_000001_create_alerts::Migration),
            Box::new(m20260802_000002_create_schedule_rules::Migration),
        ]
    }
}
