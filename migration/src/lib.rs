//! Database migrations using SeaORM

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_campaigns;
mod m20260301_000002_create_gifts;
mod m20260301_000003_create_responses;
mod m20260301_000004_create_awards;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20260301_000001_create_campaigns::Migration),
      Box::new(m20260301_000002_create_gifts::Migration),
      Box::new(m20260301_000003_create_responses::Migration),
      Box::new(m20260301_000004_create_awards::Migration),
    ]
  }
}
