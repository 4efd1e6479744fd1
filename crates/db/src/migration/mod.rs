//! Database migrations.
//!
//! Only the owned audit-log table is migrated; the host billing schema
//! belongs to the host system.

pub use sea_orm_migration::prelude::*;

mod m20260801_000001_audit_log;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260801_000001_audit_log::Migration)]
    }
}
