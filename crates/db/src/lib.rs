//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the host billing schema (read-only)
//!   and the owned audit-log table
//! - Repository abstractions for data access
//! - One-shot schema-capability probing for optional tables and columns
//! - Migrations for the owned audit-log table

pub mod bootstrap;
pub mod capabilities;
pub mod entities;
pub mod migration;
pub mod repositories;

pub use capabilities::SchemaCapabilities;
pub use repositories::{
    AuditLogRepository, ClientRepository, ConflictSourceRepository, ReferralRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
