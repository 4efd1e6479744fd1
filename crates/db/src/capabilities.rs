//! One-shot probing of optional host-schema surface.
//!
//! The host billing schema varies between installations: the legacy
//! `referrer_id` column and several auxiliary tables may or may not exist.
//! Instead of introspecting per request, the probe runs once at startup and
//! the flags ride along in application state. A missing capability makes the
//! corresponding evidence source report itself unavailable.

use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, Statement};

/// Which optional parts of the host schema are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaCapabilities {
    /// `clients.referrer_id` exists.
    pub legacy_referrer_column: bool,
    /// `affiliate_referrer_entries` exists.
    pub referrer_entries: bool,
    /// `affiliate_history` exists.
    pub affiliate_history: bool,
    /// `custom_fields` and `custom_field_values` both exist.
    pub custom_fields: bool,
    /// `ticket_replies` exists.
    pub ticket_replies: bool,
}

impl SchemaCapabilities {
    /// Probes the connected database once.
    ///
    /// # Errors
    ///
    /// Returns an error only when the catalog queries themselves fail;
    /// absent tables and columns are expected outcomes, not errors.
    pub async fn detect(db: &impl ConnectionTrait) -> Result<Self, DbErr> {
        Ok(Self {
            legacy_referrer_column: column_exists(db, "clients", "referrer_id").await?,
            referrer_entries: table_exists(db, "affiliate_referrer_entries").await?,
            affiliate_history: table_exists(db, "affiliate_history").await?,
            custom_fields: table_exists(db, "custom_fields").await?
                && table_exists(db, "custom_field_values").await?,
            ticket_replies: table_exists(db, "ticket_replies").await?,
        })
    }

    /// All optional surface present; handy for tests and demo schemas.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            legacy_referrer_column: true,
            referrer_entries: true,
            affiliate_history: true,
            custom_fields: true,
            ticket_replies: true,
        }
    }

    /// No optional surface present.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            legacy_referrer_column: false,
            referrer_entries: false,
            affiliate_history: false,
            custom_fields: false,
            ticket_replies: false,
        }
    }
}

async fn table_exists(db: &impl ConnectionTrait, table: &str) -> Result<bool, DbErr> {
    let row = db
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT 1 FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name = $1",
            [table.into()],
        ))
        .await?;
    Ok(row.is_some())
}

async fn column_exists(db: &impl ConnectionTrait, table: &str, column: &str) -> Result<bool, DbErr> {
    let row = db
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT 1 FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = $1 AND column_name = $2",
            [table.into(), column.into()],
        ))
        .await?;
    Ok(row.is_some())
}
