//! Audit-log migration.
//!
//! Creates the append-only table recording admin referral lookups.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(AUDIT_LOG_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS referral_audit_log;")
            .await?;
        Ok(())
    }
}

const AUDIT_LOG_SQL: &str = r"
-- Append-only trail of admin referral lookups
CREATE TABLE referral_audit_log (
    id SERIAL PRIMARY KEY,
    admin_id INTEGER NOT NULL,
    admin_name VARCHAR(100) NOT NULL,
    client_id INTEGER NOT NULL,
    action VARCHAR(50) NOT NULL,
    search_term VARCHAR(255),
    ip_address VARCHAR(45) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Index for per-admin review
CREATE INDEX idx_referral_audit_admin ON referral_audit_log(admin_id);

-- Index for per-client review
CREATE INDEX idx_referral_audit_client ON referral_audit_log(client_id);

-- Index for time-ranged review
CREATE INDEX idx_referral_audit_created ON referral_audit_log(created_at);
";
