//! Demo host schema for development and integration tests.
//!
//! In production the billing schema belongs to the host system and already
//! exists; the seeder and the integration tests need a local stand-in. The
//! demo schema includes every optional capability (legacy referrer column
//! and all auxiliary tables).

use sea_orm::{ConnectionTrait, DbErr};

const HOST_SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS clients (
    id SERIAL PRIMARY KEY,
    first_name VARCHAR(255) NOT NULL,
    last_name VARCHAR(255) NOT NULL,
    company_name VARCHAR(255) NOT NULL DEFAULT '',
    email VARCHAR(255) NOT NULL,
    status VARCHAR(32) NOT NULL DEFAULT 'Active',
    referrer_id INTEGER,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS services (
    id SERIAL PRIMARY KEY,
    client_id INTEGER NOT NULL,
    domain VARCHAR(255),
    status VARCHAR(32) NOT NULL DEFAULT 'Active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS invoices (
    id SERIAL PRIMARY KEY,
    client_id INTEGER NOT NULL,
    status VARCHAR(32) NOT NULL DEFAULT 'Unpaid',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS affiliates (
    id SERIAL PRIMARY KEY,
    client_id INTEGER NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS affiliate_claims (
    id SERIAL PRIMARY KEY,
    affiliate_id INTEGER NOT NULL,
    service_id INTEGER NOT NULL,
    last_paid TIMESTAMPTZ
);

CREATE TABLE IF NOT EXISTS affiliate_history (
    id SERIAL PRIMARY KEY,
    affiliate_id INTEGER NOT NULL,
    client_id INTEGER NOT NULL,
    amount NUMERIC(12, 2) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS affiliate_referrer_entries (
    id SERIAL PRIMARY KEY,
    referrer_client_id INTEGER NOT NULL,
    referred_client_id INTEGER NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS custom_fields (
    id SERIAL PRIMARY KEY,
    field_type VARCHAR(32) NOT NULL,
    field_name VARCHAR(255) NOT NULL
);

CREATE TABLE IF NOT EXISTS custom_field_values (
    id SERIAL PRIMARY KEY,
    field_id INTEGER NOT NULL,
    client_id INTEGER NOT NULL,
    value TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS ticket_replies (
    id SERIAL PRIMARY KEY,
    client_id INTEGER NOT NULL,
    message TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

/// Creates the demo host schema when it does not already exist.
///
/// # Errors
///
/// Returns an error if the schema statements fail.
pub async fn ensure_host_schema(db: &impl ConnectionTrait) -> Result<(), DbErr> {
    db.execute_unprepared(HOST_SCHEMA_SQL).await?;
    Ok(())
}
