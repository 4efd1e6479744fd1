//! `SeaORM` entities for the host billing schema and the owned audit log.
//!
//! Everything except `audit_log` belongs to the host billing system and is
//! only ever read by this service.

pub mod affiliate_claims;
pub mod affiliate_history;
pub mod affiliate_referrer_entries;
pub mod affiliates;
pub mod audit_log;
pub mod clients;
pub mod custom_field_values;
pub mod custom_fields;
pub mod invoices;
pub mod services;
pub mod ticket_replies;
