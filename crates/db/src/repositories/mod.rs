//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Everything except the audit log is read-only.

pub mod audit;
pub mod client;
pub mod conflict;
pub mod referral;

pub use audit::{AuditEntry, AuditLogRepository};
pub use client::ClientRepository;
pub use conflict::ConflictSourceRepository;
pub use referral::{AffiliateStats, ReferralRepository, ReferrerInfo, TreeNode};
