//! Referral conflict analysis.
//!
//! This module provides pure business logic for deciding whether more than
//! one affiliate is credited for the same client:
//! - Candidate normalization and noise filtering
//! - Deduplication by affiliate email
//! - Severity classification against a configurable threshold

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ReferralError;
pub use service::{ConflictAnalyzer, not_found_suggestions, validate_client_email, validate_search_term};
pub use types::*;
