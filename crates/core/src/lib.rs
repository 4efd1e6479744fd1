//! Core business logic for Reflens.
//!
//! Pure, synchronous logic with no web or database dependencies:
//! - Referral conflict analysis (candidate normalization, dedup, severity)
//! - Input validation for lookup operations

pub mod referral;
