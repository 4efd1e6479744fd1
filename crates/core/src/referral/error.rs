//! Error types for referral lookup validation.

use thiserror::Error;

/// Errors raised before any query executes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferralError {
    /// Search term is shorter than the minimum length.
    #[error("Search term must be at least {min} characters")]
    TermTooShort {
        /// Minimum accepted length.
        min: usize,
    },

    /// Client email was empty after trimming.
    #[error("Email is required")]
    EmailRequired,
}
