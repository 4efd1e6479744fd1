//! Shared types, errors, and configuration for Reflens.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;

pub use config::{AppConfig, LookupConfig};
pub use error::{AppError, AppResult};
