//! Shared types, errors, and configuration for Tahsil.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Billing period arithmetic
//! - The trusted finance scope supplied by the authorization layer
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod scope;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use scope::FinanceScope;
