//! Routing error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during bank account routing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// The manual override account is unknown, inactive, or belongs to
    /// another organization.
    #[error("Override bank account {0} is not an active account of this organization")]
    OverrideNotFound(Uuid),

    /// Campus-only mode and the campus has no active primary account.
    #[error("Campus {0} has no primary bank account and fallback is disabled")]
    NoCampusAccount(Uuid),

    /// No active primary account anywhere in the permitted chain.
    #[error("No eligible bank account found for campus {0}")]
    NoEligibleAccount(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl RoutingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::OverrideNotFound(_) => "OVERRIDE_NOT_FOUND",
            Self::NoCampusAccount(_) => "NO_CAMPUS_ACCOUNT",
            Self::NoEligibleAccount(_) => "NO_ELIGIBLE_ACCOUNT",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::OverrideNotFound(_) => 404,
            Self::NoCampusAccount(_) | Self::NoEligibleAccount(_) => 422,
            Self::Database(_) => 500,
        }
    }
}
