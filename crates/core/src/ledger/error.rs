//! Ledger error types.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Entry amount must be positive.
    #[error("Ledger entry amount must be positive")]
    NonPositiveAmount,

    /// Statement range start must not be after the end.
    #[error("Invalid statement range: {start} is after {end}")]
    InvalidDateRange {
        /// Requested range start.
        start: NaiveDate,
        /// Requested range end.
        end: NaiveDate,
    },

    /// Student not found in this organization.
    #[error("Student not found: {0}")]
    StudentNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::StudentNotFound(_) => "STUDENT_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NonPositiveAmount | Self::InvalidDateRange { .. } => 400,
            Self::StudentNotFound(_) => 404,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::NonPositiveAmount.error_code(),
            "NON_POSITIVE_AMOUNT"
        );
        assert_eq!(
            LedgerError::StudentNotFound(Uuid::nil()).error_code(),
            "STUDENT_NOT_FOUND"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::NonPositiveAmount.http_status_code(), 400);
        assert_eq!(LedgerError::StudentNotFound(Uuid::nil()).http_status_code(), 404);
        assert_eq!(
            LedgerError::Database("test".to_string()).http_status_code(),
            500
        );
    }
}
