//! Posting error types.

use tahsil_shared::types::BillingPeriod;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during posting.
#[derive(Debug, Error)]
pub enum PostingError {
    /// Another non-superseded run already exists for this period and scope.
    #[error("A posting run already exists for {period}")]
    DuplicateRun {
        /// The period a run already covers.
        period: BillingPeriod,
    },

    /// No active monthly billing rules matched the requested scope.
    #[error("No eligible billing rules for {period}")]
    NoEligibleRules {
        /// The requested period.
        period: BillingPeriod,
    },

    /// Posting run not found.
    #[error("Posting run not found: {0}")]
    RunNotFound(Uuid),

    /// Only a failed run can be superseded.
    #[error("Posting run {0} is not in a failed state")]
    RunNotFailed(Uuid),

    /// An invoice for this (student, period, rule) already exists.
    #[error("Invoice already exists for student {student_id} in {period}")]
    DuplicateInvoice {
        /// The already-billed student.
        student_id: Uuid,
        /// The period.
        period: BillingPeriod,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PostingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateRun { .. } => "DUPLICATE_RUN",
            Self::NoEligibleRules { .. } => "NO_ELIGIBLE_RULES",
            Self::RunNotFound(_) => "RUN_NOT_FOUND",
            Self::RunNotFailed(_) => "RUN_NOT_FAILED",
            Self::DuplicateInvoice { .. } => "DUPLICATE_INVOICE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NoEligibleRules { .. } | Self::RunNotFailed(_) => 422,
            Self::DuplicateRun { .. } | Self::DuplicateInvoice { .. } => 409,
            Self::RunNotFound(_) => 404,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }
}
