//! Reminder error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur in the reminder engine.
#[derive(Debug, Error)]
pub enum ReminderError {
    /// Reminder rule not found.
    #[error("Reminder rule not found: {0}")]
    RuleNotFound(Uuid),

    /// Invoice not found or not eligible for a reminder.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(Uuid),

    /// Delivery job could not be enqueued.
    #[error("Failed to enqueue reminder job: {0}")]
    EnqueueFailed(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReminderError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::RuleNotFound(_) => "RULE_NOT_FOUND",
            Self::InvoiceNotFound(_) => "INVOICE_NOT_FOUND",
            Self::EnqueueFailed(_) => "ENQUEUE_FAILED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::RuleNotFound(_) | Self::InvoiceNotFound(_) => 404,
            Self::EnqueueFailed(_) => 502,
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
            ReminderError::EnqueueFailed("queue down".to_string()).error_code(),
            "ENQUEUE_FAILED"
        );
        assert_eq!(
            ReminderError::RuleNotFound(Uuid::nil()).http_status_code(),
            404
        );
    }
}
