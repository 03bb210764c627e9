//! Reconciliation error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while recording, applying, or reversing payments.
#[derive(Debug, Error)]
pub enum ReconciliationError {
    /// The invoice belongs to another organization.
    #[error("Invoice {0} does not belong to this organization")]
    WrongOrganization(Uuid),

    /// Payments cannot be applied to a cancelled invoice.
    #[error("Invoice {0} is cancelled")]
    InvoiceCancelled(Uuid),

    /// Payment amount must be positive.
    #[error("Payment amount must be positive")]
    NonPositiveAmount,

    /// Payment exceeds the invoice's outstanding amount.
    #[error("Payment of {amount} exceeds outstanding {outstanding}; split payments are not supported")]
    Overpayment {
        /// Submitted amount.
        amount: Decimal,
        /// Current outstanding on the invoice.
        outstanding: Decimal,
    },

    /// The invoice has no outstanding amount left.
    #[error("Invoice {0} is already settled")]
    AlreadySettled(Uuid),

    /// A payment with the same idempotency key was already submitted.
    #[error("Duplicate payment submission")]
    DuplicatePayment,

    /// The payment is not in a state that allows this operation.
    #[error("Payment {id} is {status}, expected {expected}")]
    InvalidPaymentState {
        /// The payment.
        id: Uuid,
        /// Its current status.
        status: String,
        /// The status the operation requires.
        expected: String,
    },

    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(Uuid),

    /// Payment not found.
    #[error("Payment not found: {0}")]
    PaymentNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReconciliationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::WrongOrganization(_) => "WRONG_ORGANIZATION",
            Self::InvoiceCancelled(_) => "INVOICE_CANCELLED",
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::AlreadySettled(_) => "ALREADY_SETTLED",
            Self::DuplicatePayment => "DUPLICATE_PAYMENT",
            Self::InvalidPaymentState { .. } => "INVALID_PAYMENT_STATE",
            Self::InvoiceNotFound(_) => "INVOICE_NOT_FOUND",
            Self::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NonPositiveAmount
            | Self::Overpayment { .. }
            | Self::AlreadySettled(_)
            | Self::InvoiceCancelled(_) => 400,
            Self::WrongOrganization(_) => 403,
            Self::InvoiceNotFound(_) | Self::PaymentNotFound(_) => 404,
            Self::DuplicatePayment | Self::InvalidPaymentState { .. } => 409,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ReconciliationError::DuplicatePayment.error_code(),
            "DUPLICATE_PAYMENT"
        );
        assert_eq!(
            ReconciliationError::Overpayment {
                amount: dec!(100),
                outstanding: dec!(50),
            }
            .error_code(),
            "OVERPAYMENT"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(ReconciliationError::DuplicatePayment.http_status_code(), 409);
        assert_eq!(
            ReconciliationError::WrongOrganization(Uuid::nil()).http_status_code(),
            403
        );
        assert_eq!(
            ReconciliationError::InvoiceNotFound(Uuid::nil()).http_status_code(),
            404
        );
    }
}
