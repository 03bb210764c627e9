//! Payment domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tahsil_shared::types::{BankAccountId, InvoiceId, OrganizationId, PaymentRecordId};

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentChannel {
    /// Over-the-counter cash.
    Cash,
    /// Bank transfer.
    BankTransfer,
    /// Cheque.
    Cheque,
    /// Online gateway.
    Online,
}

impl PaymentChannel {
    /// Stable wire name, also used in the idempotency key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::BankTransfer => "BANK_TRANSFER",
            Self::Cheque => "CHEQUE",
            Self::Online => "ONLINE",
        }
    }
}

/// Lifecycle of a payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Recorded but not applied to an invoice.
    Pending,
    /// Applied to an invoice.
    Reconciled,
    /// Could not be applied; terminal.
    Failed,
    /// Applied and then reversed.
    Refunded,
}

/// A recorded payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Payment ID.
    pub id: PaymentRecordId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Invoice the payment targets, once known.
    pub invoice_id: Option<InvoiceId>,
    /// Bank account the money landed in, when known.
    pub bank_account_id: Option<BankAccountId>,
    /// Paid amount (positive).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Payment channel.
    pub channel: PaymentChannel,
    /// Current status.
    pub status: PaymentStatus,
    /// External transaction reference, when supplied.
    pub transaction_ref: Option<String>,
    /// Deterministic duplicate-submission guard for manual entries.
    pub idempotency_key: Option<String>,
    /// When the money was paid.
    pub paid_at: DateTime<Utc>,
    /// Why the payment failed, for Failed records.
    pub failure_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_wire_names() {
        assert_eq!(PaymentChannel::Cash.as_str(), "CASH");
        assert_eq!(PaymentChannel::BankTransfer.as_str(), "BANK_TRANSFER");
        assert_eq!(
            serde_json::to_value(PaymentChannel::Online).unwrap(),
            "ONLINE"
        );
    }
}
