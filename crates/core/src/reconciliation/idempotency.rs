//! Deterministic idempotency keys for manual payment entry.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use tahsil_shared::types::{InvoiceId, OrganizationId};

use super::types::PaymentChannel;

/// Computes the idempotency key for a manual/OTC payment.
///
/// The key is `manual:` plus the first 32 hex characters of the SHA-256 of
/// `org|invoice|amount(2dp)|date(day)|channel|reference`, with the reference
/// trimmed and upper-cased. Two submissions that agree on all of these are
/// the same payment; the database's uniqueness constraint on the key rejects
/// the second one atomically.
#[must_use]
pub fn manual_payment_key(
    organization_id: OrganizationId,
    invoice_id: InvoiceId,
    amount: Decimal,
    paid_date: NaiveDate,
    channel: PaymentChannel,
    reference: Option<&str>,
) -> String {
    let normalized_ref = reference.map(|r| r.trim().to_uppercase()).unwrap_or_default();
    let payload = format!(
        "{}|{}|{:.2}|{}|{}|{}",
        organization_id,
        invoice_id,
        amount.round_dp(2),
        paid_date.format("%Y-%m-%d"),
        channel.as_str(),
        normalized_ref,
    );

    let digest = Sha256::digest(payload.as_bytes());
    let hex = digest
        .iter()
        .fold(String::with_capacity(64), |mut acc, byte| {
            use std::fmt::Write;
            let _ = write!(acc, "{byte:02x}");
            acc
        });

    format!("manual:{}", &hex[..32])
}
