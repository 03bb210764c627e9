//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `StudentId` where an
//! `InvoiceId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

typed_id!(OrganizationId, "Unique identifier for an organization.");
typed_id!(CampusId, "Unique identifier for a campus.");
typed_id!(
    UnitId,
    "Unique identifier for a hierarchy unit (zone, city, subregion, region)."
);
typed_id!(StudentId, "Unique identifier for a student.");
typed_id!(InvoiceId, "Unique identifier for an invoice (challan).");
typed_id!(LedgerEntryId, "Unique identifier for a ledger entry.");
typed_id!(PaymentRecordId, "Unique identifier for a payment record.");
typed_id!(PostingRunId, "Unique identifier for a posting run.");
typed_id!(BillingRuleId, "Unique identifier for a billing rule.");
typed_id!(BankAccountId, "Unique identifier for a bank account.");
typed_id!(ReminderRuleId, "Unique identifier for a reminder rule.");
typed_id!(ReminderLogId, "Unique identifier for a reminder log row.");
typed_id!(ActorId, "Unique identifier for an acting user.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(InvoiceId::new(), InvoiceId::new());
    }

    #[test]
    fn test_round_trip_through_string() {
        let id = StudentId::new();
        let parsed = StudentId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_from_uuid_preserves_value() {
        let uuid = Uuid::now_v7();
        assert_eq!(OrganizationId::from_uuid(uuid).into_inner(), uuid);
    }

    #[test]
    fn test_v7_ids_are_time_ordered() {
        let first = LedgerEntryId::new();
        let second = LedgerEntryId::new();
        assert!(first.into_inner() <= second.into_inner());
    }
}
