//! Database enum mappings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice (challan) status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "UNPAID")]
    Unpaid,
    #[sea_orm(string_value = "PARTIALLY_PAID")]
    PartiallyPaid,
    #[sea_orm(string_value = "PAID")]
    Paid,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl From<tahsil_core::invoice::InvoiceStatus> for InvoiceStatus {
    fn from(status: tahsil_core::invoice::InvoiceStatus) -> Self {
        match status {
            tahsil_core::invoice::InvoiceStatus::Unpaid => Self::Unpaid,
            tahsil_core::invoice::InvoiceStatus::PartiallyPaid => Self::PartiallyPaid,
            tahsil_core::invoice::InvoiceStatus::Paid => Self::Paid,
            tahsil_core::invoice::InvoiceStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<InvoiceStatus> for tahsil_core::invoice::InvoiceStatus {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Unpaid => Self::Unpaid,
            InvoiceStatus::PartiallyPaid => Self::PartiallyPaid,
            InvoiceStatus::Paid => Self::Paid,
            InvoiceStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Ledger entry direction.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_direction")]
pub enum EntryDirection {
    #[sea_orm(string_value = "DEBIT")]
    Debit,
    #[sea_orm(string_value = "CREDIT")]
    Credit,
}

impl From<tahsil_core::ledger::EntryDirection> for EntryDirection {
    fn from(direction: tahsil_core::ledger::EntryDirection) -> Self {
        match direction {
            tahsil_core::ledger::EntryDirection::Debit => Self::Debit,
            tahsil_core::ledger::EntryDirection::Credit => Self::Credit,
        }
    }
}

impl From<EntryDirection> for tahsil_core::ledger::EntryDirection {
    fn from(direction: EntryDirection) -> Self {
        match direction {
            EntryDirection::Debit => Self::Debit,
            EntryDirection::Credit => Self::Credit,
        }
    }
}

/// Ledger entry business kind.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_kind")]
pub enum EntryKind {
    #[sea_orm(string_value = "INVOICE_POSTED")]
    InvoicePosted,
    #[sea_orm(string_value = "PAYMENT_RECEIVED")]
    PaymentReceived,
    #[sea_orm(string_value = "REFUND")]
    Refund,
    #[sea_orm(string_value = "ADJUSTMENT")]
    Adjustment,
}

impl From<tahsil_core::ledger::EntryKind> for EntryKind {
    fn from(kind: tahsil_core::ledger::EntryKind) -> Self {
        match kind {
            tahsil_core::ledger::EntryKind::InvoicePosted => Self::InvoicePosted,
            tahsil_core::ledger::EntryKind::PaymentReceived => Self::PaymentReceived,
            tahsil_core::ledger::EntryKind::Refund => Self::Refund,
            tahsil_core::ledger::EntryKind::Adjustment => Self::Adjustment,
        }
    }
}

impl From<EntryKind> for tahsil_core::ledger::EntryKind {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::InvoicePosted => Self::InvoicePosted,
            EntryKind::PaymentReceived => Self::PaymentReceived,
            EntryKind::Refund => Self::Refund,
            EntryKind::Adjustment => Self::Adjustment,
        }
    }
}

/// What a ledger entry refers to.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ledger_reference_kind")]
pub enum LedgerReferenceKind {
    #[sea_orm(string_value = "INVOICE")]
    Invoice,
    #[sea_orm(string_value = "PAYMENT")]
    Payment,
    #[sea_orm(string_value = "NONE")]
    None,
}

/// Payment channel.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_channel")]
pub enum PaymentChannel {
    #[sea_orm(string_value = "CASH")]
    Cash,
    #[sea_orm(string_value = "BANK_TRANSFER")]
    BankTransfer,
    #[sea_orm(string_value = "CHEQUE")]
    Cheque,
    #[sea_orm(string_value = "ONLINE")]
    Online,
}

impl From<tahsil_core::reconciliation::PaymentChannel> for PaymentChannel {
    fn from(channel: tahsil_core::reconciliation::PaymentChannel) -> Self {
        match channel {
            tahsil_core::reconciliation::PaymentChannel::Cash => Self::Cash,
            tahsil_core::reconciliation::PaymentChannel::BankTransfer => Self::BankTransfer,
            tahsil_core::reconciliation::PaymentChannel::Cheque => Self::Cheque,
            tahsil_core::reconciliation::PaymentChannel::Online => Self::Online,
        }
    }
}

impl From<PaymentChannel> for tahsil_core::reconciliation::PaymentChannel {
    fn from(channel: PaymentChannel) -> Self {
        match channel {
            PaymentChannel::Cash => Self::Cash,
            PaymentChannel::BankTransfer => Self::BankTransfer,
            PaymentChannel::Cheque => Self::Cheque,
            PaymentChannel::Online => Self::Online,
        }
    }
}

/// Payment record status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "RECONCILED")]
    Reconciled,
    #[sea_orm(string_value = "FAILED")]
    Failed,
    #[sea_orm(string_value = "REFUNDED")]
    Refunded,
}

impl From<tahsil_core::reconciliation::PaymentStatus> for PaymentStatus {
    fn from(status: tahsil_core::reconciliation::PaymentStatus) -> Self {
        match status {
            tahsil_core::reconciliation::PaymentStatus::Pending => Self::Pending,
            tahsil_core::reconciliation::PaymentStatus::Reconciled => Self::Reconciled,
            tahsil_core::reconciliation::PaymentStatus::Failed => Self::Failed,
            tahsil_core::reconciliation::PaymentStatus::Refunded => Self::Refunded,
        }
    }
}

impl From<PaymentStatus> for tahsil_core::reconciliation::PaymentStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pending => Self::Pending,
            PaymentStatus::Reconciled => Self::Reconciled,
            PaymentStatus::Failed => Self::Failed,
            PaymentStatus::Refunded => Self::Refunded,
        }
    }
}

/// Posting run status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "posting_run_status")]
pub enum PostingRunStatus {
    #[sea_orm(string_value = "PROCESSING")]
    Processing,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "FAILED")]
    Failed,
}

impl From<tahsil_core::posting::PostingRunStatus> for PostingRunStatus {
    fn from(status: tahsil_core::posting::PostingRunStatus) -> Self {
        match status {
            tahsil_core::posting::PostingRunStatus::Processing => Self::Processing,
            tahsil_core::posting::PostingRunStatus::Completed => Self::Completed,
            tahsil_core::posting::PostingRunStatus::Failed => Self::Failed,
        }
    }
}

/// Unit hierarchy level a bank account is attached to.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "unit_level")]
pub enum UnitLevel {
    #[sea_orm(string_value = "CAMPUS")]
    Campus,
    #[sea_orm(string_value = "ZONE")]
    Zone,
    #[sea_orm(string_value = "CITY")]
    City,
    #[sea_orm(string_value = "SUB_REGION")]
    SubRegion,
    #[sea_orm(string_value = "REGION")]
    Region,
}

impl From<tahsil_core::routing::UnitLevel> for UnitLevel {
    fn from(level: tahsil_core::routing::UnitLevel) -> Self {
        match level {
            tahsil_core::routing::UnitLevel::Campus => Self::Campus,
            tahsil_core::routing::UnitLevel::Zone => Self::Zone,
            tahsil_core::routing::UnitLevel::City => Self::City,
            tahsil_core::routing::UnitLevel::SubRegion => Self::SubRegion,
            tahsil_core::routing::UnitLevel::Region => Self::Region,
        }
    }
}

impl From<UnitLevel> for tahsil_core::routing::UnitLevel {
    fn from(level: UnitLevel) -> Self {
        match level {
            UnitLevel::Campus => Self::Campus,
            UnitLevel::Zone => Self::Zone,
            UnitLevel::City => Self::City,
            UnitLevel::SubRegion => Self::SubRegion,
            UnitLevel::Region => Self::Region,
        }
    }
}

/// Organization routing mode.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "routing_mode")]
pub enum RoutingMode {
    #[sea_orm(string_value = "NEAREST_PARENT_PRIMARY")]
    NearestParentPrimary,
    #[sea_orm(string_value = "CAMPUS_PRIMARY")]
    CampusPrimary,
}

impl From<RoutingMode> for tahsil_core::routing::RoutingMode {
    fn from(mode: RoutingMode) -> Self {
        match mode {
            RoutingMode::NearestParentPrimary => Self::NearestParentPrimary,
            RoutingMode::CampusPrimary => Self::CampusPrimary,
        }
    }
}

/// Bank account status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "bank_account_status")]
pub enum BankAccountStatus {
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "INACTIVE")]
    Inactive,
}

/// Billing rule frequency.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "billing_frequency")]
pub enum BillingFrequency {
    #[sea_orm(string_value = "MONTHLY")]
    Monthly,
    #[sea_orm(string_value = "QUARTERLY")]
    Quarterly,
    #[sea_orm(string_value = "ANNUAL")]
    Annual,
}

impl From<BillingFrequency> for tahsil_core::posting::BillingFrequency {
    fn from(frequency: BillingFrequency) -> Self {
        match frequency {
            BillingFrequency::Monthly => Self::Monthly,
            BillingFrequency::Quarterly => Self::Quarterly,
            BillingFrequency::Annual => Self::Annual,
        }
    }
}

/// Reminder rule trigger.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "reminder_trigger")]
pub enum ReminderTrigger {
    #[sea_orm(string_value = "BEFORE_DUE")]
    BeforeDue,
    #[sea_orm(string_value = "AFTER_DUE")]
    AfterDue,
    #[sea_orm(string_value = "FINAL_NOTICE")]
    FinalNotice,
    #[sea_orm(string_value = "PARTIAL_PAYMENT")]
    PartialPayment,
}

impl From<tahsil_core::reminder::ReminderTrigger> for ReminderTrigger {
    fn from(trigger: tahsil_core::reminder::ReminderTrigger) -> Self {
        match trigger {
            tahsil_core::reminder::ReminderTrigger::BeforeDue => Self::BeforeDue,
            tahsil_core::reminder::ReminderTrigger::AfterDue => Self::AfterDue,
            tahsil_core::reminder::ReminderTrigger::FinalNotice => Self::FinalNotice,
            tahsil_core::reminder::ReminderTrigger::PartialPayment => Self::PartialPayment,
        }
    }
}

impl From<ReminderTrigger> for tahsil_core::reminder::ReminderTrigger {
    fn from(trigger: ReminderTrigger) -> Self {
        match trigger {
            ReminderTrigger::BeforeDue => Self::BeforeDue,
            ReminderTrigger::AfterDue => Self::AfterDue,
            ReminderTrigger::FinalNotice => Self::FinalNotice,
            ReminderTrigger::PartialPayment => Self::PartialPayment,
        }
    }
}

/// Reminder delivery channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "reminder_channel")]
pub enum ReminderChannel {
    #[sea_orm(string_value = "SMS")]
    Sms,
    #[sea_orm(string_value = "EMAIL")]
    Email,
    #[sea_orm(string_value = "WHATSAPP")]
    Whatsapp,
}

impl From<tahsil_core::reminder::ReminderChannel> for ReminderChannel {
    fn from(channel: tahsil_core::reminder::ReminderChannel) -> Self {
        match channel {
            tahsil_core::reminder::ReminderChannel::Sms => Self::Sms,
            tahsil_core::reminder::ReminderChannel::Email => Self::Email,
            tahsil_core::reminder::ReminderChannel::Whatsapp => Self::Whatsapp,
        }
    }
}

impl From<ReminderChannel> for tahsil_core::reminder::ReminderChannel {
    fn from(channel: ReminderChannel) -> Self {
        match channel {
            ReminderChannel::Sms => Self::Sms,
            ReminderChannel::Email => Self::Email,
            ReminderChannel::Whatsapp => Self::Whatsapp,
        }
    }
}

/// Reminder log outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "reminder_log_status")]
pub enum ReminderLogStatus {
    #[sea_orm(string_value = "SENT")]
    Sent,
    #[sea_orm(string_value = "FAILED")]
    Failed,
}

/// Background job status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "job_status")]
pub enum JobStatus {
    #[sea_orm(string_value = "QUEUED")]
    Queued,
    #[sea_orm(string_value = "RUNNING")]
    Running,
    #[sea_orm(string_value = "DONE")]
    Done,
    #[sea_orm(string_value = "FAILED")]
    Failed,
}
