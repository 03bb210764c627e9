//! `SeaORM` entity definitions.

pub mod bank_accounts;
pub mod billing_rules;
pub mod campuses;
pub mod cities;
pub mod invoices;
pub mod jobs;
pub mod ledger_entries;
pub mod organizations;
pub mod payment_records;
pub mod posting_runs;
pub mod reminder_logs;
pub mod reminder_rules;
pub mod reminder_templates;
pub mod sea_orm_active_enums;
pub mod student_balance_summaries;
pub mod students;
