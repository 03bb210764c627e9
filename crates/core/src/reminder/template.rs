//! Message template resolution and token rendering.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::types::{InvoiceReminderSnapshot, ReminderChannel, ReminderRule, ReminderTrigger};

/// Picks the message template for a rule.
///
/// An organization override keyed by (channel, trigger) takes precedence
/// over the rule's own default body.
#[must_use]
pub fn resolve_template<'a>(
    rule: &'a ReminderRule,
    overrides: &'a HashMap<(ReminderChannel, ReminderTrigger), String>,
) -> &'a str {
    overrides
        .get(&(rule.channel, rule.trigger))
        .map_or(rule.template.as_str(), String::as_str)
}

/// Substitutes `{{token}}` placeholders in a template.
///
/// Unknown tokens are left in place so a typo in a template is visible in
/// the delivered message rather than silently dropped.
#[must_use]
pub fn render(template: &str, tokens: &HashMap<&str, String>) -> String {
    let mut message = template.to_string();
    for (token, value) in tokens {
        message = message.replace(&format!("{{{{{token}}}}}"), value);
    }
    message
}

/// Builds the token map for an invoice snapshot.
///
/// `payment_link_base`, when configured, yields a `paymentLink` token of the
/// form `<base>/<invoice id>`.
#[must_use]
pub fn tokens_for(
    snapshot: &InvoiceReminderSnapshot,
    today: NaiveDate,
    payment_link_base: Option<&str>,
) -> HashMap<&'static str, String> {
    let mut tokens = HashMap::new();
    tokens.insert("studentName", snapshot.student_name.clone());
    tokens.insert(
        "admissionNo",
        snapshot.admission_no.clone().unwrap_or_default(),
    );
    tokens.insert("grade", snapshot.grade.clone().unwrap_or_default());
    tokens.insert("campusName", snapshot.campus_name.clone());
    tokens.insert("invoiceNo", snapshot.invoice_no.clone());
    tokens.insert("amount", snapshot.outstanding().to_string());
    tokens.insert("totalAmount", snapshot.total_amount.to_string());
    tokens.insert("paidAmount", snapshot.paid_amount.to_string());
    tokens.insert(
        "daysOverdue",
        snapshot.days_overdue(today).max(0).to_string(),
    );
    tokens.insert("dueDate", snapshot.due_date.format("%Y-%m-%d").to_string());
    tokens.insert(
        "paymentLink",
        payment_link_base
            .map(|base| format!("{base}/{}", snapshot.invoice_id))
            .unwrap_or_default(),
    );
    tokens
}
