//! Display formatting for backend values.
//!
//! Every function here is total: absent or empty input renders as `""`, and
//! input that cannot be interpreted is rendered as-is or as `""` rather than
//! failing.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use shared::{domain::TransactionKind, protocol::TransactionRecord};

const MASK_PREFIX: &str = "****";
const MASK_VISIBLE_CHARS: usize = 4;

const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Renders an amount as US dollars, e.g. `$1,234.50` or `-$12.00`.
pub fn format_currency(amount: f64) -> String {
    let scaled = (amount.abs() * 100.0).round();
    // `as` saturates at the integer bound, which would print a wrong amount.
    if !scaled.is_finite() || scaled >= u128::MAX as f64 {
        return String::new();
    }

    let cents = scaled as u128;
    let whole = group_thousands(&(cents / 100).to_string());
    let fraction = cents % 100;
    let sign = if amount.is_sign_negative() && cents != 0 {
        "-"
    } else {
        ""
    };
    format!("{sign}${whole}.{fraction:02}")
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Renders a backend timestamp as `January 5, 2024 at 03:04 PM`.
///
/// Offset-carrying timestamps are shown in their own offset. Input that does
/// not parse as a timestamp or a date is returned unchanged.
pub fn format_date(iso_timestamp: &str) -> String {
    let raw = iso_timestamp.trim();
    if raw.is_empty() {
        return String::new();
    }

    match parse_timestamp(raw) {
        Some(at) => format!("{} at {}", at.format("%B %-d, %Y"), at.format("%I:%M %p")),
        None => iso_timestamp.to_string(),
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.naive_local());
    }
    for format in NAIVE_TIMESTAMP_FORMATS {
        if let Ok(at) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(at);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// `fixed_deposit` -> `Fixed Deposit`.
pub fn format_enum_label(token: &str) -> String {
    if token.is_empty() {
        return String::new();
    }

    token
        .split('_')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Only the last four characters of an account number ever leave this
/// function.
pub fn mask_account_number(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let visible_from = raw.chars().count().saturating_sub(MASK_VISIBLE_CHARS);
    let tail: String = raw.chars().skip(visible_from).collect();
    format!("{MASK_PREFIX}{tail}")
}

pub fn describe_transaction(record: &TransactionRecord) -> String {
    if let Some(description) = record
        .description
        .as_deref()
        .filter(|description| !description.is_empty())
    {
        return description.to_string();
    }

    match TransactionKind::from_token(&record.transaction_type) {
        Some(TransactionKind::Deposit) => "Deposit".to_string(),
        Some(TransactionKind::Withdrawal) => "Withdrawal".to_string(),
        Some(TransactionKind::Transfer) => match record
            .transfer_type
            .as_deref()
            .filter(|transfer_type| !transfer_type.is_empty())
        {
            Some(transfer_type) => format!("{} Transfer", transfer_type.to_uppercase()),
            None => "Transfer".to_string(),
        },
        None => "Transaction".to_string(),
    }
}

/// Style class for an amount of the given transaction type.
pub fn transaction_class(transaction_type: &str) -> &'static str {
    TransactionKind::from_token(transaction_type)
        .map(TransactionKind::as_str)
        .unwrap_or("")
}

#[cfg(test)]
#[path = "tests/format_tests.rs"]
mod tests;
