//! Typed view models rendered by call sites.

use shared::{
    domain::AccountType,
    protocol::{AccountSummary, TransactionRecord},
};

use crate::format::{
    describe_transaction, format_currency, format_date, format_enum_label, mask_account_number,
    transaction_class,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDetailsView {
    pub account_number: String,
    pub account_type: String,
    pub balance: String,
    pub status: String,
    pub created: String,
}

impl From<&AccountSummary> for AccountDetailsView {
    fn from(account: &AccountSummary) -> Self {
        Self {
            account_number: mask_account_number(&account.account_number),
            account_type: format_enum_label(&account.account_type),
            balance: format_currency(account.balance),
            status: account.status.clone(),
            created: account
                .created_at
                .as_deref()
                .map(format_date)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDetailsView {
    pub id: String,
    pub transaction_type: String,
    pub amount: String,
    pub amount_class: &'static str,
    pub date: String,
    pub status: String,
    pub description: String,
}

impl From<&TransactionRecord> for TransactionDetailsView {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            id: record.id.to_string(),
            transaction_type: format_enum_label(&record.transaction_type),
            amount: format_currency(record.amount),
            amount_class: transaction_class(&record.transaction_type),
            date: record
                .timestamp
                .as_deref()
                .map(format_date)
                .unwrap_or_default(),
            status: record.status.clone(),
            description: describe_transaction(record),
        }
    }
}

/// Blurb shown next to the account type picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountTypeInfo {
    pub title: &'static str,
    pub summary: &'static str,
    pub features: &'static [&'static str],
}

pub const ACCOUNT_TYPE_PROMPT: &str = "Please select an account type to see details.";

impl AccountTypeInfo {
    pub fn for_type(account_type: AccountType) -> Self {
        match account_type {
            AccountType::Checking => Self {
                title: "Checking Account",
                summary: "A standard checking account with no minimum balance requirement.",
                features: &[
                    "No monthly maintenance fee",
                    "Unlimited transactions",
                    "Online banking and mobile access",
                ],
            },
            AccountType::Savings => Self {
                title: "Savings Account",
                summary: "A basic savings account that earns interest on your deposits.",
                features: &[
                    "Competitive interest rates",
                    "No minimum balance requirement",
                    "Limited to 6 withdrawals per month",
                ],
            },
            AccountType::FixedDeposit => Self {
                title: "Fixed Deposit Account",
                summary: "Lock in your money for a fixed period and earn higher interest.",
                features: &[
                    "Higher interest rates than regular savings",
                    "Terms range from 3 months to 5 years",
                    "Early withdrawal penalties may apply",
                ],
            },
        }
    }

    /// `None` for an empty or unknown selection; show [`ACCOUNT_TYPE_PROMPT`] instead.
    pub fn for_selection(selection: &str) -> Option<Self> {
        selection.parse::<AccountType>().ok().map(Self::for_type)
    }
}

/// Formatted balance of the selected source account, if the raw value is a number.
pub fn balance_hint(raw_balance: Option<&str>) -> Option<String> {
    raw_balance
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|balance| balance.is_finite())
        .map(format_currency)
}
