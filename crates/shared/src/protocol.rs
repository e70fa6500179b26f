use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, AccountType, TransactionId};

/// Body of `POST /accounts/create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub account_type: AccountType,
    pub initial_deposit: f64,
}

/// Body of `POST /transfer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: f64,
    pub transfer_type: String,
    pub description: String,
}

/// Form body of `POST /accounts/{id}/close`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseAccountRequest {
    #[serde(skip)]
    pub account_id: AccountId,
    pub confirmation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AccountId>,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub account_type: String,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub transaction_type: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<AccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_account_id: Option<AccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_account_id: Option<AccountId>,
}

/// 2xx body of `POST /accounts/create`. The gateway may return the account
/// bare or wrapped together with a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountCreated {
    Wrapped {
        account: AccountSummary,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Bare(AccountSummary),
}

impl AccountCreated {
    pub fn into_account(self) -> AccountSummary {
        match self {
            Self::Wrapped { account, .. } | Self::Bare(account) => account,
        }
    }
}

/// 2xx body of `POST /transfer`, bare or wrapped like [`AccountCreated`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransferCompleted {
    Wrapped {
        transaction: TransactionRecord,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Bare(TransactionRecord),
}

impl TransferCompleted {
    pub fn into_transaction(self) -> TransactionRecord {
        match self {
            Self::Wrapped { transaction, .. } | Self::Bare(transaction) => transaction,
        }
    }
}
