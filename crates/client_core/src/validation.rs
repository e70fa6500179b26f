//! Typed form models and the client-side checks that turn them into requests.
//!
//! These checks are advisory; the backend re-validates everything.

use std::str::FromStr;

use shared::{
    domain::{AccountId, AccountType, DEFAULT_TRANSFER_TYPE},
    protocol::{CloseAccountRequest, CreateAccountRequest, TransferRequest},
};
use thiserror::Error;

/// Literal the user must type to confirm an account closure.
pub const CLOSE_CONFIRMATION: &str = "CLOSE";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateAccountForm {
    pub account_type: String,
    pub initial_deposit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferForm {
    pub from_account: String,
    pub to_account: String,
    pub amount: String,
    pub transfer_type: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseAccountForm {
    pub account_id: String,
    pub confirmation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRangeForm {
    pub start_date: String,
    pub end_date: String,
}

/// A locally detected input problem. The display text is what the user sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select an account type")]
    MissingAccountType,
    #[error("Please select a valid account type")]
    InvalidAccountType,
    #[error("Initial deposit must be a non-negative number")]
    InvalidInitialDeposit,
    #[error("Please select both source and destination accounts")]
    MissingTransferAccounts,
    #[error("Source and destination accounts cannot be the same")]
    SameTransferAccounts,
    #[error("Please enter a valid positive amount")]
    InvalidTransferAmount,
    #[error("Please select an account to close")]
    MissingCloseAccount,
    #[error("Please type CLOSE to confirm")]
    ConfirmationMismatch,
    #[error("Please select both start and end dates")]
    MissingDateRange,
}

fn parse_finite(raw: &str) -> Option<f64> {
    f64::from_str(raw.trim())
        .ok()
        .filter(|value| value.is_finite())
}

impl CreateAccountForm {
    pub fn validate(&self) -> Result<CreateAccountRequest, ValidationError> {
        let account_type = self.account_type.trim();
        if account_type.is_empty() {
            return Err(ValidationError::MissingAccountType);
        }
        let account_type =
            AccountType::from_str(account_type).map_err(|_| ValidationError::InvalidAccountType)?;

        let initial_deposit = parse_finite(&self.initial_deposit)
            .filter(|deposit| *deposit >= 0.0)
            .ok_or(ValidationError::InvalidInitialDeposit)?;

        Ok(CreateAccountRequest {
            account_type,
            initial_deposit,
        })
    }
}

impl TransferForm {
    pub fn validate(&self) -> Result<TransferRequest, ValidationError> {
        let from = self.from_account.trim();
        let to = self.to_account.trim();
        if from.is_empty() || to.is_empty() {
            return Err(ValidationError::MissingTransferAccounts);
        }
        if from == to {
            return Err(ValidationError::SameTransferAccounts);
        }

        let amount = parse_finite(&self.amount)
            .filter(|amount| *amount > 0.0)
            .ok_or(ValidationError::InvalidTransferAmount)?;

        let transfer_type = match self.transfer_type.trim() {
            "" => DEFAULT_TRANSFER_TYPE.to_string(),
            other => other.to_string(),
        };

        Ok(TransferRequest {
            from_account_id: AccountId::from(from),
            to_account_id: AccountId::from(to),
            amount,
            transfer_type,
            description: self.description.clone(),
        })
    }
}

impl CloseAccountForm {
    /// The confirmation comparison is exact: no trimming, no case folding.
    pub fn validate(&self) -> Result<CloseAccountRequest, ValidationError> {
        if self.confirmation != CLOSE_CONFIRMATION {
            return Err(ValidationError::ConfirmationMismatch);
        }
        let account_id = self.account_id.trim();
        if account_id.is_empty() {
            return Err(ValidationError::MissingCloseAccount);
        }

        Ok(CloseAccountRequest {
            account_id: AccountId::from(account_id),
            confirmation: self.confirmation.clone(),
        })
    }
}

impl DateRangeForm {
    /// Returns the transactions listing path filtered to this range.
    pub fn filter_path(&self) -> Result<String, ValidationError> {
        let start = self.start_date.trim();
        let end = self.end_date.trim();
        if start.is_empty() || end.is_empty() {
            return Err(ValidationError::MissingDateRange);
        }

        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("start_date", start)
            .append_pair("end_date", end)
            .finish();
        Ok(format!("/transactions?{query}"))
    }
}
