use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{AccountId, TransactionId},
    error::{ErrorBody, ErrorCode},
    protocol::{
        AccountCreated, AccountSummary, CloseAccountRequest, CreateAccountRequest,
        TransactionRecord, TransferCompleted, TransferRequest,
    },
};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub mod config;
pub mod format;
pub mod submitter;
pub mod ui_state;
pub mod validation;
pub mod view;

pub use config::{load_settings, ClientSettings};
pub use submitter::{ActionKind, ActionSubmitter, SubmitOutcome};
pub use ui_state::{Notification, Severity, UiChange, UiState, UiSurface};

/// Marks a request as programmatic rather than a page navigation.
pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";
pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred. Please try again later.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestFailure {
    #[error("session expired")]
    SessionExpired,
    #[error("backend rejected request with status {status}")]
    Rejected {
        status: u16,
        code: ErrorCode,
        message: Option<String>,
    },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed response body: {0}")]
    Decode(String),
}

impl RequestFailure {
    /// Text shown to the user. `fallback` covers rejections that carry no
    /// message and bodies that could not be read.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::SessionExpired => SESSION_EXPIRED_MESSAGE.to_string(),
            Self::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Rejected { message: None, .. } | Self::Decode(_) => fallback.to_string(),
            Self::Transport(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for RequestFailure {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

/// The backend operations the presentation layer depends on.
#[async_trait]
pub trait BankingBackend: Send + Sync {
    async fn create_account(
        &self,
        request: &CreateAccountRequest,
    ) -> Result<AccountSummary, RequestFailure>;
    async fn transfer(&self, request: &TransferRequest)
        -> Result<TransactionRecord, RequestFailure>;
    /// Returns the path the form post landed on after redirects.
    async fn close_account(&self, request: &CloseAccountRequest) -> Result<String, RequestFailure>;
    async fn account_details(&self, account_id: &AccountId)
        -> Result<AccountSummary, RequestFailure>;
    async fn transaction_details(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<TransactionRecord, RequestFailure>;
}

#[derive(Debug, Error)]
pub enum ServerUrlError {
    #[error("invalid server url: {0}")]
    Parse(#[from] url::ParseError),
    #[error("server url '{0}' cannot carry a path")]
    NotABase(String),
}

/// HTTP implementation of [`BankingBackend`]. Requests carry no timeout of
/// their own; whatever the transport does is what the caller gets.
pub struct BankingClient {
    http: Client,
    base: Url,
}

impl BankingClient {
    pub fn new(server_url: &str) -> Result<Self, ServerUrlError> {
        Self::with_http_client(Client::new(), server_url)
    }

    /// Use a preconfigured client, e.g. one with a cookie store for the
    /// gateway session.
    pub fn with_http_client(http: Client, server_url: &str) -> Result<Self, ServerUrlError> {
        let base = Url::parse(server_url)?;
        if base.cannot_be_a_base() {
            return Err(ServerUrlError::NotABase(server_url.to_string()));
        }
        Ok(Self { http, base })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn post_json<B, R>(&self, segments: &[&str], body: &B) -> Result<R, RequestFailure>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(segments);
        debug!(%url, "POST");
        let response = self
            .http
            .post(url)
            .header(REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE)
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }

    async fn get_json<R>(&self, segments: &[&str]) -> Result<R, RequestFailure>
    where
        R: DeserializeOwned,
    {
        let url = self.endpoint(segments);
        debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .header(REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE)
            .send()
            .await?;
        read_json(response).await
    }
}

async fn rejection(response: Response) -> RequestFailure {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return RequestFailure::SessionExpired;
    }
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(ErrorBody::into_message);
    RequestFailure::Rejected {
        status: status.as_u16(),
        code: ErrorCode::from_status(status.as_u16()),
        message,
    }
}

async fn read_json<R: DeserializeOwned>(response: Response) -> Result<R, RequestFailure> {
    if !response.status().is_success() {
        return Err(rejection(response).await);
    }
    response
        .json::<R>()
        .await
        .map_err(|err| RequestFailure::Decode(err.to_string()))
}

#[async_trait]
impl BankingBackend for BankingClient {
    async fn create_account(
        &self,
        request: &CreateAccountRequest,
    ) -> Result<AccountSummary, RequestFailure> {
        let created: AccountCreated = self.post_json(&["accounts", "create"], request).await?;
        Ok(created.into_account())
    }

    async fn transfer(
        &self,
        request: &TransferRequest,
    ) -> Result<TransactionRecord, RequestFailure> {
        let completed: TransferCompleted = self.post_json(&["transfer"], request).await?;
        Ok(completed.into_transaction())
    }

    async fn close_account(&self, request: &CloseAccountRequest) -> Result<String, RequestFailure> {
        // A plain form post: no programmatic marker, redirects followed like a browser would.
        let url = self.endpoint(&["accounts", request.account_id.as_str(), "close"]);
        debug!(%url, "POST form");
        let response = self.http.post(url).form(request).send().await?;
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let landed = response.url();
        Ok(match landed.query() {
            Some(query) => format!("{}?{query}", landed.path()),
            None => landed.path().to_string(),
        })
    }

    async fn account_details(
        &self,
        account_id: &AccountId,
    ) -> Result<AccountSummary, RequestFailure> {
        self.get_json(&["accounts", account_id.as_str()]).await
    }

    async fn transaction_details(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<TransactionRecord, RequestFailure> {
        self.get_json(&["transactions", transaction_id.as_str()])
            .await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
