use super::*;

use std::sync::{Arc, Mutex as StdMutex};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode as AxumStatus},
    response::{IntoResponse, Redirect, Response as AxumResponse},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Value};
use shared::domain::AccountType;
use tokio::net::TcpListener;

use crate::{
    submitter::ActionSubmitter,
    ui_state::{UiChange, UiSurface},
    validation::TransferForm,
    ClientSettings, SubmitOutcome,
};

#[derive(Debug, Clone)]
struct Captured {
    path: String,
    requested_with: Option<String>,
    content_type: Option<String>,
    body: Value,
}

#[derive(Clone, Default)]
struct ServerState {
    captured: Arc<StdMutex<Vec<Captured>>>,
}

impl ServerState {
    fn capture(&self, path: &str, headers: &HeaderMap, body: Value) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        self.captured.lock().expect("captured lock").push(Captured {
            path: path.to_string(),
            requested_with: header("x-requested-with"),
            content_type: header("content-type"),
            body,
        });
    }

    fn captured(&self) -> Vec<Captured> {
        self.captured.lock().expect("captured lock").clone()
    }
}

async fn handle_create_account(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> AxumResponse {
    state.capture("/accounts/create", &headers, body.clone());
    (
        AxumStatus::CREATED,
        Json(json!({
            "message": "Account created successfully",
            "account": {
                "id": "acc-new",
                "account_number": "ACC5E6F7A8B",
                "account_type": body["account_type"],
                "balance": body["initial_deposit"],
                "status": "active",
                "created_at": "2024-05-01T10:00:00"
            }
        })),
    )
        .into_response()
}

async fn handle_transfer(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> AxumResponse {
    state.capture("/transfer", &headers, body.clone());
    match body["description"].as_str() {
        Some("overdraw") => (
            AxumStatus::BAD_REQUEST,
            Json(json!({"message": "Insufficient funds"})),
        )
            .into_response(),
        Some("explode") => (AxumStatus::INTERNAL_SERVER_ERROR, "<html>oops</html>").into_response(),
        Some("expired") => (
            AxumStatus::UNAUTHORIZED,
            Json(json!({"message": "Token has expired"})),
        )
            .into_response(),
        _ => (
            AxumStatus::CREATED,
            Json(json!({
                "id": "tx-77",
                "transaction_type": "transfer",
                "amount": body["amount"],
                "status": "completed",
                "transfer_type": body["transfer_type"],
                "description": body["description"]
            })),
        )
            .into_response(),
    }
}

async fn handle_close_account(
    State(state): State<ServerState>,
    Path(account_id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<std::collections::HashMap<String, String>>,
) -> Redirect {
    state.capture(
        &format!("/accounts/{account_id}/close"),
        &headers,
        json!(form),
    );
    Redirect::to("/accounts")
}

async fn handle_accounts_page() -> &'static str {
    "<html>accounts</html>"
}

async fn handle_account_details(
    State(state): State<ServerState>,
    Path(account_id): Path<String>,
    headers: HeaderMap,
) -> AxumResponse {
    state.capture(&format!("/accounts/{account_id}"), &headers, Value::Null);
    if account_id == "missing" {
        return (
            AxumStatus::NOT_FOUND,
            Json(json!({"message": "Account not found"})),
        )
            .into_response();
    }
    Json(json!({
        "account_number": "ACC11112222",
        "account_type": "checking",
        "balance": 42.5,
        "status": "active",
        "created_at": "2024-01-02T03:04:05"
    }))
    .into_response()
}

async fn handle_transaction_details(
    State(state): State<ServerState>,
    Path(transaction_id): Path<String>,
    headers: HeaderMap,
) -> AxumResponse {
    state.capture(
        &format!("/transactions/{transaction_id}"),
        &headers,
        Value::Null,
    );
    Json(json!({
        "id": transaction_id,
        "transaction_type": "deposit",
        "amount": 10,
        "timestamp": "2024-01-02T03:04:05",
        "status": "completed"
    }))
    .into_response()
}

async fn spawn_bank_server() -> anyhow::Result<(String, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let app = Router::new()
        .route("/accounts", get(handle_accounts_page))
        .route("/accounts/create", post(handle_create_account))
        .route("/accounts/:account_id", get(handle_account_details))
        .route("/accounts/:account_id/close", post(handle_close_account))
        .route("/transactions/:transaction_id", get(handle_transaction_details))
        .route("/transfer", post(handle_transfer))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

fn transfer_request(description: &str) -> TransferRequest {
    TransferRequest {
        from_account_id: AccountId::from("acc-1"),
        to_account_id: AccountId::from("acc-2"),
        amount: 12.5,
        transfer_type: "internal".to_string(),
        description: description.to_string(),
    }
}

#[test]
fn rejects_server_url_without_path_support() {
    assert!(BankingClient::new("not a url").is_err());
    assert!(matches!(
        BankingClient::new("mailto:bank@example.com"),
        Err(ServerUrlError::NotABase(_))
    ));
}

#[test]
fn user_message_prefers_backend_text() {
    let rejected = RequestFailure::Rejected {
        status: 400,
        code: ErrorCode::Validation,
        message: Some("Account is already closed".to_string()),
    };
    assert_eq!(rejected.user_message("fallback"), "Account is already closed");

    let silent = RequestFailure::Rejected {
        status: 500,
        code: ErrorCode::Internal,
        message: None,
    };
    assert_eq!(silent.user_message("fallback"), "fallback");
    assert_eq!(
        RequestFailure::Decode("eof".to_string()).user_message("fallback"),
        "fallback"
    );
    assert_eq!(
        RequestFailure::Transport("refused".to_string()).user_message("fallback"),
        GENERIC_FAILURE_MESSAGE
    );
    assert_eq!(
        RequestFailure::SessionExpired.user_message("fallback"),
        SESSION_EXPIRED_MESSAGE
    );
}

#[tokio::test]
async fn create_account_posts_json_marked_as_programmatic() {
    let (server_url, state) = spawn_bank_server().await.expect("spawn server");
    let client = BankingClient::new(&server_url).expect("client");

    let account = client
        .create_account(&CreateAccountRequest {
            account_type: AccountType::Savings,
            initial_deposit: 250.0,
        })
        .await
        .expect("create account");
    assert_eq!(account.account_number, "ACC5E6F7A8B");
    assert_eq!(account.account_type, "savings");
    assert_eq!(account.balance, 250.0);

    let captured = state.captured();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].path, "/accounts/create");
    assert_eq!(captured[0].requested_with.as_deref(), Some("XMLHttpRequest"));
    assert_eq!(
        captured[0].body,
        json!({"account_type": "savings", "initial_deposit": 250.0})
    );
}

#[tokio::test]
async fn transfer_accepts_bare_transaction_body() {
    let (server_url, _state) = spawn_bank_server().await.expect("spawn server");
    let client = BankingClient::new(&format!("{server_url}/")).expect("client");

    let record = client
        .transfer(&transfer_request("Rent"))
        .await
        .expect("transfer");
    assert_eq!(record.id, TransactionId::from("tx-77"));
    assert_eq!(record.amount, 12.5);
    assert_eq!(record.description.as_deref(), Some("Rent"));
}

#[tokio::test]
async fn rejection_carries_backend_message() {
    let (server_url, _state) = spawn_bank_server().await.expect("spawn server");
    let client = BankingClient::new(&server_url).expect("client");

    let err = client
        .transfer(&transfer_request("overdraw"))
        .await
        .expect_err("must fail");
    assert_eq!(
        err,
        RequestFailure::Rejected {
            status: 400,
            code: ErrorCode::Validation,
            message: Some("Insufficient funds".to_string()),
        }
    );
}

#[tokio::test]
async fn rejection_with_unreadable_body_has_no_message() {
    let (server_url, _state) = spawn_bank_server().await.expect("spawn server");
    let client = BankingClient::new(&server_url).expect("client");

    let err = client
        .transfer(&transfer_request("explode"))
        .await
        .expect_err("must fail");
    assert!(matches!(
        err,
        RequestFailure::Rejected {
            status: 500,
            message: None,
            ..
        }
    ));
}

#[tokio::test]
async fn unauthorized_maps_to_session_expired() {
    let (server_url, _state) = spawn_bank_server().await.expect("spawn server");
    let client = BankingClient::new(&server_url).expect("client");

    let err = client
        .transfer(&transfer_request("expired"))
        .await
        .expect_err("must fail");
    assert_eq!(err, RequestFailure::SessionExpired);
}

#[tokio::test]
async fn close_account_is_a_plain_form_post_that_follows_redirect() {
    let (server_url, state) = spawn_bank_server().await.expect("spawn server");
    let client = BankingClient::new(&server_url).expect("client");

    let landed = client
        .close_account(&CloseAccountRequest {
            account_id: AccountId::from("acc-9"),
            confirmation: "CLOSE".to_string(),
        })
        .await
        .expect("close account");
    assert_eq!(landed, "/accounts");

    let captured = state.captured();
    assert_eq!(captured[0].path, "/accounts/acc-9/close");
    assert_eq!(captured[0].requested_with, None);
    assert_eq!(
        captured[0].content_type.as_deref(),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(captured[0].body, json!({"confirmation": "CLOSE"}));
}

#[tokio::test]
async fn detail_requests_encode_ids_as_path_segments() {
    let (server_url, state) = spawn_bank_server().await.expect("spawn server");
    let client = BankingClient::new(&server_url).expect("client");

    let account = client
        .account_details(&AccountId::from("acc 1"))
        .await
        .expect("account details");
    assert_eq!(account.account_type, "checking");

    let record = client
        .transaction_details(&TransactionId::from("tx-5"))
        .await
        .expect("transaction details");
    assert_eq!(record.transaction_type, "deposit");

    let missing = client
        .account_details(&AccountId::from("missing"))
        .await
        .expect_err("must fail");
    assert!(matches!(
        missing,
        RequestFailure::Rejected { status: 404, .. }
    ));

    let captured = state.captured();
    assert_eq!(captured[0].path, "/accounts/acc 1");
    assert_eq!(captured[0].requested_with.as_deref(), Some("XMLHttpRequest"));
    assert_eq!(captured[1].path, "/transactions/tx-5");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_failure() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = BankingClient::new(&format!("http://{addr}")).expect("client");
    let err = client
        .transfer(&transfer_request("Rent"))
        .await
        .expect_err("must fail");
    assert!(matches!(err, RequestFailure::Transport(_)));
}

#[derive(Default)]
struct MessageSurface {
    messages: StdMutex<Vec<String>>,
}

impl UiSurface for MessageSurface {
    fn render(&self, change: &UiChange) {
        if let UiChange::Notified(notification) = change {
            self.messages
                .lock()
                .expect("messages lock")
                .push(notification.message.clone());
        }
    }

    fn navigate(&self, _target: &str) {}
}

#[tokio::test]
async fn submitter_shows_backend_rejection_text_end_to_end() {
    let (server_url, state) = spawn_bank_server().await.expect("spawn server");
    let client = Arc::new(BankingClient::new(&server_url).expect("client"));
    let surface = Arc::new(MessageSurface::default());
    let submitter = ActionSubmitter::new(client, surface.clone(), &ClientSettings::default());

    let outcome = submitter
        .submit_transfer(&TransferForm {
            from_account: "acc-1".to_string(),
            to_account: "acc-2".to_string(),
            amount: "5000".to_string(),
            transfer_type: String::new(),
            description: "overdraw".to_string(),
        })
        .await;
    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert_eq!(
        surface.messages.lock().expect("messages lock").clone(),
        vec!["Insufficient funds".to_string()]
    );
    assert_eq!(state.captured()[0].body["transfer_type"], "internal");
}
