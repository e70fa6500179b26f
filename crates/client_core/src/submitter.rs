//! Action Submitter: validates a form, issues exactly one backend request and
//! reconciles UI state with the result.
//!
//! UI state is owned here and mutated only through [`UiState`] transitions,
//! each of which is then rendered on the [`UiSurface`]. The state lock is
//! never held across a backend call. Notifications dismiss themselves after
//! the configured autohide delay.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use shared::domain::{AccountId, TransactionId};
use tokio::{
    sync::Mutex,
    task::JoinSet,
    time::{sleep_until, Instant},
};
use tracing::{debug, info, warn};

use crate::{
    config::ClientSettings,
    ui_state::{Notification, Severity, UiChange, UiState, UiSurface},
    validation::{CloseAccountForm, CreateAccountForm, DateRangeForm, TransferForm, ValidationError},
    view::{AccountDetailsView, TransactionDetailsView},
    BankingBackend, RequestFailure,
};

pub const ACCOUNTS_PATH: &str = "/accounts";
pub const TRANSACTIONS_PATH: &str = "/transactions";
pub const LOGIN_PATH: &str = "/login";

const ACCOUNT_DETAILS_FALLBACK: &str = "Failed to load account details";
const TRANSACTION_DETAILS_FALLBACK: &str = "Failed to load transaction details";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    CreateAccount,
    Transfer,
    CloseAccount,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateAccount => "create_account",
            Self::Transfer => "transfer",
            Self::CloseAccount => "close_account",
        }
    }

    fn failure_fallback(self) -> &'static str {
        match self {
            Self::CreateAccount => "Failed to create account",
            Self::Transfer => "Failed to process transfer",
            Self::CloseAccount => "Failed to close account",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input failed local validation; nothing was sent.
    Rejected(ValidationError),
    /// The same action is still waiting on the backend; nothing was sent.
    AlreadyInFlight,
    Failed(RequestFailure),
    Completed { navigate_to: String },
}

#[derive(Default)]
struct InFlight {
    create_account: AtomicBool,
    transfer: AtomicBool,
    close_account: AtomicBool,
}

impl InFlight {
    fn flag(&self, kind: ActionKind) -> &AtomicBool {
        match kind {
            ActionKind::CreateAccount => &self.create_account,
            ActionKind::Transfer => &self.transfer,
            ActionKind::CloseAccount => &self.close_account,
        }
    }

    fn try_acquire(&self, kind: ActionKind) -> Option<InFlightGuard<'_>> {
        let flag = self.flag(kind);
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard { flag })
    }
}

/// Clears the in-flight flag on every exit path.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct ActionSubmitter {
    backend: Arc<dyn BankingBackend>,
    surface: Arc<dyn UiSurface>,
    ui: Arc<Mutex<UiState>>,
    in_flight: InFlight,
    redirect_delay: Duration,
    session_expiry_redirect_delay: Duration,
    notification_autohide: Duration,
    navigations: Mutex<JoinSet<()>>,
    autohides: Mutex<JoinSet<()>>,
}

impl ActionSubmitter {
    pub fn new(
        backend: Arc<dyn BankingBackend>,
        surface: Arc<dyn UiSurface>,
        settings: &ClientSettings,
    ) -> Self {
        Self {
            backend,
            surface,
            ui: Arc::new(Mutex::new(UiState::default())),
            in_flight: InFlight::default(),
            redirect_delay: settings.redirect_delay,
            session_expiry_redirect_delay: settings.session_expiry_redirect_delay,
            notification_autohide: settings.notification_autohide,
            navigations: Mutex::new(JoinSet::new()),
            autohides: Mutex::new(JoinSet::new()),
        }
    }

    pub async fn is_busy(&self) -> bool {
        self.ui.lock().await.is_busy()
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.ui.lock().await.notifications().to_vec()
    }

    pub async fn dismiss(&self, notification_id: u64) {
        self.transition(|ui| ui.dismiss(notification_id)).await;
    }

    pub async fn submit_create_account(&self, form: &CreateAccountForm) -> SubmitOutcome {
        let kind = ActionKind::CreateAccount;
        let Some(_guard) = self.in_flight.try_acquire(kind) else {
            return self.already_in_flight(kind);
        };
        let request = match form.validate() {
            Ok(request) => request,
            Err(err) => return self.reject(kind, err).await,
        };

        info!(
            action = kind.as_str(),
            account_type = %request.account_type,
            "submitting action"
        );
        self.transition(UiState::show_busy).await;
        let result = self.backend.create_account(&request).await;
        self.transition(UiState::hide_busy).await;

        match result {
            Ok(account) => {
                info!(
                    action = kind.as_str(),
                    account_type = %account.account_type,
                    "account created"
                );
                self.succeed("Account created successfully!", ACCOUNTS_PATH)
                    .await
            }
            Err(failure) => self.fail(kind.failure_fallback(), failure).await,
        }
    }

    pub async fn submit_transfer(&self, form: &TransferForm) -> SubmitOutcome {
        let kind = ActionKind::Transfer;
        let Some(_guard) = self.in_flight.try_acquire(kind) else {
            return self.already_in_flight(kind);
        };
        let request = match form.validate() {
            Ok(request) => request,
            Err(err) => return self.reject(kind, err).await,
        };

        info!(
            action = kind.as_str(),
            from = %request.from_account_id,
            to = %request.to_account_id,
            transfer_type = %request.transfer_type,
            "submitting action"
        );
        self.transition(UiState::show_busy).await;
        let result = self.backend.transfer(&request).await;
        self.transition(UiState::hide_busy).await;

        match result {
            Ok(record) => {
                info!(action = kind.as_str(), transaction_id = %record.id, "transfer completed");
                self.succeed("Transfer completed successfully!", TRANSACTIONS_PATH)
                    .await
            }
            Err(failure) => self.fail(kind.failure_fallback(), failure).await,
        }
    }

    /// Closure is a traditional form post: on success the UI follows the
    /// backend to wherever the post landed, with no delay and no local toast.
    pub async fn submit_close_account(&self, form: &CloseAccountForm) -> SubmitOutcome {
        let kind = ActionKind::CloseAccount;
        let Some(_guard) = self.in_flight.try_acquire(kind) else {
            return self.already_in_flight(kind);
        };
        let request = match form.validate() {
            Ok(request) => request,
            Err(err) => return self.reject(kind, err).await,
        };

        info!(action = kind.as_str(), account_id = %request.account_id, "submitting action");
        self.transition(UiState::show_busy).await;
        let result = self.backend.close_account(&request).await;
        self.transition(UiState::hide_busy).await;

        match result {
            Ok(landed) => {
                info!(action = kind.as_str(), path = %landed, "account close posted");
                self.navigate_now(&landed);
                SubmitOutcome::Completed {
                    navigate_to: landed,
                }
            }
            Err(failure) => self.fail(kind.failure_fallback(), failure).await,
        }
    }

    pub async fn load_account_details(&self, account_id: &str) -> Option<AccountDetailsView> {
        if account_id.trim().is_empty() {
            return None;
        }

        self.transition(UiState::show_busy).await;
        let result = self
            .backend
            .account_details(&AccountId::from(account_id.trim()))
            .await;
        self.transition(UiState::hide_busy).await;

        match result {
            Ok(account) => Some(AccountDetailsView::from(&account)),
            Err(failure) => {
                self.fail(ACCOUNT_DETAILS_FALLBACK, failure).await;
                None
            }
        }
    }

    pub async fn load_transaction_details(
        &self,
        transaction_id: &str,
    ) -> Option<TransactionDetailsView> {
        if transaction_id.trim().is_empty() {
            return None;
        }

        self.transition(UiState::show_busy).await;
        let result = self
            .backend
            .transaction_details(&TransactionId::from(transaction_id.trim()))
            .await;
        self.transition(UiState::hide_busy).await;

        match result {
            Ok(record) => Some(TransactionDetailsView::from(&record)),
            Err(failure) => {
                self.fail(TRANSACTION_DETAILS_FALLBACK, failure).await;
                None
            }
        }
    }

    /// Filtering happens on the backend; this only navigates to the filtered listing.
    pub async fn filter_transactions_by_date(&self, form: &DateRangeForm) -> SubmitOutcome {
        match form.filter_path() {
            Ok(target) => {
                self.navigate_now(&target);
                SubmitOutcome::Completed {
                    navigate_to: target,
                }
            }
            Err(err) => {
                self.notify(Severity::Warning, err.to_string()).await;
                SubmitOutcome::Rejected(err)
            }
        }
    }

    /// Waits for every scheduled navigation to run. Pending autohides are
    /// left alone.
    pub async fn settle(&self) {
        let mut pending = std::mem::take(&mut *self.navigations.lock().await);
        while let Some(result) = pending.join_next().await {
            if let Err(err) = result {
                warn!(error = %err, "scheduled navigation task failed");
            }
        }
    }

    async fn transition(&self, apply: impl FnOnce(&mut UiState) -> Option<UiChange>) {
        let change = {
            let mut ui = self.ui.lock().await;
            apply(&mut ui)
        };
        if let Some(change) = change {
            self.surface.render(&change);
        }
    }

    fn already_in_flight(&self, kind: ActionKind) -> SubmitOutcome {
        debug!(action = kind.as_str(), "ignoring submit while request is in flight");
        SubmitOutcome::AlreadyInFlight
    }

    async fn reject(&self, kind: ActionKind, err: ValidationError) -> SubmitOutcome {
        debug!(action = kind.as_str(), reason = %err, "input rejected locally");
        self.notify(Severity::Warning, err.to_string()).await;
        SubmitOutcome::Rejected(err)
    }

    async fn succeed(&self, message: &str, target: &str) -> SubmitOutcome {
        self.notify(Severity::Success, message).await;
        self.schedule_navigation(target, self.redirect_delay).await;
        SubmitOutcome::Completed {
            navigate_to: target.to_string(),
        }
    }

    async fn fail(&self, fallback: &str, failure: RequestFailure) -> SubmitOutcome {
        warn!(error = %failure, "backend request failed");
        let message = failure.user_message(fallback);
        self.notify(Severity::Danger, message).await;
        if failure == RequestFailure::SessionExpired {
            self.schedule_navigation(LOGIN_PATH, self.session_expiry_redirect_delay)
                .await;
        }
        SubmitOutcome::Failed(failure)
    }

    async fn notify(&self, severity: Severity, message: impl Into<String>) {
        let change = self.ui.lock().await.notify(severity, message);
        self.surface.render(&change);
        if let UiChange::Notified(notification) = change {
            self.schedule_autohide(notification.id).await;
        }
    }

    async fn schedule_autohide(&self, notification_id: u64) {
        let deadline = Instant::now() + self.notification_autohide;
        let ui = Arc::clone(&self.ui);
        let surface = Arc::clone(&self.surface);

        let mut autohides = self.autohides.lock().await;
        reap_finished(&mut autohides, "notification autohide");
        autohides.spawn(async move {
            sleep_until(deadline).await;
            let change = ui.lock().await.dismiss(notification_id);
            if let Some(change) = change {
                surface.render(&change);
            }
        });
    }

    fn navigate_now(&self, target: &str) {
        debug!(path = target, "navigating");
        self.surface.navigate(target);
    }

    async fn schedule_navigation(&self, target: &str, delay: Duration) {
        self.surface.render(&UiChange::NavigationScheduled {
            target: target.to_string(),
            delay,
        });

        let deadline = Instant::now() + delay;
        let surface = Arc::clone(&self.surface);
        let target = target.to_string();

        let mut navigations = self.navigations.lock().await;
        reap_finished(&mut navigations, "scheduled navigation");
        navigations.spawn(async move {
            sleep_until(deadline).await;
            debug!(path = %target, "navigating");
            surface.navigate(&target);
        });
    }
}

/// Drops the results of tasks that already ran so the set only holds pending work.
fn reap_finished(tasks: &mut JoinSet<()>, task: &str) {
    while let Some(result) = tasks.try_join_next() {
        if let Err(err) = result {
            warn!(error = %err, task, "ui task failed");
        }
    }
}

#[cfg(test)]
#[path = "tests/submitter_tests.rs"]
mod tests;
