pub mod api;
pub mod errors;
pub mod models;
pub mod session;
pub mod storage;
pub mod sync;

use std::sync::Arc;

use api::{ApiClient, ApiHistoryProvider};
use errors::CoreError;
use models::auth::{LoginRequest, RegisterRequest, RegisterResponse};
use models::theme::Theme;
use models::transaction::Transaction;
use session::{GuardOutcome, SessionGuard, SessionManager};
use storage::{KeyValueStore, KEY_THEME};
use sync::{PortfolioSynchronizer, SseChannelFactory, SyncOptions};

/// Main entry point for the Portfolio Dashboard core.
///
/// Owns the session, the authenticated request layer, and at most one live
/// portfolio synchronizer; a front end holds a single instance and reads
/// state views from it. Constructed once at process start with an explicit
/// storage backend — there are no ambient globals.
#[must_use]
pub struct PortfolioDashboard {
    api: Arc<ApiClient>,
    session: SessionManager,
    store: Arc<dyn KeyValueStore>,
    synchronizer: Option<PortfolioSynchronizer>,
}

impl std::fmt::Debug for PortfolioDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioDashboard")
            .field("base_url", &self.api.base_url())
            .field("session", &self.session)
            .field(
                "bound_portfolio",
                &self.synchronizer.as_ref().map(|s| s.portfolio_id()),
            )
            .finish()
    }
}

impl PortfolioDashboard {
    /// Build against a backend host (e.g. `http://localhost:8080`),
    /// restoring any persisted session from `store`.
    pub fn new(
        base_url: impl Into<String>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, CoreError> {
        let session = SessionManager::load(Arc::clone(&store))?;
        Ok(Self {
            api: Arc::new(ApiClient::new(base_url)),
            session,
            store,
            synchronizer: None,
        })
    }

    // ── Session ─────────────────────────────────────────────────────

    /// Exchange credentials with the backend and store the resulting token
    /// pair. A 2xx response that still reports `success: false` means bad
    /// credentials and leaves the session untouched.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), CoreError> {
        let response = self
            .api
            .login(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;
        if !response.success {
            return Err(CoreError::InvalidCredentials);
        }
        self.session.login(response.token, response.refresh_token)
    }

    /// Create a new account. Does not log in — the caller navigates to the
    /// login flow on success, as the UI does.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse, CoreError> {
        let response = self
            .api
            .register(&RegisterRequest {
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        if !response.success {
            return Err(CoreError::RegistrationRejected(
                response
                    .message
                    .unwrap_or_else(|| "check your details".to_string()),
            ));
        }
        Ok(response)
    }

    /// Clear the session everywhere. Idempotent.
    pub fn logout(&mut self) -> Result<(), CoreError> {
        self.session.logout()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Guard check for a protected view: no token redirects immediately,
    /// otherwise one validation round trip decides; rejection clears the
    /// session.
    pub async fn guard(&mut self) -> GuardOutcome {
        let api = Arc::clone(&self.api);
        SessionGuard::check(&mut self.session, api.as_ref()).await
    }

    // ── Live portfolio ──────────────────────────────────────────────

    /// Bind the dashboard to a portfolio: tears down any previous binding
    /// (fresh state, fresh channel), spawns the synchronizer, and performs
    /// the initial history fetch.
    pub async fn bind_portfolio(&mut self, portfolio_id: i64) -> Result<(), CoreError> {
        let token = self.require_token()?.to_string();
        self.unbind_portfolio();

        let factory =
            Arc::new(SseChannelFactory::new(self.api.base_url()).with_bearer(token.clone()));
        let history = Arc::new(ApiHistoryProvider::new(Arc::clone(&self.api), token));
        let synchronizer = PortfolioSynchronizer::spawn(
            factory,
            history,
            portfolio_id,
            SyncOptions::default(),
        );
        synchronizer.refresh().await;
        self.synchronizer = Some(synchronizer);
        Ok(())
    }

    /// Tear down the current binding, if any. No-op otherwise.
    pub fn unbind_portfolio(&mut self) {
        if let Some(mut synchronizer) = self.synchronizer.take() {
            synchronizer.teardown();
        }
    }

    /// The live synchronizer for the currently bound portfolio.
    #[must_use]
    pub fn synchronizer(&self) -> Option<&PortfolioSynchronizer> {
        self.synchronizer.as_ref()
    }

    // ── Transactions ────────────────────────────────────────────────

    /// Create a transaction; returns it with the server-assigned id.
    pub async fn add_transaction(
        &self,
        portfolio_id: i64,
        transaction: &Transaction,
    ) -> Result<Transaction, CoreError> {
        let token = self.require_token()?;
        self.api
            .add_transaction(token, portfolio_id, transaction)
            .await
    }

    /// Delete a transaction by id.
    pub async fn delete_transaction(&self, transaction_id: i64) -> Result<(), CoreError> {
        let token = self.require_token()?;
        self.api.delete_transaction(token, transaction_id).await
    }

    /// List the transactions behind one holding.
    pub async fn transactions_for_item(
        &self,
        portfolio_id: i64,
        symbol: &str,
    ) -> Result<Vec<Transaction>, CoreError> {
        let token = self.require_token()?;
        self.api
            .transactions_for_item(token, portfolio_id, symbol)
            .await
    }

    // ── Theme ───────────────────────────────────────────────────────

    /// Current display theme; defaults to `Light` when never set.
    pub fn theme(&self) -> Result<Theme, CoreError> {
        Ok(self
            .store
            .get(KEY_THEME)?
            .map(|v| Theme::from_stored(&v))
            .unwrap_or_default())
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), CoreError> {
        self.store.set(KEY_THEME, theme.as_str())
    }

    /// Flip between light and dark; returns the newly active theme.
    pub fn toggle_theme(&self) -> Result<Theme, CoreError> {
        let next = self.theme()?.toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn require_token(&self) -> Result<&str, CoreError> {
        self.session.token().ok_or(CoreError::Unauthenticated)
    }
}
