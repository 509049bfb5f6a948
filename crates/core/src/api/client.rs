use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use crate::errors::CoreError;
use crate::models::auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use crate::models::history::HistoryPoint;
use crate::models::transaction::Transaction;
use crate::session::TokenValidator;
use crate::sync::HistoryProvider;

/// All request/response paths hang off this prefix on the backend host.
pub(crate) const API_PREFIX: &str = "/v1/api";

/// One-shot request timeout. Long-lived streaming lives in `sync::channel`,
/// not here, so a hard ceiling is safe.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The authenticated request layer: every operation is exactly one network
/// round trip against the backend REST API.
///
/// Contract (uniform across operations):
/// - the caller supplies the session token; the client never fetches,
///   caches, or validates it,
/// - bearer credential and JSON content-type attached on every call,
/// - a non-2xx status maps to `CoreError::Api` with a distinct operation
///   name; a 2xx never errors, even on a semantically empty payload,
/// - one attempt — no retry, no caching; the caller decides what a failure
///   means.
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    /// `base_url` is the backend host, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Backend host this client talks to (without the `/v1/api` prefix).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    fn authed(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
    }

    /// Map a non-success status to the operation's failure; pass 2xx through.
    fn check_status(
        response: Response,
        operation: &'static str,
    ) -> Result<Response, CoreError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(CoreError::Api {
                operation,
                status: status.as_u16(),
            })
        }
    }

    // ── Auth ────────────────────────────────────────────────────────

    /// Exchange credentials for a token pair. Storing the pair is the
    /// session manager's job, not this layer's.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, CoreError> {
        let url = self.url("/auth/login");
        debug!(%url, "POST login");
        let response = self.client.post(&url).json(request).send().await?;
        let response = Self::check_status(response, "log in")?;
        Ok(response.json().await?)
    }

    /// Create a new account.
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<RegisterResponse, CoreError> {
        let url = self.url("/auth/register");
        debug!(%url, "POST register");
        let response = self.client.post(&url).json(request).send().await?;
        let response = Self::check_status(response, "register")?;
        Ok(response.json().await?)
    }

    /// Ask the backend whether a token is still accepted. A definite yes/no
    /// is an `Ok`; only failing to reach the backend is an error.
    pub async fn validate_token(&self, token: &str) -> Result<bool, CoreError> {
        let url = self.url("/auth/validate");
        debug!(%url, "GET validate");
        let response = self.authed(self.client.get(&url), token).send().await?;
        Ok(response.status().is_success())
    }

    // ── Transactions ────────────────────────────────────────────────

    /// Create a transaction in a portfolio. Returns the created transaction
    /// with its server-assigned id.
    pub async fn add_transaction(
        &self,
        token: &str,
        portfolio_id: i64,
        transaction: &Transaction,
    ) -> Result<Transaction, CoreError> {
        let url = self.url(&format!("/transaction/{portfolio_id}"));
        debug!(%url, symbol = %transaction.symbol, "POST transaction");
        let response = self
            .authed(self.client.post(&url), token)
            .json(transaction)
            .send()
            .await?;
        let response = Self::check_status(response, "add transaction")?;
        Ok(response.json().await?)
    }

    /// Delete a transaction by its id. The 2xx response body is empty.
    pub async fn delete_transaction(
        &self,
        token: &str,
        transaction_id: i64,
    ) -> Result<(), CoreError> {
        let url = self.url(&format!("/transaction/{transaction_id}"));
        debug!(%url, "DELETE transaction");
        let response = self.authed(self.client.delete(&url), token).send().await?;
        Self::check_status(response, "delete transaction")?;
        Ok(())
    }

    /// List the transactions behind one holding of a portfolio.
    pub async fn transactions_for_item(
        &self,
        token: &str,
        portfolio_id: i64,
        symbol: &str,
    ) -> Result<Vec<Transaction>, CoreError> {
        let url = self.url(&format!("/transaction/{portfolio_id}/{symbol}"));
        debug!(%url, "GET transactions");
        let response = self.authed(self.client.get(&url), token).send().await?;
        let response = Self::check_status(response, "fetch transactions")?;
        Ok(response.json().await?)
    }

    // ── Portfolio history ───────────────────────────────────────────

    /// Fetch the portfolio value time series. Independent of the push
    /// channel; the synchronizer replaces its history wholesale with this.
    pub async fn history(
        &self,
        token: &str,
        portfolio_id: i64,
    ) -> Result<Vec<HistoryPoint>, CoreError> {
        let url = self.url(&format!("/portfolio/{portfolio_id}/history"));
        debug!(%url, "GET history");
        let response = self.authed(self.client.get(&url), token).send().await?;
        let response = Self::check_status(response, "fetch history")?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl TokenValidator for ApiClient {
    async fn validate(&self, token: &str) -> Result<bool, CoreError> {
        self.validate_token(token).await
    }
}

/// Adapter binding an `ApiClient` and a session token into the
/// synchronizer's `HistoryProvider` seam.
pub struct ApiHistoryProvider {
    api: Arc<ApiClient>,
    token: String,
}

impl ApiHistoryProvider {
    pub fn new(api: Arc<ApiClient>, token: impl Into<String>) -> Self {
        Self {
            api,
            token: token.into(),
        }
    }
}

#[async_trait]
impl HistoryProvider for ApiHistoryProvider {
    async fn history(&self, portfolio_id: i64) -> Result<Vec<HistoryPoint>, CoreError> {
        self.api.history(&self.token, portfolio_id).await
    }
}
