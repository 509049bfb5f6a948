use async_trait::async_trait;
use tracing::warn;

use crate::errors::CoreError;
use crate::session::SessionManager;

/// Asks the backend whether an access token is still accepted.
///
/// Implemented by `ApiClient` against `GET /auth/validate`; tests substitute
/// a mock. One call, one attempt — no retry.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// `Ok(true)` iff the backend answered 2xx for this token.
    async fn validate(&self, token: &str) -> Result<bool, CoreError>;
}

/// Result of a guard check on a protected view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Token present and accepted by the backend — render the view.
    Allowed,
    /// No token, or the backend rejected it — the caller must redirect to
    /// the login route.
    RedirectToLogin,
}

/// Gate in front of protected views.
///
/// With no token the route is unauthenticated and redirects immediately,
/// without touching the network. Otherwise one validation round trip
/// decides: rejection (or a transport failure reaching the backend) logs
/// the session out so a stale token is not retried forever.
pub struct SessionGuard;

impl SessionGuard {
    pub async fn check(
        session: &mut SessionManager,
        validator: &dyn TokenValidator,
    ) -> GuardOutcome {
        let Some(token) = session.token().map(str::to_owned) else {
            return GuardOutcome::RedirectToLogin;
        };

        match validator.validate(&token).await {
            Ok(true) => GuardOutcome::Allowed,
            Ok(false) => {
                warn!("access token rejected by backend — clearing session");
                Self::force_logout(session);
                GuardOutcome::RedirectToLogin
            }
            Err(e) => {
                warn!(error = %e, "token validation unreachable — clearing session");
                Self::force_logout(session);
                GuardOutcome::RedirectToLogin
            }
        }
    }

    /// Logout on the redirect path must not mask the guard outcome; a
    /// storage failure here is logged and the in-memory session is still
    /// cleared.
    fn force_logout(session: &mut SessionManager) {
        if let Err(e) = session.logout() {
            warn!(error = %e, "failed to clear persisted session");
        }
    }
}
