use thiserror::Error;

/// Unified error type for the entire portfolio-dashboard-core library.
/// Every public fallible function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Storage ─────────────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to {operation}: server returned status {status}")]
    Api {
        operation: &'static str,
        status: u16,
    },

    // ── Push channel ────────────────────────────────────────────────
    #[error("Push channel error: {0}")]
    Channel(String),

    #[error("Malformed portfolio message: {0}")]
    MalformedMessage(String),

    // ── Session / credentials ───────────────────────────────────────
    #[error("No active session — log in first")]
    Unauthenticated,

    #[error("Login rejected — invalid credentials")]
    InvalidCredentials,

    #[error("Registration rejected: {0}")]
    RegistrationRejected(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Sanitize error message: strip query parameters from URLs so a
        // token accidentally passed as a query never leaks into logs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
