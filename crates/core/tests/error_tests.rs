// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use portfolio_dashboard_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn storage() {
        let err = CoreError::Storage("permission denied".into());
        assert_eq!(err.to_string(), "Storage error: permission denied");
    }

    #[test]
    fn serialization() {
        let err = CoreError::Serialization("buffer overflow".into());
        assert_eq!(err.to_string(), "Serialization error: buffer overflow");
    }

    #[test]
    fn deserialization() {
        let err = CoreError::Deserialization("unexpected EOF".into());
        assert_eq!(err.to_string(), "Deserialization error: unexpected EOF");
    }

    #[test]
    fn network() {
        let err = CoreError::Network("connection refused".into());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn api_failure_names_operation_and_status() {
        let err = CoreError::Api {
            operation: "add transaction",
            status: 500,
        };
        assert_eq!(
            err.to_string(),
            "Failed to add transaction: server returned status 500"
        );
    }

    #[test]
    fn channel() {
        let err = CoreError::Channel("stream reset".into());
        assert_eq!(err.to_string(), "Push channel error: stream reset");
    }

    #[test]
    fn malformed_message() {
        let err = CoreError::MalformedMessage("expected value at line 1".into());
        assert_eq!(
            err.to_string(),
            "Malformed portfolio message: expected value at line 1"
        );
    }

    #[test]
    fn unauthenticated() {
        let err = CoreError::Unauthenticated;
        assert_eq!(err.to_string(), "No active session — log in first");
    }

    #[test]
    fn invalid_credentials() {
        let err = CoreError::InvalidCredentials;
        assert_eq!(err.to_string(), "Login rejected — invalid credentials");
    }

    #[test]
    fn registration_rejected() {
        let err = CoreError::RegistrationRejected("username taken".into());
        assert_eq!(
            err.to_string(),
            "Registration rejected: username taken"
        );
    }
}

// ── Per-operation distinctness ──────────────────────────────────────

#[test]
fn each_failed_operation_reads_differently() {
    // The UI shows these verbatim next to the control that failed; the
    // same status on different operations must not collapse into one
    // message.
    let operations = ["add transaction", "delete transaction", "fetch transactions"];
    let messages: Vec<String> = operations
        .iter()
        .map(|op| {
            CoreError::Api {
                operation: op,
                status: 404,
            }
            .to_string()
        })
        .collect();

    for (i, a) in messages.iter().enumerate() {
        for b in messages.iter().skip(i + 1) {
            assert_ne!(a, b);
        }
        assert!(a.contains("404"));
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn io_error_becomes_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CoreError = io.into();
        match err {
            CoreError::Storage(msg) => assert!(msg.contains("denied")),
            other => panic!("expected Storage, got {other:?}"),
        }
    }

    #[test]
    fn serde_json_error_becomes_deserialization() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CoreError = parse_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }
}
