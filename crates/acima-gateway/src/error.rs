//! Gateway error types.
//!
//! Only fatal failures live here. A provider rejecting a capture is not an
//! error: it comes back as a failed [`TransactionResponse`](crate::TransactionResponse).

/// Literal message raised when the provider rejects a void.
pub const VOID_REJECTED_MESSAGE: &str =
    "Acima Server Response Error: Did not get correct response code";

/// Errors that terminate a gateway call.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The HTTP client could not be built.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The OAuth client-credentials exchange did not succeed.
    #[error("Acima Server Response Error: {body}")]
    TokenExchange {
        /// HTTP status of the token reply; `None` when the request never got one.
        status: Option<u16>,
        body: String,
    },
    /// The provider rejected a void under [`VoidFailurePolicy::Raise`](crate::VoidFailurePolicy::Raise).
    #[error("Acima Server Response Error: Did not get correct response code")]
    VoidRejected {
        /// HTTP status of the reply; `None` on transport failure.
        status: Option<u16>,
    },
    /// A bearer-authenticated call was made before `initialize` succeeded.
    #[error("gateway not initialized: call initialize() before {operation}")]
    NotInitialized { operation: &'static str },
    /// The options mapping carried no originator.
    #[error("{operation} requires an originator in the gateway options")]
    MissingOriginator { operation: &'static str },
    /// A request URL could not be built from the configured base URL and ids.
    #[error("invalid request to {endpoint}: {reason}")]
    InvalidRequest { endpoint: String, reason: String },
    /// A successful provider reply could not be interpreted.
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn void_rejected_uses_literal_message() {
        let err = GatewayError::VoidRejected { status: Some(422) };
        assert_eq!(err.to_string(), VOID_REJECTED_MESSAGE);
    }

    #[test]
    fn token_exchange_message_includes_body() {
        let err = GatewayError::TokenExchange {
            status: Some(401),
            body: r#"{"error":"invalid_client"}"#.into(),
        };
        assert_eq!(
            err.to_string(),
            r#"Acima Server Response Error: {"error":"invalid_client"}"#
        );
    }

    #[test]
    fn invalid_request_names_endpoint() {
        let err = GatewayError::InvalidRequest {
            endpoint: "POST /contracts/{lease}/termination".into(),
            reason: "lease id must not be empty".into(),
        };
        assert!(err.to_string().contains("/termination"));
        assert!(err.to_string().contains("lease id"));
    }

    #[test]
    fn not_initialized_names_operation() {
        let err = GatewayError::NotInitialized { operation: "capture" };
        assert!(err.to_string().contains("capture"));
    }
}
