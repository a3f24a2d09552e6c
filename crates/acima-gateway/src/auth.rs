//! OAuth client-credentials exchange.
//!
//! Calls `POST {api}/oauth/token` once and yields a [`BearerToken`] that is
//! held for the gateway's lifetime. Tokens are not refreshed.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::config::OAuthCredentials;
use crate::error::GatewayError;
use crate::http;

/// Audience requested in the client-credentials grant.
pub const TOKEN_AUDIENCE: &str = "https://aperture.acimacredit.com";

/// OAuth access token for Acima REST calls.
#[derive(Clone)]
pub struct BearerToken(Zeroizing<String>);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// `Authorization` header value.
    pub(crate) fn header_value(&self) -> String {
        format!("Bearer {}", self.as_str())
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'a str,
    grant_type: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchange client credentials for a bearer token.
pub(crate) async fn exchange_client_credentials(
    http_client: &reqwest::Client,
    creds: &OAuthCredentials,
) -> Result<BearerToken, GatewayError> {
    let endpoint = "POST /oauth/token";
    let url = http::endpoint_url(&creds.api_base_url, &["oauth", "token"], endpoint)?;
    let body = TokenRequest {
        client_id: &creds.client_id,
        client_secret: creds.client_secret.as_str(),
        audience: TOKEN_AUDIENCE,
        grant_type: "client_credentials",
    };

    // `.json()` also sets `Content-Type: application/json`.
    let reply = http::send(http_client.post(url).json(&body), endpoint).await;

    if !reply.is_success() {
        return Err(GatewayError::TokenExchange {
            status: reply.status_code(),
            body: reply.text,
        });
    }

    let parsed: TokenResponse =
        serde_json::from_str(&reply.text).map_err(|e| GatewayError::MalformedResponse {
            endpoint: endpoint.to_string(),
            reason: format!("missing access_token: {e}"),
        })?;

    tracing::info!(client_id = %creds.client_id, "obtained Acima bearer token");
    Ok(BearerToken::new(parsed.access_token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_debug_is_redacted() {
        let token = BearerToken::new("abc123");
        assert_eq!(format!("{token:?}"), "BearerToken([REDACTED])");
        assert_eq!(token.header_value(), "Bearer abc123");
    }

    #[test]
    fn token_request_serializes_grant() {
        let req = TokenRequest {
            client_id: "cid",
            client_secret: "secret",
            audience: TOKEN_AUDIENCE,
            grant_type: "client_credentials",
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "client_id": "cid",
                "client_secret": "secret",
                "audience": "https://aperture.acimacredit.com",
                "grant_type": "client_credentials"
            })
        );
    }
}
