//! Gateway configuration.
//!
//! A gateway talks to Acima in one of two modes, chosen by which credentials
//! are supplied:
//!
//! - **OAuth** (`client_id` + `client_secret`): calls the `api.acimacredit.com`
//!   REST API with a bearer token obtained through a client-credentials
//!   exchange. The API host is derived from the iframe URL, so a sandbox
//!   iframe selects the sandbox API.
//! - **API key** (`merchant_id` + `api_key`): calls paths under the iframe
//!   URL directly with a static `API-Token` header.
//!
//! Configuration is immutable once built. It can be assembled from a
//! deserialized [`GatewayPreferences`] mapping or from environment variables.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;
use zeroize::Zeroizing;

/// Production API base URL.
pub const PRODUCTION_API_URL: &str = "https://api.acimacredit.com/api";

/// Sandbox API base URL.
pub const SANDBOX_API_URL: &str = "https://api-sandbox.acimacredit.com/api";

/// Derive the API base URL from an iframe URL.
///
/// Any iframe URL containing `sandbox` maps to the sandbox API host.
pub fn derive_api_base_url(iframe_url: &str) -> &'static str {
    if iframe_url.contains("sandbox") {
        SANDBOX_API_URL
    } else {
        PRODUCTION_API_URL
    }
}

/// What `void` does when the provider rejects the cancellation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoidFailurePolicy {
    /// Fail the call with [`GatewayError::VoidRejected`](crate::GatewayError::VoidRejected).
    #[default]
    Raise,
    /// Return a failed `TransactionResponse`, the same way capture does.
    Report,
}

impl FromStr for VoidFailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raise" => Ok(Self::Raise),
            "report" => Ok(Self::Report),
            other => Err(ConfigError::InvalidVoidFailurePolicy(other.to_string())),
        }
    }
}

/// OAuth client-credentials mode.
#[derive(Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: Zeroizing<String>,
    pub iframe_url: Url,
    /// Base URL for REST calls, without a trailing slash. Derived from
    /// `iframe_url` unless overridden.
    pub api_base_url: String,
}

impl OAuthCredentials {
    /// Build OAuth credentials, deriving the API base URL from the iframe URL.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>, iframe_url: Url) -> Self {
        let api_base_url = derive_api_base_url(iframe_url.as_str()).to_string();
        Self {
            client_id: client_id.into(),
            client_secret: Zeroizing::new(client_secret.into()),
            iframe_url,
            api_base_url,
        }
    }

    /// Point REST calls at a different host (staging, local mock).
    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("iframe_url", &self.iframe_url)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

/// Static API-key mode.
#[derive(Clone)]
pub struct ApiKeyCredentials {
    pub merchant_id: String,
    pub iframe_url: Url,
    pub api_key: Zeroizing<String>,
}

impl ApiKeyCredentials {
    pub fn new(merchant_id: impl Into<String>, iframe_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            iframe_url,
            api_key: Zeroizing::new(api_key.into()),
        }
    }
}

impl std::fmt::Debug for ApiKeyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyCredentials")
            .field("merchant_id", &self.merchant_id)
            .field("iframe_url", &self.iframe_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// How the gateway authenticates against Acima.
#[derive(Debug, Clone)]
pub enum Credentials {
    OAuth(OAuthCredentials),
    ApiKey(ApiKeyCredentials),
}

impl Credentials {
    /// Short label for log fields.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::OAuth(_) => "oauth",
            Self::ApiKey(_) => "api_key",
        }
    }
}

/// Full gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub credentials: Credentials,
    /// Request timeout in seconds. `None` keeps the HTTP client default.
    pub timeout_secs: Option<u64>,
    pub void_failure_policy: VoidFailurePolicy,
}

impl GatewayConfig {
    /// Configuration with default timeout and void policy.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            timeout_secs: None,
            void_failure_policy: VoidFailurePolicy::default(),
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn with_void_failure_policy(mut self, policy: VoidFailurePolicy) -> Self {
        self.void_failure_policy = policy;
        self
    }

    /// Build a configuration from the host's preference mapping.
    ///
    /// Client credentials select OAuth mode; a merchant id plus API key
    /// select API-key mode. When both sets are present OAuth wins.
    pub fn from_preferences(prefs: GatewayPreferences) -> Result<Self, ConfigError> {
        let raw_iframe = prefs.iframe_url.ok_or(ConfigError::MissingIframeUrl)?;
        let iframe_url = parse_url("iframe_url", &raw_iframe)?;

        let oauth = match (prefs.client_id, prefs.client_secret) {
            (Some(id), Some(secret)) => Some((id, secret)),
            _ => None,
        };
        let api_key = match (prefs.merchant_id, prefs.api_key) {
            (Some(merchant), Some(key)) => Some((merchant, key)),
            _ => None,
        };

        let credentials = match (oauth, api_key) {
            (Some((client_id, client_secret)), other) => {
                if other.is_some() {
                    tracing::warn!(
                        "both client credentials and an API key were configured; using OAuth mode"
                    );
                }
                let mut creds = OAuthCredentials::new(client_id, client_secret, iframe_url);
                if let Some(api_url) = prefs.api_url {
                    parse_url("api_url", &api_url)?;
                    creds = creds.with_api_base_url(api_url);
                }
                Credentials::OAuth(creds)
            }
            (None, Some((merchant_id, key))) => {
                Credentials::ApiKey(ApiKeyCredentials::new(merchant_id, iframe_url, key))
            }
            (None, None) => return Err(ConfigError::MissingCredentials),
        };

        if prefs.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidTimeout("0".into()));
        }

        Ok(Self {
            credentials,
            timeout_secs: prefs.timeout_secs,
            void_failure_policy: prefs.void_failure_policy.unwrap_or_default(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ACIMA_IFRAME_URL` (required)
    /// - `ACIMA_CLIENT_ID` / `ACIMA_CLIENT_SECRET` (OAuth mode)
    /// - `ACIMA_MERCHANT_ID` / `ACIMA_API_KEY` (API-key mode)
    /// - `ACIMA_API_URL` (optional override of the derived API base URL)
    /// - `ACIMA_TIMEOUT_SECS` (optional, whole seconds, greater than zero)
    /// - `ACIMA_VOID_FAILURE_POLICY` (`raise` | `report`, default `raise`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let void_failure_policy = lookup("ACIMA_VOID_FAILURE_POLICY")
            .map(|s| s.parse::<VoidFailurePolicy>())
            .transpose()?;
        let timeout_secs = lookup("ACIMA_TIMEOUT_SECS")
            .map(|s| {
                s.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidTimeout(s.clone()))
            })
            .transpose()?;

        Self::from_preferences(GatewayPreferences {
            iframe_url: lookup("ACIMA_IFRAME_URL"),
            client_id: lookup("ACIMA_CLIENT_ID"),
            client_secret: lookup("ACIMA_CLIENT_SECRET"),
            merchant_id: lookup("ACIMA_MERCHANT_ID"),
            api_key: lookup("ACIMA_API_KEY"),
            api_url: lookup("ACIMA_API_URL"),
            timeout_secs,
            void_failure_policy,
        })
    }
}

/// Recognized preference keys, as the host platform stores them.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct GatewayPreferences {
    pub iframe_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub merchant_id: Option<String>,
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub void_failure_policy: Option<VoidFailurePolicy>,
}

impl std::fmt::Debug for GatewayPreferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("GatewayPreferences")
            .field("iframe_url", &self.iframe_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("merchant_id", &self.merchant_id)
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("void_failure_policy", &self.void_failure_policy)
            .finish()
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(key.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("iframe_url is required")]
    MissingIframeUrl,
    #[error("either client_id/client_secret or merchant_id/api_key must be configured")]
    MissingCredentials,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid void failure policy {0:?}: expected \"raise\" or \"report\"")]
    InvalidVoidFailurePolicy(String),
    #[error("invalid timeout {0:?}: expected a whole number of seconds greater than zero")]
    InvalidTimeout(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn sandbox_iframe_selects_sandbox_api() {
        let url = derive_api_base_url("https://sandbox-iframe.acimacredit.com/");
        assert_eq!(url, SANDBOX_API_URL);
        assert!(url.contains("-sandbox"));
    }

    #[test]
    fn production_iframe_selects_production_api() {
        let url = derive_api_base_url("https://iframe.acimacredit.com/");
        assert_eq!(url, PRODUCTION_API_URL);
        assert!(!url.contains("sandbox"));
    }

    #[test]
    fn preferences_with_client_credentials_select_oauth() {
        let cfg = GatewayConfig::from_preferences(GatewayPreferences {
            iframe_url: Some("https://sandbox.acimacredit.com/".into()),
            client_id: Some("cid".into()),
            client_secret: Some("secret".into()),
            ..Default::default()
        })
        .unwrap();
        match cfg.credentials {
            Credentials::OAuth(c) => {
                assert_eq!(c.client_id, "cid");
                assert_eq!(c.api_base_url, SANDBOX_API_URL);
            }
            other => panic!("expected OAuth, got {other:?}"),
        }
        assert_eq!(cfg.void_failure_policy, VoidFailurePolicy::Raise);
    }

    #[test]
    fn preferences_with_api_key_select_api_key_mode() {
        let cfg = GatewayConfig::from_preferences(GatewayPreferences {
            iframe_url: Some("https://iframe.acimacredit.com/".into()),
            merchant_id: Some("merchant-1".into()),
            api_key: Some("key".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(cfg.credentials.mode(), "api_key");
    }

    #[test]
    fn preferences_without_credentials_are_rejected() {
        let err = GatewayConfig::from_preferences(GatewayPreferences {
            iframe_url: Some("https://iframe.acimacredit.com/".into()),
            client_id: Some("cid".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials));
    }

    #[test]
    fn preferences_without_iframe_url_are_rejected() {
        let err = GatewayConfig::from_preferences(GatewayPreferences::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingIframeUrl));
    }

    #[test]
    fn api_url_override_replaces_derived_base() {
        let cfg = GatewayConfig::from_preferences(GatewayPreferences {
            iframe_url: Some("https://iframe.acimacredit.com/".into()),
            client_id: Some("cid".into()),
            client_secret: Some("secret".into()),
            api_url: Some("http://127.0.0.1:9000/api".into()),
            ..Default::default()
        })
        .unwrap();
        let Credentials::OAuth(c) = cfg.credentials else {
            panic!("expected OAuth");
        };
        assert_eq!(c.api_base_url, "http://127.0.0.1:9000/api");
    }

    #[test]
    fn preferences_deserialize_from_json() {
        let prefs: GatewayPreferences = serde_json::from_value(serde_json::json!({
            "iframe_url": "https://iframe.acimacredit.com/",
            "merchant_id": "m-1",
            "api_key": "k",
            "void_failure_policy": "report"
        }))
        .unwrap();
        let cfg = GatewayConfig::from_preferences(prefs).unwrap();
        assert_eq!(cfg.void_failure_policy, VoidFailurePolicy::Report);
    }

    #[test]
    fn env_lookup_builds_api_key_config() {
        let cfg = GatewayConfig::from_lookup(lookup_from(&[
            ("ACIMA_IFRAME_URL", "https://iframe.acimacredit.com/"),
            ("ACIMA_MERCHANT_ID", "m-1"),
            ("ACIMA_API_KEY", "k"),
            ("ACIMA_TIMEOUT_SECS", "12"),
        ]))
        .unwrap();
        assert_eq!(cfg.timeout_secs, Some(12));
        assert_eq!(cfg.credentials.mode(), "api_key");
    }

    #[test]
    fn env_lookup_rejects_unknown_void_policy() {
        let err = GatewayConfig::from_lookup(lookup_from(&[
            ("ACIMA_IFRAME_URL", "https://iframe.acimacredit.com/"),
            ("ACIMA_MERCHANT_ID", "m-1"),
            ("ACIMA_API_KEY", "k"),
            ("ACIMA_VOID_FAILURE_POLICY", "ignore"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVoidFailurePolicy(_)));
    }

    #[test]
    fn env_lookup_rejects_unparseable_timeout() {
        let err = GatewayConfig::from_lookup(lookup_from(&[
            ("ACIMA_IFRAME_URL", "https://iframe.acimacredit.com/"),
            ("ACIMA_MERCHANT_ID", "m-1"),
            ("ACIMA_API_KEY", "k"),
            ("ACIMA_TIMEOUT_SECS", "30s"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout(ref v) if v == "30s"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = GatewayConfig::from_lookup(lookup_from(&[
            ("ACIMA_IFRAME_URL", "https://iframe.acimacredit.com/"),
            ("ACIMA_MERCHANT_ID", "m-1"),
            ("ACIMA_API_KEY", "k"),
            ("ACIMA_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout(_)));

        let err = GatewayConfig::from_preferences(GatewayPreferences {
            iframe_url: Some("https://iframe.acimacredit.com/".into()),
            merchant_id: Some("m-1".into()),
            api_key: Some("k".into()),
            timeout_secs: Some(0),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout(_)));
    }

    #[test]
    fn debug_redacts_secrets() {
        let creds = OAuthCredentials::new(
            "cid",
            "super-secret",
            Url::parse("https://iframe.acimacredit.com/").unwrap(),
        );
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));

        let key = ApiKeyCredentials::new(
            "m-1",
            Url::parse("https://iframe.acimacredit.com/").unwrap(),
            "api-key-value",
        );
        assert!(!format!("{key:?}").contains("api-key-value"));
    }
}
