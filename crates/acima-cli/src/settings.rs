//! # Gateway settings loading
//!
//! The CLI reads gateway preferences from a YAML file when `--config` is
//! given, and from `ACIMA_*` environment variables otherwise.
//!
//! ```yaml
//! iframe_url: https://sandbox-iframe.acimacredit.com/
//! client_id: my-client
//! client_secret: my-secret
//! void_failure_policy: raise
//! ```

use std::path::Path;

use anyhow::{Context, Result};

use acima_gateway::{GatewayConfig, GatewayPreferences};

/// Resolve the gateway configuration for this invocation.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading gateway config {}", path.display()))?;
            let config = parse_config(&raw)
                .with_context(|| format!("parsing gateway config {}", path.display()))?;
            tracing::debug!(path = %path.display(), mode = config.credentials.mode(), "loaded gateway config");
            Ok(config)
        }
        None => {
            let config = GatewayConfig::from_env().context("loading gateway config from environment")?;
            tracing::debug!(mode = config.credentials.mode(), "loaded gateway config from environment");
            Ok(config)
        }
    }
}

/// Parse YAML preferences into a gateway configuration.
pub fn parse_config(raw: &str) -> Result<GatewayConfig> {
    let prefs: GatewayPreferences = serde_yaml::from_str(raw)?;
    Ok(GatewayConfig::from_preferences(prefs)?)
}
