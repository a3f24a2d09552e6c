//! # Lease-financing gateway
//!
//! [`LeaseFinancingGateway`] maps the host platform's four payment lifecycle
//! operations onto the Acima API. The credential mode chosen in
//! [`GatewayConfig`] decides which endpoints are called:
//!
//! | Operation | OAuth mode | API-key mode |
//! |-----------|------------|--------------|
//! | authorize | no call | no call |
//! | capture / purchase | `PUT {api}/contracts/{lease}/delivery_confirmation` | `POST {iframe}merchants/{merchant}/leases/{lease}/finalize` |
//! | void | `POST {api}/applications/{lease}/cancel` | `POST {iframe}contracts/{lease}/termination` |
//!
//! Capture failures are reported as failed [`TransactionResponse`]s. Void
//! failures follow the configured [`VoidFailurePolicy`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate, Utc};
use parking_lot::RwLock;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Serialize;

use crate::auth::{self, BearerToken};
use crate::config::{ConfigError, Credentials, GatewayConfig, VoidFailurePolicy};
use crate::error::GatewayError;
use crate::http::{self, ProviderReply, ACCEPT_ACIMA_V2, API_TOKEN_HEADER};
use crate::response::TransactionResponse;
use crate::source::{GatewayOptions, PaymentSource, VoidCompleted};

/// Delivery date sent with a capture: the day after `today`, as `YYYY-MM-DD`.
pub fn selected_delivery_date(today: NaiveDate) -> String {
    today
        .checked_add_days(Days::new(1))
        .unwrap_or(today)
        .format("%F")
        .to_string()
}

#[derive(Serialize)]
struct DeliveryConfirmation {
    selected_delivery_date: String,
}

#[derive(Serialize)]
struct FinalizeRequest<'a> {
    checkout_token: &'a str,
    transaction: &'a serde_json::Value,
}

/// Result of a void.
#[derive(Debug, Clone, PartialEq)]
pub struct VoidOutcome {
    pub response: TransactionResponse,
    /// Status change for the host to apply. Only API-key mode emits one.
    pub completed: Option<VoidCompleted>,
}

impl VoidOutcome {
    /// Apply the status change, if any, to the host's payment source.
    pub fn apply_to(&self, source: &mut PaymentSource) -> bool {
        self.completed
            .as_ref()
            .is_some_and(|event| source.apply(event))
    }
}

/// Gateway adapter for Acima lease financing.
///
/// Cheap to clone; clones share the HTTP connection pool and bearer token.
#[derive(Debug, Clone)]
pub struct LeaseFinancingGateway {
    http: reqwest::Client,
    config: GatewayConfig,
    token: Arc<RwLock<Option<BearerToken>>>,
}

impl LeaseFinancingGateway {
    /// Create a gateway without touching the network.
    ///
    /// OAuth-mode gateways must be [`initialize`](Self::initialize)d before
    /// capture, purchase or void. A zero timeout is rejected.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            if secs == 0 {
                return Err(ConfigError::InvalidTimeout("0".into()).into());
            }
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(|e| GatewayError::Http {
            endpoint: "client_init".into(),
            source: e,
        })?;

        Ok(Self {
            http,
            config,
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Create and initialize a gateway in one step.
    pub async fn connect(config: GatewayConfig) -> Result<Self, GatewayError> {
        let gateway = Self::new(config)?;
        gateway.initialize().await?;
        Ok(gateway)
    }

    /// Obtain the bearer token (OAuth mode). A no-op in API-key mode.
    ///
    /// Calling it again replaces the held token.
    pub async fn initialize(&self) -> Result<(), GatewayError> {
        match &self.config.credentials {
            Credentials::OAuth(creds) => {
                let token = auth::exchange_client_credentials(&self.http, creds).await?;
                *self.token.write() = Some(token);
                Ok(())
            }
            Credentials::ApiKey(_) => Ok(()),
        }
    }

    /// Whether the gateway can make provider calls.
    pub fn is_initialized(&self) -> bool {
        match self.config.credentials {
            Credentials::OAuth(_) => self.token.read().is_some(),
            Credentials::ApiKey(_) => true,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Base URL used for provider calls in the active mode.
    pub fn api_base_url(&self) -> &str {
        match &self.config.credentials {
            Credentials::OAuth(creds) => &creds.api_base_url,
            Credentials::ApiKey(creds) => creds.iframe_url.as_str(),
        }
    }

    fn bearer(&self, operation: &'static str) -> Result<BearerToken, GatewayError> {
        self.token
            .read()
            .clone()
            .ok_or(GatewayError::NotInitialized { operation })
    }

    /// Approve a payment that the hosted checkout already authorized.
    ///
    /// Never calls the provider and never fails.
    pub fn authorize(
        &self,
        _amount: u64,
        source: &PaymentSource,
        _options: &GatewayOptions,
    ) -> TransactionResponse {
        tracing::debug!(lease_id = %source.lease_id, "authorize approved from checkout token");
        TransactionResponse::approved(source.attributes.clone(), source.checkout_token.as_str())
    }

    /// Confirm delivery (OAuth) or finalize the lease (API key).
    ///
    /// A provider failure comes back as `Ok` with `success == false`.
    pub async fn capture(
        &self,
        _amount: u64,
        response_code: &str,
        options: &GatewayOptions,
    ) -> Result<TransactionResponse, GatewayError> {
        let originator = options.require_originator("capture")?;
        let source = &originator.source;
        let lease_id = &source.lease_id;

        let (endpoint, reply, authorization) = match &self.config.credentials {
            Credentials::OAuth(creds) => {
                let token = self.bearer("capture")?;
                let endpoint = format!("PUT /contracts/{lease_id}/delivery_confirmation");
                let url = http::endpoint_url(
                    &creds.api_base_url,
                    &["contracts", lease_id.as_str(), "delivery_confirmation"],
                    &endpoint,
                )?;
                let body = DeliveryConfirmation {
                    selected_delivery_date: selected_delivery_date(Utc::now().date_naive()),
                };
                let request = self
                    .http
                    .put(url)
                    .header(AUTHORIZATION, token.header_value())
                    .header(ACCEPT, ACCEPT_ACIMA_V2)
                    .json(&body);
                let reply = http::send(request, &endpoint).await;
                (endpoint, reply, response_code)
            }
            Credentials::ApiKey(creds) => {
                let endpoint = format!(
                    "POST /merchants/{}/leases/{lease_id}/finalize",
                    creds.merchant_id
                );
                let url = http::endpoint_url(
                    creds.iframe_url.as_str(),
                    &[
                        "merchants",
                        creds.merchant_id.as_str(),
                        "leases",
                        lease_id.as_str(),
                        "finalize",
                    ],
                    &endpoint,
                )?;
                let transaction = originator
                    .order
                    .as_ref()
                    .and_then(|o| o.acima_transaction.as_ref())
                    .unwrap_or(&serde_json::Value::Null);
                let body = FinalizeRequest {
                    checkout_token: source.checkout_token.as_str(),
                    transaction,
                };
                let request = self
                    .http
                    .post(url)
                    .header(API_TOKEN_HEADER, creds.api_key.as_str())
                    .json(&body);
                let reply = http::send(request, &endpoint).await;
                (endpoint, reply, source.checkout_token.as_str())
            }
        };

        let body = reply.body(&endpoint)?;
        if reply.is_success() {
            tracing::info!(%lease_id, mode = self.config.credentials.mode(), "capture succeeded");
            Ok(TransactionResponse::captured(body, authorization))
        } else {
            tracing::warn!(
                %lease_id,
                status = ?reply.status_code(),
                "capture rejected by Acima"
            );
            Ok(TransactionResponse::error(body, reply.status_code()))
        }
    }

    /// Alias of [`capture`](Self::capture): Acima has no separate purchase flow.
    pub async fn purchase(
        &self,
        amount: u64,
        response_code: &str,
        options: &GatewayOptions,
    ) -> Result<TransactionResponse, GatewayError> {
        self.capture(amount, response_code, options).await
    }

    /// Cancel the application (OAuth) or terminate the contract (API key).
    ///
    /// A 2xx termination always yields the `REFUNDED` event. If its body is
    /// not a JSON object, the text is kept under [`RAW_BODY_KEY`](crate::RAW_BODY_KEY).
    pub async fn void(
        &self,
        response_code: &str,
        options: &GatewayOptions,
    ) -> Result<VoidOutcome, GatewayError> {
        let source = &options.require_originator("void")?.source;
        let lease_id = &source.lease_id;

        match &self.config.credentials {
            Credentials::OAuth(creds) => {
                let token = self.bearer("void")?;
                let endpoint = format!("POST /applications/{lease_id}/cancel");
                let url = http::endpoint_url(
                    &creds.api_base_url,
                    &["applications", lease_id.as_str(), "cancel"],
                    &endpoint,
                )?;
                let request = self
                    .http
                    .post(url)
                    .header(AUTHORIZATION, token.header_value())
                    .header(ACCEPT, ACCEPT_ACIMA_V2);
                let reply = http::send(request, &endpoint).await;
                if !reply.is_success() {
                    return self.void_failure(&reply, &endpoint);
                }

                tracing::info!(%lease_id, "application cancelled");
                Ok(VoidOutcome {
                    response: TransactionResponse::voided(response_code),
                    completed: None,
                })
            }
            Credentials::ApiKey(creds) => {
                let endpoint = format!("POST /contracts/{lease_id}/termination");
                let url = http::endpoint_url(
                    creds.iframe_url.as_str(),
                    &["contracts", lease_id.as_str(), "termination"],
                    &endpoint,
                )?;
                let request = self
                    .http
                    .post(url)
                    .header(API_TOKEN_HEADER, creds.api_key.as_str());
                let reply = http::send(request, &endpoint).await;
                if !reply.is_success() {
                    return self.void_failure(&reply, &endpoint);
                }

                // The contract is already terminated at this point, so an
                // unreadable body must not drop the status change.
                let body = reply.body_or_raw(&endpoint);
                tracing::info!(%lease_id, "contract terminated");
                Ok(VoidOutcome {
                    response: TransactionResponse::refunded(body, response_code),
                    completed: Some(VoidCompleted::refunded(lease_id.clone())),
                })
            }
        }
    }

    fn void_failure(
        &self,
        reply: &ProviderReply,
        endpoint: &str,
    ) -> Result<VoidOutcome, GatewayError> {
        match self.config.void_failure_policy {
            VoidFailurePolicy::Raise => Err(GatewayError::VoidRejected {
                status: reply.status_code(),
            }),
            VoidFailurePolicy::Report => Ok(VoidOutcome {
                response: TransactionResponse::error(reply.body(endpoint)?, reply.status_code()),
                completed: None,
            }),
        }
    }
}
