//! # acima-gateway -- Acima lease-financing payment gateway
//!
//! Bridges a host checkout platform's payment-method abstraction to the
//! Acima consumer-lending API. Four lifecycle operations are exposed:
//!
//! - **authorize**: approved locally from the checkout token issued by the
//!   hosted iframe; no provider call.
//! - **capture** / **purchase**: confirm delivery (or finalize the lease) so
//!   Acima funds the purchase.
//! - **void**: cancel the application (or terminate the contract).
//!
//! Every operation returns the host's generic [`TransactionResponse`] shape.
//!
//! ## Credential modes
//!
//! [`Credentials::OAuth`] exchanges a client id and secret for a bearer token
//! during [`LeaseFinancingGateway::initialize`]. [`Credentials::ApiKey`] sends
//! a static `API-Token` header and needs no initialization.
//!
//! ## Example
//!
//! ```rust,no_run
//! use acima_gateway::{
//!     GatewayConfig, GatewayOptions, LeaseFinancingGateway, Originator, PaymentSource,
//! };
//!
//! # async fn example() -> Result<(), acima_gateway::GatewayError> {
//! let gateway = LeaseFinancingGateway::connect(GatewayConfig::from_env()?).await?;
//!
//! let mut source = PaymentSource::new("L-1001", "ct-9f2");
//! let options = GatewayOptions::for_originator(Originator::new(source.clone()));
//!
//! let captured = gateway.capture(0, "ct-9f2", &options).await?;
//! assert!(captured.success);
//!
//! let voided = gateway.void("ct-9f2", &options).await?;
//! voided.apply_to(&mut source);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub(crate) mod http;
pub mod response;
pub mod source;

pub use auth::BearerToken;
pub use config::{
    ApiKeyCredentials, ConfigError, Credentials, GatewayConfig, GatewayPreferences,
    OAuthCredentials, VoidFailurePolicy,
};
pub use error::{GatewayError, VOID_REJECTED_MESSAGE};
pub use gateway::{LeaseFinancingGateway, VoidOutcome};
pub use http::RAW_BODY_KEY;
pub use response::{ResponseBody, TransactionResponse};
pub use source::{
    CheckoutToken, GatewayOptions, LeaseId, Order, Originator, PaymentSource, VoidCompleted,
    REFUNDED_STATUS,
};
