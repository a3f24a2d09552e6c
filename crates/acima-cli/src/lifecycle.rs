//! # Lifecycle subcommands
//!
//! `authorize`, `capture`, `purchase`, `void` and `token`. Each handler runs
//! one gateway operation and prints the result as JSON on stdout.
//!
//! Handlers that reach the provider validate their flags first and only then
//! open the session with [`LeaseFinancingGateway::initialize`].
//!
//! Exit codes: `0` when the provider accepted the operation, `2` when it
//! returned a reported failure. Fatal gateway errors surface as `Err`.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use acima_gateway::{
    GatewayOptions, LeaseFinancingGateway, Order, Originator, PaymentSource, TransactionResponse,
    VoidCompleted,
};

/// Exit code for a provider-reported failure.
pub const EXIT_DECLINED: u8 = 2;

/// Payment source identifiers shared by every lifecycle command.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Lease identifier assigned by Acima.
    #[arg(long)]
    pub lease_id: String,

    /// Checkout token issued by the hosted iframe.
    #[arg(long)]
    pub checkout_token: String,
}

impl SourceArgs {
    fn payment_source(&self) -> PaymentSource {
        PaymentSource::new(&self.lease_id, &self.checkout_token)
    }
}

/// Arguments for `acima authorize`.
#[derive(Args, Debug)]
pub struct AuthorizeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Amount in minor units (ignored by the provider).
    #[arg(long, default_value_t = 0)]
    pub amount: u64,

    /// Payment-source attributes as a JSON object.
    #[arg(long)]
    pub attributes: Option<String>,
}

/// Arguments for `acima capture` and `acima purchase`.
#[derive(Args, Debug)]
pub struct CaptureArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Amount in minor units (ignored by the provider).
    #[arg(long, default_value_t = 0)]
    pub amount: u64,

    /// Response code echoed back as the authorization reference.
    #[arg(long)]
    pub response_code: String,

    /// Stored order transaction payload as JSON (API-key mode).
    #[arg(long)]
    pub transaction: Option<String>,
}

/// Arguments for `acima void`.
#[derive(Args, Debug)]
pub struct VoidArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Response code echoed back as the authorization reference.
    #[arg(long)]
    pub response_code: String,
}

#[derive(Serialize)]
struct VoidReport<'a> {
    response: &'a TransactionResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<&'a VoidCompleted>,
}

fn parse_json(flag: &str, raw: &str) -> Result<serde_json::Value> {
    serde_json::from_str(raw).with_context(|| format!("--{flag} must be valid JSON"))
}

fn exit_code(response: &TransactionResponse) -> u8 {
    if response.success {
        0
    } else {
        EXIT_DECLINED
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Build the authorize response without contacting the provider.
pub fn authorize(gateway: &LeaseFinancingGateway, args: &AuthorizeArgs) -> Result<TransactionResponse> {
    let mut source = args.source.payment_source();
    if let Some(raw) = &args.attributes {
        match parse_json("attributes", raw)? {
            serde_json::Value::Object(map) => source = source.with_attributes(map),
            _ => anyhow::bail!("--attributes must be a JSON object"),
        }
    }
    Ok(gateway.authorize(args.amount, &source, &GatewayOptions::default()))
}

/// Execute `acima authorize`.
pub fn run_authorize(gateway: &LeaseFinancingGateway, args: &AuthorizeArgs) -> Result<u8> {
    let response = authorize(gateway, args)?;
    print_json(&response)?;
    Ok(exit_code(&response))
}

/// Assemble the options mapping for capture and purchase.
pub fn capture_options(args: &CaptureArgs) -> Result<GatewayOptions> {
    let mut originator = Originator::new(args.source.payment_source());
    if let Some(raw) = &args.transaction {
        originator = originator.with_order(Order {
            number: None,
            acima_transaction: Some(parse_json("transaction", raw)?),
        });
    }
    Ok(GatewayOptions::for_originator(originator))
}

/// Open the provider session. A no-op in API-key mode.
async fn start_session(gateway: &LeaseFinancingGateway) -> Result<()> {
    gateway.initialize().await.context("token exchange failed")
}

/// Execute `acima capture`, or `acima purchase` when `purchase` is set.
pub async fn run_capture(
    gateway: &LeaseFinancingGateway,
    args: &CaptureArgs,
    purchase: bool,
) -> Result<u8> {
    let options = capture_options(args)?;
    start_session(gateway).await?;
    let result = if purchase {
        gateway.purchase(args.amount, &args.response_code, &options).await
    } else {
        gateway.capture(args.amount, &args.response_code, &options).await
    };
    let response = result.context("capture failed")?;

    print_json(&response)?;
    Ok(exit_code(&response))
}

/// Execute `acima void`.
pub async fn run_void(gateway: &LeaseFinancingGateway, args: &VoidArgs) -> Result<u8> {
    let options = GatewayOptions::for_originator(Originator::new(args.source.payment_source()));
    start_session(gateway).await?;
    let outcome = gateway
        .void(&args.response_code, &options)
        .await
        .context("void failed")?;

    print_json(&VoidReport {
        response: &outcome.response,
        completed: outcome.completed.as_ref(),
    })?;
    Ok(exit_code(&outcome.response))
}

/// Execute `acima token`: run the initialization step only.
pub async fn run_token(gateway: &LeaseFinancingGateway) -> Result<u8> {
    start_session(gateway).await?;
    println!(
        "gateway initialized ({} mode, {})",
        gateway.config().credentials.mode(),
        gateway.api_base_url()
    );
    Ok(0)
}
