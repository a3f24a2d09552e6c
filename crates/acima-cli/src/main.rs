//! # acima CLI entry point
//!
//! Parses command-line arguments, builds the gateway and dispatches to the
//! lifecycle handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use acima_cli::lifecycle::{
    run_authorize, run_capture, run_token, run_void, AuthorizeArgs, CaptureArgs, VoidArgs,
};
use acima_cli::settings::load_config;
use acima_gateway::LeaseFinancingGateway;

/// Acima lease-financing gateway CLI.
///
/// Reads gateway settings from `--config` (YAML) or `ACIMA_*` environment
/// variables and prints each transaction response as JSON.
#[derive(Parser, Debug)]
#[command(name = "acima", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML gateway configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Approve a payment from its checkout token (no provider call).
    Authorize(AuthorizeArgs),

    /// Capture a lease: confirm delivery or finalize.
    Capture(CaptureArgs),

    /// Same as capture.
    Purchase(CaptureArgs),

    /// Cancel or terminate a lease.
    Void(VoidArgs),

    /// Exchange client credentials for a bearer token and report the result.
    Token,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let config = load_config(cli.config.as_deref())?;
    let gateway = LeaseFinancingGateway::new(config)?;

    // Handlers validate their flags before opening a provider session.
    match &cli.command {
        Commands::Authorize(args) => run_authorize(&gateway, args),
        Commands::Capture(args) => run_capture(&gateway, args, false).await,
        Commands::Purchase(args) => run_capture(&gateway, args, true).await,
        Commands::Void(args) => run_void(&gateway, args).await,
        Commands::Token => run_token(&gateway).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_capture() {
        let cli = Cli::try_parse_from([
            "acima",
            "capture",
            "--lease-id",
            "L-1",
            "--checkout-token",
            "ct-1",
            "--response-code",
            "rc-1",
            "--transaction",
            r#"{"id":"tx-1"}"#,
        ])
        .unwrap();
        if let Commands::Capture(args) = cli.command {
            assert_eq!(args.source.lease_id, "L-1");
            assert_eq!(args.source.checkout_token, "ct-1");
            assert_eq!(args.response_code, "rc-1");
            assert_eq!(args.amount, 0);
            assert!(args.transaction.is_some());
        } else {
            panic!("expected capture");
        }
    }

    #[test]
    fn cli_parse_authorize() {
        let cli = Cli::try_parse_from([
            "acima",
            "authorize",
            "--lease-id",
            "L-1",
            "--checkout-token",
            "ct-1",
            "--amount",
            "4990",
        ])
        .unwrap();
        if let Commands::Authorize(args) = cli.command {
            assert_eq!(args.amount, 4990);
        } else {
            panic!("expected authorize");
        }
    }

    #[test]
    fn cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "acima",
            "-vv",
            "--config",
            "acima.yaml",
            "void",
            "--lease-id",
            "L-1",
            "--checkout-token",
            "ct-1",
            "--response-code",
            "rc",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("acima.yaml")));
        assert!(matches!(cli.command, Commands::Void(_)));
    }

    #[test]
    fn cli_void_requires_response_code() {
        let result = Cli::try_parse_from([
            "acima",
            "void",
            "--lease-id",
            "L-1",
            "--checkout-token",
            "ct-1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parse_token() {
        let cli = Cli::try_parse_from(["acima", "token"]).unwrap();
        assert!(matches!(cli.command, Commands::Token));
    }
}
