//! # acima-cli -- Acima gateway command-line interface
//!
//! Runs single lifecycle operations against Acima for support and
//! integration checks, using the same gateway the checkout platform embeds.
//!
//! ## Subcommands
//!
//! - `authorize`: local approval from a checkout token
//! - `capture` / `purchase`: delivery confirmation or lease finalize
//! - `void`: application cancel or contract termination
//! - `token`: run the OAuth token exchange only
//!
//! Argument parsing lives in `main.rs`; handlers here only delegate to
//! `acima-gateway`.

pub mod lifecycle;
pub mod settings;
