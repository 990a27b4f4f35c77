//! Handler for the `encrypt` subcommand.
//!
//! Builds a token from claim options (or validates a ready-made query
//! string) and prints the encrypted token.

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use ectoken::core::token::Token;

use crate::cli::EncryptArgs;

use super::{build_token, load_key};

/// Machine-readable output of `encrypt --json`.
#[derive(Debug, Serialize)]
struct EncryptOutput {
    token: String,
    plaintext: String,
    claims: Value,
}

/// Execute the `encrypt` subcommand with the given arguments.
pub fn execute(args: &EncryptArgs) -> Result<()> {
    let key = load_key(&args.key)?;

    let token = match &args.plaintext {
        Some(plaintext) => Token::parse(plaintext)?,
        None => build_token(&args.claims, Utc::now())?,
    };
    let encrypted = token.encrypt(&key)?;
    info!(claims = token.claim_count(), "token encrypted");

    if args.json {
        let output = EncryptOutput {
            token: encrypted,
            plaintext: token.to_plaintext(),
            claims: token.to_json(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{encrypted}");
    }

    Ok(())
}
