//! Handler for the `roundtrip` subcommand.
//!
//! Builds a token, encrypts it, decrypts the result with the same key,
//! and prints each stage as `<stage>: <value>`. Fails if the decrypted
//! token differs from the one that was built. Without claim options the
//! demonstration token is used: valid for 365 days, country `DE`, URL
//! `/assets`.

use std::fmt::Display;

use anyhow::Result;
use chrono::Utc;
use tracing::{error, info};

use ectoken::core::token::Token;
use ectoken::error::EcTokenError;

use crate::cli::{ClaimArgs, RoundtripArgs};

use super::{build_token, load_key};

/// Execute the `roundtrip` subcommand with the given arguments.
pub fn execute(args: &RoundtripArgs) -> Result<()> {
    let key = load_key(&args.key)?;

    let defaults;
    let claims = if args.claims.is_empty() {
        info!("no claim options given, using demonstration claims");
        defaults = demo_claims();
        &defaults
    } else {
        &args.claims
    };

    let token = inspect(build_token(claims, Utc::now())?, "token");
    let encrypted = inspect(token.encrypt(&key)?, "encrypted");
    let decrypted = inspect(Token::decrypt(&encrypted, &key)?, "decrypted");

    if decrypted != token {
        error!("decrypted token differs from the original");
        return Err(EcTokenError::RoundTripMismatch.into());
    }

    info!(claims = token.claim_count(), "round trip succeeded");
    Ok(())
}

/// The demonstration token: one year, Germany, `/assets`.
fn demo_claims() -> ClaimArgs {
    ClaimArgs {
        valid_for: Some("365d".to_string()),
        allow_country: vec!["DE".to_string()],
        allow_url: vec!["/assets".to_string()],
        ..ClaimArgs::default()
    }
}

/// Print a labelled stage and pass the value through.
fn inspect<T: Display>(value: T, stage: &str) -> T {
    println!("{stage}: {value}");
    value
}
