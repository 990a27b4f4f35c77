//! Handler for the `decrypt` subcommand.
//!
//! Decrypts a token and prints its plaintext, claims, and expiry status.
//! Supports reading the token from a CLI argument, environment variable,
//! or stdin, and time-travel evaluation of the expiry claim.

use anyhow::Result;
use chrono::Utc;
use serde_json::json;
use tracing::info;

use ectoken::core::input;
use ectoken::core::time_expr::parse_time_expression;
use ectoken::core::token::Token;
use ectoken::display::json_printer::print_json;
use ectoken::display::token_status::{display_token_status, status_json};

use crate::cli::DecryptArgs;

use super::{load_key, use_color};

/// Execute the `decrypt` subcommand with the given arguments.
pub fn execute(args: &DecryptArgs) -> Result<()> {
    let encrypted = input::resolve_token(args.token.as_deref(), args.token_env.as_deref())?;
    let key = load_key(&args.key)?;
    let token = Token::decrypt(&encrypted, &key)?;
    info!(claims = token.claim_count(), "token decrypted");

    let now = match &args.time_travel {
        Some(expression) => {
            let target = parse_time_expression(expression, Utc::now())?;
            info!(expression = %target.expression, at = %target.timestamp, "time travel");
            target.timestamp
        }
        None => Utc::now(),
    };

    if args.json {
        let output = json!({
            "plaintext": token.to_plaintext(),
            "claims": token.to_json(),
            "status": status_json(&token, now),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let color = use_color(args.json);
    println!("--- Plaintext ---");
    println!("{token}");
    println!();
    println!("--- Claims ---");
    print_json(&token.to_json(), color);
    println!();
    println!("--- Token Status ---");
    display_token_status(&token, now, color);

    Ok(())
}
