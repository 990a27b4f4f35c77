//! Command handlers for each CLI subcommand.
//!
//! Each subcommand is implemented in its own module and exposes
//! a single `execute` function that receives the parsed arguments.
//! Helpers shared by several handlers live here.

pub mod decrypt;
pub mod encrypt;
pub mod roundtrip;

use std::io::{self, IsTerminal};

use chrono::{DateTime, Utc};

use ectoken::core::input;
use ectoken::core::key::TokenKey;
use ectoken::core::time_expr::{parse_duration, parse_time_expression};
use ectoken::core::token::Token;
use ectoken::error::EcTokenError;

use crate::cli::{ClaimArgs, KeyArgs};

/// Resolve and derive the key from `--key`, `--key-env`, or `ECTOKEN_KEY`.
fn load_key(args: &KeyArgs) -> Result<TokenKey, EcTokenError> {
    let secret = input::resolve_key(args.key.as_ref(), args.key_env.as_deref())?;
    TokenKey::derive(&secret)
}

/// Build a token from claim options, evaluated at `now`.
fn build_token(claims: &ClaimArgs, now: DateTime<Utc>) -> Result<Token, EcTokenError> {
    let mut builder = Token::builder();

    if let Some(duration) = &claims.valid_for {
        builder = builder.valid_for(parse_duration(duration)?);
    }
    if let Some(expression) = &claims.expires_at {
        builder = builder.expires_at(parse_time_expression(expression, now)?.timestamp);
    }
    if let Some(ip) = &claims.client_ip {
        builder = builder.client_ip(ip.as_str());
    }

    builder = claims.allow_country.iter().fold(builder, |b, v| b.allow_country(v.as_str()));
    builder = claims.deny_country.iter().fold(builder, |b, v| b.deny_country(v.as_str()));
    builder = claims.allow_host.iter().fold(builder, |b, v| b.allow_host(v.as_str()));
    builder = claims.deny_host.iter().fold(builder, |b, v| b.deny_host(v.as_str()));
    builder = claims.allow_proto.iter().fold(builder, |b, v| b.allow_protocol(v.as_str()));
    builder = claims.deny_proto.iter().fold(builder, |b, v| b.deny_protocol(v.as_str()));
    builder = claims.allow_referrer.iter().fold(builder, |b, v| b.allow_referrer(v.as_str()));
    builder = claims.deny_referrer.iter().fold(builder, |b, v| b.deny_referrer(v.as_str()));
    builder = claims.allow_url.iter().fold(builder, |b, v| b.allow_url(v.as_str()));

    builder.build_at(now)
}

/// Colors only for human output on a terminal.
fn use_color(json: bool) -> bool {
    !json && io::stdout().is_terminal()
}
