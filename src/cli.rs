//! CLI argument definitions for ectoken.
//!
//! Uses `clap` derive macros to define the command-line interface.
//! Each subcommand has its own argument struct for type-safe parsing;
//! claim and key options are shared through flattened structs.
//!
//! # Security
//!
//! Argument structs implement custom `Debug` to redact sensitive fields
//! (tokens and keys) and prevent accidental leakage through debug
//! formatting, error chains, or logging.

use std::fmt;

use clap::{Args, Parser, Subcommand, ValueEnum};
use zeroize::Zeroizing;

/// An offline-first CLI for building, encrypting, and inspecting
/// Edgecast CDN access tokens (ECToken v3, AES-256-GCM).
#[derive(Debug, Parser)]
#[command(name = "ectoken")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    ///
    /// Logs go to stderr. RUST_LOG overrides this flag.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable single-line logs.
    Text,
    /// One JSON object per log line.
    Json,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build a token from claims and print it encrypted.
    Encrypt(EncryptArgs),

    /// Decrypt a token and inspect its claims and expiry.
    Decrypt(DecryptArgs),

    /// Build, encrypt, and decrypt a token, printing each stage and
    /// checking that the decrypted token matches. Without claim options,
    /// uses a token valid for 365 days for country DE and URL /assets.
    Roundtrip(RoundtripArgs),
}

/// Claim options shared by `encrypt` and `roundtrip`.
#[derive(Clone, Default, Args)]
#[group(id = "claims", multiple = true)]
pub struct ClaimArgs {
    /// Token validity measured from now, e.g. "365d", "12h", "30m", "1y".
    #[arg(long, value_name = "DURATION", conflicts_with = "expires_at")]
    pub valid_for: Option<String>,

    /// Absolute expiry: "+7d", ISO 8601 ("2025-01-01T00:00:00Z"), or Unix seconds.
    #[arg(long, value_name = "EXPR")]
    pub expires_at: Option<String>,

    /// Allowed country code (ISO 3166-1 alpha-2). Repeatable or comma-separated.
    #[arg(long = "allow-country", value_name = "CODE", value_delimiter = ',')]
    pub allow_country: Vec<String>,

    /// Denied country code. Repeatable or comma-separated.
    #[arg(long = "deny-country", value_name = "CODE", value_delimiter = ',')]
    pub deny_country: Vec<String>,

    /// Allowed URL path prefix, starting with '/'. Repeatable or comma-separated.
    #[arg(long = "allow-url", value_name = "PATH", value_delimiter = ',')]
    pub allow_url: Vec<String>,

    /// Allowed host name. Repeatable or comma-separated.
    #[arg(long = "allow-host", value_name = "HOST", value_delimiter = ',')]
    pub allow_host: Vec<String>,

    /// Denied host name. Repeatable or comma-separated.
    #[arg(long = "deny-host", value_name = "HOST", value_delimiter = ',')]
    pub deny_host: Vec<String>,

    /// Allowed protocol ("http" or "https"). Repeatable or comma-separated.
    #[arg(long = "allow-proto", value_name = "PROTO", value_delimiter = ',')]
    pub allow_proto: Vec<String>,

    /// Denied protocol ("http" or "https"). Repeatable or comma-separated.
    #[arg(long = "deny-proto", value_name = "PROTO", value_delimiter = ',')]
    pub deny_proto: Vec<String>,

    /// Allowed referrer, or "missing" for requests without one.
    #[arg(long = "allow-referrer", value_name = "REFERRER", value_delimiter = ',')]
    pub allow_referrer: Vec<String>,

    /// Denied referrer, or "missing" for requests without one.
    #[arg(long = "deny-referrer", value_name = "REFERRER", value_delimiter = ',')]
    pub deny_referrer: Vec<String>,

    /// Restrict the token to a single client IP address.
    #[arg(long, value_name = "IP")]
    pub client_ip: Option<String>,
}

impl ClaimArgs {
    /// Number of claim values given on the command line.
    pub fn value_count(&self) -> usize {
        let lists = [
            &self.allow_country,
            &self.deny_country,
            &self.allow_url,
            &self.allow_host,
            &self.deny_host,
            &self.allow_proto,
            &self.deny_proto,
            &self.allow_referrer,
            &self.deny_referrer,
        ];
        let singles = [&self.valid_for, &self.expires_at, &self.client_ip];
        lists.iter().map(|l| l.len()).sum::<usize>()
            + singles.iter().filter(|v| v.is_some()).count()
    }

    /// Whether no claim option was given at all.
    pub fn is_empty(&self) -> bool {
        self.value_count() == 0
    }
}

/// Custom `Debug` that hides claim values, which end up in the token
/// plaintext.
impl fmt::Debug for ClaimArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimArgs")
            .field("values", &self.value_count())
            .finish_non_exhaustive()
    }
}

/// Key options shared by every subcommand.
#[derive(Clone, Default, Args)]
pub struct KeyArgs {
    /// The shared key string configured on the CDN.
    ///
    /// WARNING: Passing keys via CLI arguments may expose them in shell
    /// history. Prefer --key-env or the ECTOKEN_KEY environment variable.
    #[arg(long, value_name = "KEY", value_parser = parse_zeroizing_string)]
    pub key: Option<Zeroizing<String>>,

    /// Read the key from the specified environment variable.
    #[arg(long, value_name = "VAR_NAME", conflicts_with = "key")]
    pub key_env: Option<String>,
}

/// Custom `Debug` that redacts the key.
impl fmt::Debug for KeyArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyArgs")
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .field("key_env", &self.key_env)
            .finish()
    }
}

/// Arguments for the `encrypt` subcommand.
#[derive(Args)]
pub struct EncryptArgs {
    #[command(flatten)]
    pub claims: ClaimArgs,

    /// Encrypt an already-formed token query string instead of building
    /// one from claim options. The string is validated first.
    #[arg(long, value_name = "QUERY", conflicts_with = "claims")]
    pub plaintext: Option<String>,

    #[command(flatten)]
    pub key: KeyArgs,

    /// Output raw JSON without colors (machine-readable).
    #[arg(long)]
    pub json: bool,
}

/// Custom `Debug` that redacts the plaintext field.
impl fmt::Debug for EncryptArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptArgs")
            .field("claims", &self.claims)
            .field("plaintext", &self.plaintext.as_ref().map(|_| "[REDACTED]"))
            .field("key", &self.key)
            .field("json", &self.json)
            .finish()
    }
}

/// Arguments for the `decrypt` subcommand.
#[derive(Args)]
pub struct DecryptArgs {
    /// The encrypted token. If omitted, reads from stdin.
    pub token: Option<String>,

    /// Read the token from the specified environment variable.
    #[arg(long, value_name = "VAR_NAME")]
    pub token_env: Option<String>,

    #[command(flatten)]
    pub key: KeyArgs,

    /// Simulate a different current time for the expiry check.
    ///
    /// Accepts relative expressions like "+7d", "-1h", "+30m" or
    /// absolute timestamps in ISO 8601 or Unix epoch format.
    #[arg(long, value_name = "EXPR")]
    pub time_travel: Option<String>,

    /// Output raw JSON without colors (machine-readable).
    #[arg(long)]
    pub json: bool,
}

/// Custom `Debug` that redacts the token field.
impl fmt::Debug for DecryptArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptArgs")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("token_env", &self.token_env)
            .field("key", &self.key)
            .field("time_travel", &self.time_travel)
            .field("json", &self.json)
            .finish()
    }
}

/// Arguments for the `roundtrip` subcommand.
#[derive(Debug, Args)]
pub struct RoundtripArgs {
    #[command(flatten)]
    pub claims: ClaimArgs,

    #[command(flatten)]
    pub key: KeyArgs,
}

/// Parse a string into a `Zeroizing<String>` for secure CLI arguments.
fn parse_zeroizing_string(s: &str) -> Result<Zeroizing<String>, std::convert::Infallible> {
    Ok(Zeroizing::new(s.to_string()))
}
