//! Token status display for the expiry claim.
//!
//! Renders human-readable status information for `ec_expire`:
//! - Expired tokens: red "EXPIRED (X ago)"
//! - Valid tokens: green "VALID (expires in X)"
//! - Tokens without expiry: yellow "no expiry set"

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use colored::Colorize;
use serde_json::{Value, json};

use crate::core::time_expr::humanize;
use crate::core::token::Token;

/// Expiry state of a token at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    /// The token carries no `ec_expire` claim.
    NoExpiry,
    /// The token is still usable.
    Valid {
        expires_at: DateTime<Utc>,
        remaining: TimeDelta,
    },
    /// The token has expired.
    Expired {
        expires_at: DateTime<Utc>,
        elapsed: TimeDelta,
    },
}

impl ExpiryStatus {
    /// Evaluate the token's expiry at `now`.
    #[must_use]
    pub fn evaluate(token: &Token, now: DateTime<Utc>) -> Self {
        match token.expires_at() {
            None => Self::NoExpiry,
            Some(expires_at) if token.is_expired_at(now) => Self::Expired {
                expires_at,
                elapsed: now - expires_at,
            },
            Some(expires_at) => Self::Valid {
                expires_at,
                remaining: expires_at - now,
            },
        }
    }

    /// Machine-readable state name.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NoExpiry => "no_expiry",
            Self::Valid { .. } => "valid",
            Self::Expired { .. } => "expired",
        }
    }

    /// Status line without color, e.g. `VALID (expires in 3d 4h)`.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::NoExpiry => "no expiry set".to_string(),
            Self::Valid { remaining, .. } => format!("VALID (expires in {})", humanize(*remaining)),
            Self::Expired { elapsed, .. } => format!("EXPIRED ({} ago)", humanize(*elapsed)),
        }
    }
}

/// Display the expiry status of a token.
///
/// `now` is the evaluation time, which may be simulated via
/// `--time-travel`.
pub fn display_token_status(token: &Token, now: DateTime<Utc>, use_color: bool) {
    let status = ExpiryStatus::evaluate(token, now);
    let line = status.describe();
    let line = match (use_color, status) {
        (false, _) => line,
        (true, ExpiryStatus::NoExpiry) => line.yellow().to_string(),
        (true, ExpiryStatus::Valid { .. }) => line.green().to_string(),
        (true, ExpiryStatus::Expired { .. }) => line.red().bold().to_string(),
    };

    if let Some(expires_at) = token.expires_at() {
        println!("Expires at:   {}", format_time(expires_at));
    }
    println!("Evaluated at: {}", format_time(now));
    println!("Status:       {line}");
}

/// Status as a JSON object for `--json` output.
#[must_use]
pub fn status_json(token: &Token, now: DateTime<Utc>) -> Value {
    let status = ExpiryStatus::evaluate(token, now);
    json!({
        "state": status.label(),
        "expires_at": token.expires_at().map(format_time),
        "evaluated_at": format_time(now),
    })
}

fn format_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
