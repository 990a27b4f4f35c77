//! Duration and time expressions for token expiry.
//!
//! Durations (`365d`, `12h`) set a token's validity window. Time
//! expressions (relative like "+7d", absolute ISO 8601 or Unix epoch)
//! set an absolute expiry or simulate a different current time when
//! inspecting a decrypted token.

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::EcTokenError;

/// A parsed time target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeTarget {
    /// The resolved absolute timestamp.
    pub timestamp: DateTime<Utc>,
    /// The original expression provided by the user.
    pub expression: String,
}

/// Parse a positive duration such as `365d`, `+12h`, or `90s`.
///
/// Units: `s`, `m`, `h`, `d`, `w`, `y` (365 days).
///
/// # Errors
///
/// Returns an error if the amount is missing, zero, or too large, or if
/// the unit is unknown.
pub fn parse_duration(expression: &str) -> Result<TimeDelta, EcTokenError> {
    let err = |reason: &str| EcTokenError::InvalidDuration {
        expression: expression.to_string(),
        reason: reason.to_string(),
    };

    let body = expression.trim();
    let body = body.strip_prefix('+').unwrap_or(body);
    if body.starts_with('-') {
        return Err(err("duration must be positive"));
    }

    let delta = parse_amount_and_unit(body).map_err(|reason| err(&reason))?;
    if delta <= TimeDelta::zero() {
        return Err(err("duration must be positive"));
    }
    Ok(delta)
}

/// Parse a time expression into an absolute timestamp relative to `now`.
///
/// Supports the following formats:
/// - Relative: `+7d`, `-1h`, `+30m`, `+1y`, `-5s`
/// - Absolute ISO 8601: `2024-01-15T14:30:00Z`
/// - Absolute Unix epoch: `1705312200`
///
/// # Errors
///
/// Returns an error if the expression doesn't match any known format.
pub fn parse_time_expression(
    expression: &str,
    now: DateTime<Utc>,
) -> Result<TimeTarget, EcTokenError> {
    let err = |reason: String| EcTokenError::InvalidTimeExpression {
        expression: expression.to_string(),
        reason,
    };

    let trimmed = expression.trim();
    if trimmed.is_empty() {
        return Err(err("expression is empty".to_string()));
    }

    let timestamp = if let Some(rest) = trimmed.strip_prefix('+') {
        let delta = parse_amount_and_unit(rest).map_err(err)?;
        now.checked_add_signed(delta)
            .ok_or_else(|| err("resulting time is out of range".to_string()))?
    } else if let Some(rest) = trimmed.strip_prefix('-') {
        let delta = parse_amount_and_unit(rest).map_err(err)?;
        now.checked_sub_signed(delta)
            .ok_or_else(|| err("resulting time is out of range".to_string()))?
    } else if trimmed.chars().all(|c| c.is_ascii_digit()) {
        let secs = trimmed
            .parse::<i64>()
            .map_err(|_| err("epoch seconds out of range".to_string()))?;
        DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| err("epoch seconds out of range".to_string()))?
    } else {
        DateTime::parse_from_rfc3339(trimmed)
            .map_err(|e| err(format!("expected +/-<amount><unit>, RFC 3339, or epoch seconds ({e})")))?
            .with_timezone(&Utc)
    };

    Ok(TimeTarget {
        timestamp,
        expression: expression.to_string(),
    })
}

/// Parse `<digits><unit>` into a delta.
fn parse_amount_and_unit(body: &str) -> Result<TimeDelta, String> {
    let split = body
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| "missing unit (expected one of s, m, h, d, w, y)".to_string())?;
    let (digits, unit) = body.split_at(split);

    if digits.is_empty() {
        return Err("missing amount".to_string());
    }
    let amount: i64 = digits
        .parse()
        .map_err(|_| "amount is too large".to_string())?;

    let delta = match unit {
        "s" => TimeDelta::try_seconds(amount),
        "m" => TimeDelta::try_minutes(amount),
        "h" => TimeDelta::try_hours(amount),
        "d" => TimeDelta::try_days(amount),
        "w" => TimeDelta::try_weeks(amount),
        "y" => amount.checked_mul(365).and_then(TimeDelta::try_days),
        other => return Err(format!("unknown unit '{other}'")),
    };
    delta.ok_or_else(|| "amount is too large".to_string())
}

/// Format a delta as a short human-readable span, e.g. `3d 4h` or `42s`.
///
/// Only the two most significant units are shown.
#[must_use]
pub fn humanize(delta: TimeDelta) -> String {
    let total = delta.num_seconds().unsigned_abs();
    let units = [
        (total / 86_400, "d"),
        (total % 86_400 / 3_600, "h"),
        (total % 3_600 / 60, "m"),
        (total % 60, "s"),
    ];

    let parts: Vec<String> = units
        .iter()
        .skip_while(|(value, _)| *value == 0)
        .take(2)
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect();

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}
