//! Claim names and value types.
//!
//! Each claim restricts where or how a token may be used. Values are
//! validated on construction so that a [`Token`](crate::core::token::Token)
//! can only hold well-formed claims.

use std::fmt;
use std::str::FromStr;

use crate::error::EcTokenError;

/// Separator between `name=value` pairs.
pub const PAIR_SEPARATOR: char = '&';

/// Separator between items of a list-valued claim.
pub const LIST_SEPARATOR: char = ',';

/// Referrer keyword matching requests that carry no `Referer` header.
pub const MISSING_REFERRER: &str = "missing";

/// A recognized claim name.
///
/// Variant order is the canonical serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClaimName {
    Expire,
    ClientIp,
    CountryAllow,
    CountryDeny,
    HostAllow,
    HostDeny,
    ProtoAllow,
    ProtoDeny,
    RefAllow,
    RefDeny,
    UrlAllow,
}

impl ClaimName {
    /// All recognized claims in canonical order.
    pub const ALL: [ClaimName; 11] = [
        Self::Expire,
        Self::ClientIp,
        Self::CountryAllow,
        Self::CountryDeny,
        Self::HostAllow,
        Self::HostDeny,
        Self::ProtoAllow,
        Self::ProtoDeny,
        Self::RefAllow,
        Self::RefDeny,
        Self::UrlAllow,
    ];

    /// The wire name of this claim.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Expire => "ec_expire",
            Self::ClientIp => "ec_clientip",
            Self::CountryAllow => "ec_country_allow",
            Self::CountryDeny => "ec_country_deny",
            Self::HostAllow => "ec_host_allow",
            Self::HostDeny => "ec_host_deny",
            Self::ProtoAllow => "ec_proto_allow",
            Self::ProtoDeny => "ec_proto_deny",
            Self::RefAllow => "ec_ref_allow",
            Self::RefDeny => "ec_ref_deny",
            Self::UrlAllow => "ec_url_allow",
        }
    }

    /// Look up a claim by its wire name. Matching is case-sensitive.
    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|claim| claim.as_str() == name)
    }
}

impl fmt::Display for ClaimName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ISO 3166-1 alpha-2 country code, stored upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountryCode(String);

impl CountryCode {
    /// Parse and normalize a country code for the given claim.
    pub fn parse(claim: ClaimName, value: &str) -> Result<Self, EcTokenError> {
        let trimmed = value.trim();
        if trimmed.len() != 2 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid(claim, value, "expected a two-letter country code"));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request protocol a token may be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    /// Parse a protocol for the given claim. Matching is case-insensitive.
    pub fn parse(claim: ClaimName, value: &str) -> Result<Self, EcTokenError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            _ => Err(invalid(claim, value, "expected 'http' or 'https'")),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = EcTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(ClaimName::ProtoAllow, s)
    }
}

/// Validate a URL path prefix for `ec_url_allow`.
pub fn validate_url_path(value: &str) -> Result<String, EcTokenError> {
    let trimmed = value.trim();
    if !trimmed.starts_with('/') {
        return Err(invalid(
            ClaimName::UrlAllow,
            value,
            "URL path must start with '/'",
        ));
    }
    check_reserved(ClaimName::UrlAllow, trimmed)?;
    Ok(trimmed.to_string())
}

/// Validate a host name for `ec_host_allow` / `ec_host_deny`.
pub fn validate_host(claim: ClaimName, value: &str) -> Result<String, EcTokenError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid(claim, value, "host must not be empty"));
    }
    if trimmed.contains('/') {
        return Err(invalid(claim, value, "host must not contain a path"));
    }
    check_reserved(claim, trimmed)?;
    Ok(trimmed.to_ascii_lowercase())
}

/// Validate a referrer for `ec_ref_allow` / `ec_ref_deny`.
///
/// The keyword `missing` is accepted in any case and stored lower case.
pub fn validate_referrer(claim: ClaimName, value: &str) -> Result<String, EcTokenError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid(claim, value, "referrer must not be empty"));
    }
    if trimmed.eq_ignore_ascii_case(MISSING_REFERRER) {
        return Ok(MISSING_REFERRER.to_string());
    }
    check_reserved(claim, trimmed)?;
    Ok(trimmed.to_string())
}

/// Reject characters that would break the query-string encoding.
fn check_reserved(claim: ClaimName, value: &str) -> Result<(), EcTokenError> {
    if let Some(c) = value
        .chars()
        .find(|&c| c == PAIR_SEPARATOR || c == LIST_SEPARATOR || c == '=' || c.is_whitespace())
    {
        return Err(invalid(
            claim,
            value,
            &format!("character {c:?} is not allowed"),
        ));
    }
    Ok(())
}

pub(crate) fn invalid(claim: ClaimName, value: &str, reason: &str) -> EcTokenError {
    EcTokenError::InvalidClaimValue {
        claim: claim.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
