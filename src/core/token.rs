//! Token model, builder, and query-string codec.
//!
//! A token's plaintext is a query string of `name=value` pairs joined by
//! `&`; list-valued claims join their items with `,`:
//!
//! ```text
//! ec_expire=1735689600&ec_country_allow=DE,FR&ec_url_allow=/assets
//! ```
//!
//! [`TokenBuilder`] collects raw claim values and validates all of them in
//! [`TokenBuilder::build`]. Parsing applies the same validation, so a
//! [`Token`] always holds well-formed claims.

use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::core::cipher;
use crate::core::claims::{
    self, ClaimName, CountryCode, LIST_SEPARATOR, PAIR_SEPARATOR, Protocol, invalid,
};
use crate::core::key::TokenKey;
use crate::error::EcTokenError;

/// Maximum plaintext length accepted for encryption or produced by parsing.
pub const MAX_PLAINTEXT_LEN: usize = 512;

/// A validated set of access claims.
///
/// Equality compares every claim; expiry has one-second resolution.
/// List claims compare in order, matching the plaintext they serialize
/// to, so `ec_country_allow=DE,FR` and `ec_country_allow=FR,DE` differ.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Token {
    expire: Option<i64>,
    client_ip: Option<IpAddr>,
    country_allow: Vec<CountryCode>,
    country_deny: Vec<CountryCode>,
    host_allow: Vec<String>,
    host_deny: Vec<String>,
    proto_allow: Vec<Protocol>,
    proto_deny: Vec<Protocol>,
    ref_allow: Vec<String>,
    ref_deny: Vec<String>,
    url_allow: Vec<String>,
    extra: Vec<(String, String)>,
}

impl Token {
    /// Start building a token.
    #[must_use]
    pub fn builder() -> TokenBuilder {
        TokenBuilder::default()
    }

    /// Start building a token that expires `validity` after it is built.
    #[must_use]
    pub fn valid_for(validity: TimeDelta) -> TokenBuilder {
        TokenBuilder::default().valid_for(validity)
    }

    /// Parse a token from its plaintext query string.
    ///
    /// # Errors
    ///
    /// Returns an error for empty or oversized input, malformed segments,
    /// duplicated claims, or invalid claim values.
    pub fn parse(plaintext: &str) -> Result<Self, EcTokenError> {
        let plaintext = plaintext.trim();
        if plaintext.len() > MAX_PLAINTEXT_LEN {
            return Err(EcTokenError::TokenTooLong {
                len: plaintext.len(),
                max: MAX_PLAINTEXT_LEN,
            });
        }

        let mut token = Token::default();
        let mut seen = BTreeSet::new();

        for segment in plaintext.split(PAIR_SEPARATOR).filter(|s| !s.is_empty()) {
            let (name, value) = segment
                .split_once('=')
                .filter(|(name, _)| !name.is_empty())
                .ok_or_else(|| EcTokenError::MalformedClaim {
                    segment: segment.to_string(),
                })?;

            let Some(claim) = ClaimName::from_wire(name) else {
                warn!(claim = name, "preserving unrecognized claim");
                token.extra.push((name.to_string(), value.to_string()));
                continue;
            };

            if !seen.insert(claim) {
                return Err(EcTokenError::DuplicateClaim {
                    name: claim.to_string(),
                });
            }

            match claim {
                ClaimName::Expire => token.expire = Some(parse_expire(value)?),
                ClaimName::ClientIp => token.client_ip = Some(parse_client_ip(value)?),
                _ => {
                    for item in value.split(LIST_SEPARATOR) {
                        token.push_list_item(claim, item)?;
                    }
                }
            }
        }

        if token.is_empty() {
            return Err(EcTokenError::EmptyToken);
        }

        debug!(claims = token.claim_count(), "parsed token");
        Ok(token)
    }

    /// Decrypt and parse an encrypted token.
    ///
    /// # Errors
    ///
    /// Returns an error if decryption fails or the plaintext is not a
    /// valid token.
    pub fn decrypt(encrypted: &str, key: &TokenKey) -> Result<Self, EcTokenError> {
        let plaintext = cipher::decrypt(encrypted, key)?;
        Self::parse(&plaintext)
    }

    /// Encrypt this token with a fresh IV.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or too long, or if the
    /// cipher fails.
    pub fn encrypt(&self, key: &TokenKey) -> Result<String, EcTokenError> {
        let plaintext = self.to_plaintext();
        check_plaintext_len(&plaintext)?;
        cipher::encrypt(&plaintext, key)
    }

    /// Serialize the claims in canonical order.
    #[must_use]
    pub fn to_plaintext(&self) -> String {
        self.pairs()
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(&PAIR_SEPARATOR.to_string())
    }

    /// Render the claims as a JSON object.
    ///
    /// `ec_expire` is a number, `ec_clientip` and unrecognized claims are
    /// strings, and list claims are arrays of strings.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        if let Some(expire) = self.expire {
            map.insert(ClaimName::Expire.to_string(), Value::from(expire));
        }
        if let Some(ip) = self.client_ip {
            map.insert(ClaimName::ClientIp.to_string(), Value::from(ip.to_string()));
        }
        for (claim, items) in self.lists() {
            if !items.is_empty() {
                map.insert(claim.to_string(), Value::from(items));
            }
        }
        for (name, value) in &self.extra {
            map.insert(name.clone(), Value::from(value.as_str()));
        }
        Value::Object(map)
    }

    /// The expiry time, if one is set.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expire
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// The raw `ec_expire` value in Unix seconds.
    #[must_use]
    pub fn expire_timestamp(&self) -> Option<i64> {
        self.expire
    }

    /// Whether the token has expired at `now`. Tokens without expiry never do.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expire.is_some_and(|secs| now.timestamp() >= secs)
    }

    #[must_use]
    pub fn client_ip(&self) -> Option<IpAddr> {
        self.client_ip
    }

    #[must_use]
    pub fn allowed_countries(&self) -> &[CountryCode] {
        &self.country_allow
    }

    #[must_use]
    pub fn denied_countries(&self) -> &[CountryCode] {
        &self.country_deny
    }

    #[must_use]
    pub fn allowed_hosts(&self) -> &[String] {
        &self.host_allow
    }

    #[must_use]
    pub fn denied_hosts(&self) -> &[String] {
        &self.host_deny
    }

    #[must_use]
    pub fn allowed_protocols(&self) -> &[Protocol] {
        &self.proto_allow
    }

    #[must_use]
    pub fn denied_protocols(&self) -> &[Protocol] {
        &self.proto_deny
    }

    #[must_use]
    pub fn allowed_referrers(&self) -> &[String] {
        &self.ref_allow
    }

    #[must_use]
    pub fn denied_referrers(&self) -> &[String] {
        &self.ref_deny
    }

    #[must_use]
    pub fn allowed_urls(&self) -> &[String] {
        &self.url_allow
    }

    /// Unrecognized `name=value` pairs, in their original order.
    #[must_use]
    pub fn extra_claims(&self) -> &[(String, String)] {
        &self.extra
    }

    /// Number of claims that will appear in the plaintext.
    #[must_use]
    pub fn claim_count(&self) -> usize {
        self.pairs().len()
    }

    fn is_empty(&self) -> bool {
        self.claim_count() == 0
    }

    fn lists(&self) -> [(ClaimName, Vec<String>); 9] {
        fn strings<T: ToString>(items: &[T]) -> Vec<String> {
            items.iter().map(ToString::to_string).collect()
        }
        [
            (ClaimName::CountryAllow, strings(&self.country_allow)),
            (ClaimName::CountryDeny, strings(&self.country_deny)),
            (ClaimName::HostAllow, self.host_allow.clone()),
            (ClaimName::HostDeny, self.host_deny.clone()),
            (ClaimName::ProtoAllow, strings(&self.proto_allow)),
            (ClaimName::ProtoDeny, strings(&self.proto_deny)),
            (ClaimName::RefAllow, self.ref_allow.clone()),
            (ClaimName::RefDeny, self.ref_deny.clone()),
            (ClaimName::UrlAllow, self.url_allow.clone()),
        ]
    }

    fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(expire) = self.expire {
            pairs.push((ClaimName::Expire.to_string(), expire.to_string()));
        }
        if let Some(ip) = self.client_ip {
            pairs.push((ClaimName::ClientIp.to_string(), ip.to_string()));
        }
        for (claim, items) in self.lists() {
            if !items.is_empty() {
                pairs.push((claim.to_string(), items.join(&LIST_SEPARATOR.to_string())));
            }
        }
        pairs.extend(self.extra.iter().cloned());
        pairs
    }

    /// Validate one list item and append it unless already present.
    fn push_list_item(&mut self, claim: ClaimName, raw: &str) -> Result<(), EcTokenError> {
        fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) {
            if !list.contains(&item) {
                list.push(item);
            }
        }

        match claim {
            ClaimName::CountryAllow => {
                push_unique(&mut self.country_allow, CountryCode::parse(claim, raw)?)
            }
            ClaimName::CountryDeny => {
                push_unique(&mut self.country_deny, CountryCode::parse(claim, raw)?)
            }
            ClaimName::HostAllow => push_unique(&mut self.host_allow, claims::validate_host(claim, raw)?),
            ClaimName::HostDeny => push_unique(&mut self.host_deny, claims::validate_host(claim, raw)?),
            ClaimName::ProtoAllow => push_unique(&mut self.proto_allow, Protocol::parse(claim, raw)?),
            ClaimName::ProtoDeny => push_unique(&mut self.proto_deny, Protocol::parse(claim, raw)?),
            ClaimName::RefAllow => {
                push_unique(&mut self.ref_allow, claims::validate_referrer(claim, raw)?)
            }
            ClaimName::RefDeny => {
                push_unique(&mut self.ref_deny, claims::validate_referrer(claim, raw)?)
            }
            ClaimName::UrlAllow => push_unique(&mut self.url_allow, claims::validate_url_path(raw)?),
            ClaimName::Expire | ClaimName::ClientIp => {
                return Err(invalid(claim, raw, "not a list claim"));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_plaintext())
    }
}

impl FromStr for Token {
    type Err = EcTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// How the expiry of a token under construction is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Validity {
    For(TimeDelta),
    Until(DateTime<Utc>),
}

/// Fluent builder for [`Token`].
///
/// Setters only record values; [`build`](Self::build) validates them all.
///
/// ```ignore
/// let token = Token::valid_for(TimeDelta::days(365))
///     .allow_country("DE")
///     .allow_url("/assets")
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct TokenBuilder {
    validity: Option<Validity>,
    client_ip: Option<String>,
    lists: Vec<(ClaimName, String)>,
}

impl TokenBuilder {
    /// Expire `validity` after the token is built. Replaces any earlier expiry.
    #[must_use]
    pub fn valid_for(mut self, validity: TimeDelta) -> Self {
        self.validity = Some(Validity::For(validity));
        self
    }

    /// Expire at an absolute time. Replaces any earlier expiry.
    #[must_use]
    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.validity = Some(Validity::Until(at));
        self
    }

    /// Restrict the token to a single client IP address.
    #[must_use]
    pub fn client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = Some(ip.into());
        self
    }

    #[must_use]
    pub fn allow_country(self, code: impl Into<String>) -> Self {
        self.item(ClaimName::CountryAllow, code)
    }

    #[must_use]
    pub fn deny_country(self, code: impl Into<String>) -> Self {
        self.item(ClaimName::CountryDeny, code)
    }

    #[must_use]
    pub fn allow_host(self, host: impl Into<String>) -> Self {
        self.item(ClaimName::HostAllow, host)
    }

    #[must_use]
    pub fn deny_host(self, host: impl Into<String>) -> Self {
        self.item(ClaimName::HostDeny, host)
    }

    #[must_use]
    pub fn allow_protocol(self, protocol: impl Into<String>) -> Self {
        self.item(ClaimName::ProtoAllow, protocol)
    }

    #[must_use]
    pub fn deny_protocol(self, protocol: impl Into<String>) -> Self {
        self.item(ClaimName::ProtoDeny, protocol)
    }

    #[must_use]
    pub fn allow_referrer(self, referrer: impl Into<String>) -> Self {
        self.item(ClaimName::RefAllow, referrer)
    }

    #[must_use]
    pub fn deny_referrer(self, referrer: impl Into<String>) -> Self {
        self.item(ClaimName::RefDeny, referrer)
    }

    /// Allow requests whose path starts with `prefix`.
    #[must_use]
    pub fn allow_url(self, prefix: impl Into<String>) -> Self {
        self.item(ClaimName::UrlAllow, prefix)
    }

    fn item(mut self, claim: ClaimName, value: impl Into<String>) -> Self {
        self.lists.push((claim, value.into()));
        self
    }

    /// Validate all claims and build the token, resolving relative
    /// validity against the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if any claim is invalid, the validity is not
    /// positive, no claim is set, or the plaintext would be too long.
    pub fn build(self) -> Result<Token, EcTokenError> {
        self.build_at(Utc::now())
    }

    /// Like [`build`](Self::build), with an explicit current time.
    pub fn build_at(self, now: DateTime<Utc>) -> Result<Token, EcTokenError> {
        let mut token = Token {
            expire: self.validity.map(|v| resolve_expiry(v, now)).transpose()?,
            client_ip: self.client_ip.as_deref().map(parse_client_ip).transpose()?,
            ..Token::default()
        };

        if token.is_expired_at(now) {
            warn!(expire = token.expire, "building a token that is already expired");
        }

        for (claim, value) in &self.lists {
            token.push_list_item(*claim, value)?;
        }

        if token.is_empty() {
            return Err(EcTokenError::EmptyToken);
        }
        check_plaintext_len(&token.to_plaintext())?;

        debug!(claims = token.claim_count(), "built token");
        Ok(token)
    }
}

fn resolve_expiry(validity: Validity, now: DateTime<Utc>) -> Result<i64, EcTokenError> {
    let at = match validity {
        Validity::For(delta) => {
            if delta <= TimeDelta::zero() {
                return Err(invalid(
                    ClaimName::Expire,
                    &delta.to_string(),
                    "validity must be positive",
                ));
            }
            now.checked_add_signed(delta).ok_or_else(|| {
                invalid(ClaimName::Expire, &delta.to_string(), "validity is out of range")
            })?
        }
        Validity::Until(at) => at,
    };

    let secs = at.timestamp();
    if secs < 0 {
        return Err(invalid(
            ClaimName::Expire,
            &secs.to_string(),
            "expiry must not precede the Unix epoch",
        ));
    }
    Ok(secs)
}

fn parse_expire(value: &str) -> Result<i64, EcTokenError> {
    let secs = value
        .parse::<i64>()
        .ok()
        .filter(|secs| *secs >= 0 && DateTime::from_timestamp(*secs, 0).is_some())
        .ok_or_else(|| invalid(ClaimName::Expire, value, "expected Unix seconds"))?;
    Ok(secs)
}

fn parse_client_ip(value: &str) -> Result<IpAddr, EcTokenError> {
    value
        .trim()
        .parse::<IpAddr>()
        .map_err(|_| invalid(ClaimName::ClientIp, value, "expected an IPv4 or IPv6 address"))
}

fn check_plaintext_len(plaintext: &str) -> Result<(), EcTokenError> {
    if plaintext.is_empty() {
        return Err(EcTokenError::EmptyToken);
    }
    if plaintext.len() > MAX_PLAINTEXT_LEN {
        return Err(EcTokenError::TokenTooLong {
            len: plaintext.len(),
            max: MAX_PLAINTEXT_LEN,
        });
    }
    Ok(())
}
