//! Domain error types for ectoken.
//!
//! All business-logic errors are defined here using `thiserror`.
//! These errors are converted to user-friendly messages at the CLI boundary.
//! No variant carries key material or decrypted plaintext.

use thiserror::Error;

/// Errors that can occur while building, encrypting, or decrypting tokens.
#[derive(Debug, Error)]
pub enum EcTokenError {
    /// No token was provided via any input method.
    #[error("no token provided: pass a token as an argument, via --token-env, or through stdin")]
    NoTokenProvided,

    /// No key was provided via any input method.
    #[error("no key provided: pass --key, --key-env, or set ECTOKEN_KEY")]
    NoKeyProvided,

    /// The key string is empty or only whitespace.
    #[error("invalid key: key must not be empty")]
    EmptyKey,

    /// The specified environment variable is not set.
    #[error("environment variable '{name}' is not set")]
    EnvVarNotFound {
        /// Name of the missing environment variable.
        name: String,
    },

    /// The environment variable name cannot be looked up.
    #[error("invalid environment variable name '{name}'")]
    InvalidEnvVarName {
        /// The rejected name.
        name: String,
    },

    /// Reading the token from stdin failed.
    #[error("failed to read token from stdin: {reason}")]
    StdinReadError {
        /// Description of the read failure.
        reason: String,
    },

    /// Stdin held more data than any token can occupy.
    #[error("input too large: stdin exceeds {max} bytes")]
    InputTooLarge {
        /// Maximum accepted input size in bytes.
        max: u64,
    },

    /// The encrypted token is not valid base64url.
    #[error("failed to decode token: invalid base64url encoding")]
    Base64DecodeError,

    /// The decoded token is too short to hold an IV and tag.
    #[error("token too short: expected at least {min} bytes, got {len}")]
    TokenTooShort {
        /// Decoded length.
        len: usize,
        /// Minimum acceptable length.
        min: usize,
    },

    /// Authentication failed: wrong key or tampered token.
    #[error("decryption failed: wrong key or corrupted token")]
    DecryptionFailed,

    /// The cipher rejected the input.
    #[error("encryption failed")]
    EncryptionFailed,

    /// The decrypted bytes are not UTF-8.
    #[error("decrypted token is not valid UTF-8")]
    InvalidUtf8,

    /// The token has no claims at all.
    #[error("token is empty: add at least one claim")]
    EmptyToken,

    /// The token plaintext exceeds the supported size.
    #[error("token too long: {len} bytes exceeds the {max} byte limit")]
    TokenTooLong {
        /// Plaintext length.
        len: usize,
        /// Maximum plaintext length.
        max: usize,
    },

    /// A `name=value` segment could not be parsed.
    #[error("malformed claim segment '{segment}': expected 'name=value'")]
    MalformedClaim {
        /// The offending segment.
        segment: String,
    },

    /// A recognized claim appeared more than once.
    #[error("duplicate claim '{name}'")]
    DuplicateClaim {
        /// Claim name, e.g. `ec_expire`.
        name: String,
    },

    /// A claim value failed validation.
    #[error("invalid value '{value}' for {claim}: {reason}")]
    InvalidClaimValue {
        /// Claim name, e.g. `ec_country_allow`.
        claim: String,
        /// The rejected value.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// Failed to parse a duration expression.
    #[error("invalid duration '{expression}': {reason}")]
    InvalidDuration {
        /// The duration expression that failed to parse.
        expression: String,
        /// Description of the parsing failure.
        reason: String,
    },

    /// Failed to parse a time expression.
    #[error("invalid time expression '{expression}': {reason}")]
    InvalidTimeExpression {
        /// The time expression that failed to parse.
        expression: String,
        /// Description of the parsing failure.
        reason: String,
    },

    /// A decrypted token differs from the one that was encrypted.
    #[error("round trip mismatch: decrypted token differs from the original")]
    RoundTripMismatch,
}
