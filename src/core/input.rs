//! Resolution of tokens and keys from CLI arguments, environment
//! variables, and stdin.
//!
//! Precedence for tokens: positional argument, then `--token-env`, then
//! stdin. Precedence for keys: `--key`, then `--key-env`, then the
//! [`DEFAULT_KEY_ENV`] variable. Keys are never read from stdin so that a
//! token can be piped in.

use std::io::{self, IsTerminal, Read};

use tracing::debug;
use zeroize::Zeroizing;

use crate::error::EcTokenError;

/// Environment variable consulted when no key option is given.
pub const DEFAULT_KEY_ENV: &str = "ECTOKEN_KEY";

/// Upper bound on stdin input, well above any valid encrypted token.
const STDIN_MAX_BYTES: u64 = 64 * 1024;

/// Resolve the token to operate on.
///
/// # Errors
///
/// Returns an error if the named environment variable is invalid or
/// unset, stdin cannot be read, or no non-empty token is found.
pub fn resolve_token(
    arg: Option<&str>,
    env_name: Option<&str>,
) -> Result<Zeroizing<String>, EcTokenError> {
    if let Some(token) = arg.map(str::trim).filter(|t| !t.is_empty()) {
        debug!("token taken from argument");
        return Ok(Zeroizing::new(token.to_string()));
    }

    if let Some(name) = env_name {
        let value = read_env(name)?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(EcTokenError::NoTokenProvided);
        }
        debug!(env = name, "token taken from environment");
        return Ok(Zeroizing::new(trimmed.to_string()));
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Err(EcTokenError::NoTokenProvided);
    }

    let buffer = read_limited(stdin.lock(), STDIN_MAX_BYTES)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Err(EcTokenError::NoTokenProvided);
    }
    debug!("token taken from stdin");
    Ok(Zeroizing::new(trimmed.to_string()))
}

/// Resolve the key string.
///
/// # Errors
///
/// Returns an error if `--key-env` names an invalid or unset variable,
/// or if no key is found at all.
pub fn resolve_key(
    arg: Option<&Zeroizing<String>>,
    env_name: Option<&str>,
) -> Result<Zeroizing<String>, EcTokenError> {
    if let Some(key) = arg {
        debug!("key taken from argument");
        return Ok(key.clone());
    }

    if let Some(name) = env_name {
        debug!(env = name, "key taken from environment");
        return read_env(name);
    }

    match std::env::var(DEFAULT_KEY_ENV) {
        Ok(value) => {
            debug!(env = DEFAULT_KEY_ENV, "key taken from default environment variable");
            Ok(Zeroizing::new(value))
        }
        Err(_) => Err(EcTokenError::NoKeyProvided),
    }
}

/// Read at most `max` bytes. One extra byte is requested so that
/// oversized input is reported instead of silently truncated.
fn read_limited(reader: impl Read, max: u64) -> Result<Zeroizing<String>, EcTokenError> {
    let mut buffer = Zeroizing::new(String::new());
    reader
        .take(max + 1)
        .read_to_string(&mut buffer)
        .map_err(|e| EcTokenError::StdinReadError {
            reason: e.kind().to_string(),
        })?;

    if buffer.len() as u64 > max {
        return Err(EcTokenError::InputTooLarge { max });
    }
    Ok(buffer)
}

/// Read an environment variable after validating its name.
fn read_env(name: &str) -> Result<Zeroizing<String>, EcTokenError> {
    validate_env_name(name)?;
    std::env::var(name)
        .map(Zeroizing::new)
        .map_err(|_| EcTokenError::EnvVarNotFound {
            name: name.to_string(),
        })
}

/// Reject names that `std::env::var` cannot look up.
fn validate_env_name(name: &str) -> Result<(), EcTokenError> {
    if name.is_empty() || name.contains('=') || name.contains('\0') {
        return Err(EcTokenError::InvalidEnvVarName {
            name: name.escape_debug().to_string(),
        });
    }
    Ok(())
}
