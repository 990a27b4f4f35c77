//! ectoken: build, encrypt, and inspect Edgecast CDN access tokens.
//!
//! Tokens are query strings of claims (`ec_expire`, `ec_country_allow`,
//! `ec_url_allow`, ...) encrypted with AES-256-GCM under the SHA-256 of a
//! shared key string, and carried as unpadded base64url.
//!
//! ```ignore
//! use chrono::TimeDelta;
//! use ectoken::core::{key::TokenKey, token::Token};
//!
//! let key = TokenKey::derive("primary-key")?;
//! let token = Token::valid_for(TimeDelta::days(365))
//!     .allow_country("DE")
//!     .allow_url("/assets")
//!     .build()?;
//! let encrypted = token.encrypt(&key)?;
//! assert_eq!(Token::decrypt(&encrypted, &key)?, token);
//! ```

#![forbid(unsafe_code)]

pub mod core;
pub mod display;
pub mod error;
