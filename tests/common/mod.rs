//! Shared test fixtures and helper utilities.
//!
//! Provides a known-answer encrypted token and helpers for decrypting
//! CLI output in integration tests.
#![allow(dead_code)]

use ectoken::core::key::TokenKey;
use ectoken::core::token::Token;

/// Key string used to encrypt [`KAT_TOKEN`].
pub const TEST_KEY: &str = "ectoken-test-key";

/// Plaintext of [`KAT_TOKEN`]. `ec_expire` is 2023-11-14T22:13:20Z.
pub const KAT_PLAINTEXT: &str = "ec_expire=1700000000&ec_country_allow=DE&ec_url_allow=/assets";

/// [`KAT_PLAINTEXT`] encrypted under [`TEST_KEY`] with IV `00 01 .. 0b`.
pub const KAT_TOKEN: &str = "AAECAwQFBgcICQoLHJ700z4WRTMoPc7lZQIMQaiJnx9dZbxxK7gGy3l0siYpYkXeUVYBizx5IaTvMw3d_cGPQAxfsR-FbkrASx_zkoL5K0ZWE1u-ggB7aI4";

/// A key that did not encrypt [`KAT_TOKEN`].
pub const WRONG_KEY: &str = "some-other-key";

/// A string that is not base64url.
pub const INVALID_TOKEN: &str = "not a token!";

/// Derive the test key.
pub fn test_key() -> TokenKey {
    TokenKey::derive(TEST_KEY).unwrap()
}

/// Decrypt an encrypted token with the test key.
pub fn decrypt_with_test_key(encrypted: &str) -> Token {
    Token::decrypt(encrypted.trim(), &test_key()).unwrap()
}
