//! Core business logic for token operations.
//!
//! This module contains the domain logic separated from CLI concerns.
//! All types and functions here are testable without the CLI layer.

pub mod cipher;
pub mod claims;
pub mod input;
pub mod key;
pub mod time_expr;
pub mod token;
