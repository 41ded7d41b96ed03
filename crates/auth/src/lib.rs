//! Credential handling for the academic task tracker.
//!
//! This crate provides:
//! - Argon2id password hashing and verification
//! - JWT session token generation and validation
//! - A credential service combining both for login

mod credentials;
mod error;
mod jwt;
mod password;

pub use credentials::*;
pub use error::*;
pub use jwt::*;
pub use password::*;

/// Default JWT expiration time in hours.
pub const DEFAULT_JWT_EXPIRATION_HOURS: u64 = 1;

/// Longest accepted JWT lifetime in hours (one year).
pub const MAX_JWT_EXPIRATION_HOURS: u64 = 24 * 365;

/// Default JWT issuer.
pub const DEFAULT_JWT_ISSUER: &str = "academic-tracker";

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;
