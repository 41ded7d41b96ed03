//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login failed. Deliberately does not say whether the name or the
    /// password was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// JWT validation failed.
    #[error("JWT validation failed: {0}")]
    JwtValidation(String),

    /// JWT encoding failed.
    #[error("JWT encoding failed: {0}")]
    JwtEncoding(String),

    /// Token expired.
    #[error("Token expired")]
    TokenExpired,

    /// Invalid token.
    #[error("Invalid token")]
    InvalidToken,

    /// Missing authentication token.
    #[error("Missing authentication token")]
    MissingToken,

    /// Password does not meet the length policy.
    #[error("Password must be at least {min_length} characters")]
    WeakPassword { min_length: usize },

    /// Hashing or parsing a password hash failed.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl AuthError {
    /// Returns true for errors caused by a bad or missing bearer token.
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            Self::TokenExpired | Self::InvalidToken | Self::MissingToken | Self::JwtValidation(_)
        )
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidToken => AuthError::InvalidToken,
            _ => AuthError::JwtValidation(e.to_string()),
        }
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(e: argon2::password_hash::Error) -> Self {
        AuthError::PasswordHash(e.to_string())
    }
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
