//! Server error types.

use auth::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use entity_store::StoreError;
use rpc_protocol::{ErrorCode, JsonRpcError};
use serde_json::json;

use crate::services::integrity::ValidationError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Missing or malformed input.
    #[error("{0}")]
    BadRequest(String),

    /// Single-entity lookup miss.
    #[error("{0}")]
    NotFound(String),

    /// A token is required for this call.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Integrity check failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Authentication error.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Returns the protocol error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ServerError::BadRequest(_) => ErrorCode::BadRequest,
            ServerError::NotFound(_) => ErrorCode::NotFound,
            ServerError::AuthenticationRequired => ErrorCode::AuthenticationError,
            ServerError::Validation(e) => match e {
                ValidationError::BadRequest(_) => ErrorCode::BadRequest,
                ValidationError::ReferenceNotFound { .. } => ErrorCode::ReferenceNotFound,
                ValidationError::RoleMismatch(_) => ErrorCode::RoleMismatch,
                ValidationError::DuplicateName(_) => ErrorCode::DuplicateName,
                ValidationError::DuplicateUniversityId(_) => ErrorCode::DuplicateUniversityId,
                ValidationError::DateRangeInvalid => ErrorCode::DateRangeInvalid,
                ValidationError::Store(e) => store_code(e),
            },
            ServerError::Store(e) => store_code(e),
            ServerError::Auth(e) => match e {
                AuthError::WeakPassword { .. } => ErrorCode::BadRequest,
                AuthError::InvalidCredentials => ErrorCode::AuthenticationError,
                e if e.is_token_error() => ErrorCode::AuthenticationError,
                _ => ErrorCode::InternalError,
            },
            ServerError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Returns the HTTP status used when this error ends a plain HTTP request.
    pub fn status(&self) -> StatusCode {
        match self.code() {
            ErrorCode::AuthenticationError => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

fn store_code(error: &StoreError) -> ErrorCode {
    if error.is_timeout() {
        ErrorCode::Timeout
    } else {
        ErrorCode::InternalError
    }
}

impl From<ServerError> for JsonRpcError {
    fn from(error: ServerError) -> Self {
        let code = error.code();
        if code == ErrorCode::InternalError {
            tracing::error!(error = %error, "Request failed");
        }
        JsonRpcError::new(code, error.to_string())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = JsonRpcError::from(self);

        let body = json!({
            "error": {
                "code": error.code,
                "message": error.message,
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_taxonomy_codes() {
        let cases = [
            (ServerError::bad_request("x"), ErrorCode::BadRequest),
            (ServerError::not_found("x"), ErrorCode::NotFound),
            (ValidationError::DateRangeInvalid.into(), ErrorCode::DateRangeInvalid),
            (ValidationError::DuplicateName("a".into()).into(), ErrorCode::DuplicateName),
            (ValidationError::DuplicateUniversityId(1).into(), ErrorCode::DuplicateUniversityId),
            (ValidationError::RoleMismatch("x".into()).into(), ErrorCode::RoleMismatch),
            (AuthError::InvalidCredentials.into(), ErrorCode::AuthenticationError),
            (AuthError::WeakPassword { min_length: 6 }.into(), ErrorCode::BadRequest),
            (
                StoreError::timeout("get_user", Duration::from_millis(5)).into(),
                ErrorCode::Timeout,
            ),
            (StoreError::Other("disk".into()).into(), ErrorCode::InternalError),
        ];

        for (error, expected) in cases {
            assert_eq!(error.code(), expected, "{error}");
        }
    }

    #[test]
    fn test_invalid_credentials_message() {
        let error: JsonRpcError = ServerError::from(AuthError::InvalidCredentials).into();
        assert_eq!(error.message, "Invalid credentials");
        assert_eq!(error.error_code(), ErrorCode::AuthenticationError);
    }
}
