//! JSON-RPC error types

use serde::{Deserialize, Serialize};

/// JSON-RPC error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid JSON was received
    ParseError = -32700,
    /// The JSON sent is not a valid Request object
    InvalidRequest = -32600,
    /// The method does not exist / is not available
    MethodNotFound = -32601,
    /// Invalid method parameter(s)
    InvalidParams = -32602,
    /// Internal error
    InternalError = -32603,

    // Server-defined errors (-32000 to -32099)
    /// Credentials or session token rejected
    AuthenticationError = -32001,
    /// A single-entity lookup found nothing
    NotFound = -32003,
    /// A store call did not finish in time
    Timeout = -32006,
    /// Missing or ambiguous locator, missing required field
    BadRequest = -32010,
    /// A referenced id or name does not resolve
    ReferenceNotFound = -32011,
    /// A referenced user has the wrong role for the relationship
    RoleMismatch = -32012,
    /// Another user already has this name
    DuplicateName = -32013,
    /// Another student already has this university id
    DuplicateUniversityId = -32014,
    /// End date is not after start date
    DateRangeInvalid = -32015,
}

impl ErrorCode {
    /// Returns the error kind reported to clients in the error `data`.
    ///
    /// Malformed envelopes and params are reported as `BadRequest`.
    pub fn kind(&self) -> &'static str {
        match self {
            ErrorCode::ParseError
            | ErrorCode::InvalidRequest
            | ErrorCode::InvalidParams
            | ErrorCode::BadRequest => "BadRequest",
            ErrorCode::MethodNotFound => "MethodNotFound",
            ErrorCode::InternalError => "Internal",
            ErrorCode::AuthenticationError => "AuthenticationError",
            ErrorCode::NotFound => "NotFound",
            ErrorCode::Timeout => "Timeout",
            ErrorCode::ReferenceNotFound => "ReferenceNotFound",
            ErrorCode::RoleMismatch => "RoleMismatch",
            ErrorCode::DuplicateName => "DuplicateName",
            ErrorCode::DuplicateUniversityId => "DuplicateUniversityId",
            ErrorCode::DateRangeInvalid => "DateRangeInvalid",
        }
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        match code {
            -32700 => ErrorCode::ParseError,
            -32600 => ErrorCode::InvalidRequest,
            -32601 => ErrorCode::MethodNotFound,
            -32602 => ErrorCode::InvalidParams,
            -32001 => ErrorCode::AuthenticationError,
            -32003 => ErrorCode::NotFound,
            -32006 => ErrorCode::Timeout,
            -32010 => ErrorCode::BadRequest,
            -32011 => ErrorCode::ReferenceNotFound,
            -32012 => ErrorCode::RoleMismatch,
            -32013 => ErrorCode::DuplicateName,
            -32014 => ErrorCode::DuplicateUniversityId,
            -32015 => ErrorCode::DateRangeInvalid,
            _ => ErrorCode::InternalError,
        }
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Optional additional data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcError {
    /// Creates a new error tagged with its kind
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: Some(serde_json::json!({ "kind": code.kind() })),
        }
    }

    /// Returns the typed error code
    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::from(self.code)
    }

    /// Creates a parse error
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, message)
    }

    /// Creates a method not found error
    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            ErrorCode::MethodNotFound,
            format!("Method '{}' not found", method),
        )
    }

    /// Creates an invalid params error
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams, message)
    }

    /// Creates an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcError {}
