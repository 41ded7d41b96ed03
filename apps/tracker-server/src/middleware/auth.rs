//! Authentication middleware.

use std::sync::Arc;

use auth::Claims;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use entities::RoleKind;
use entity_store::EntityStore;
use uuid::Uuid;

use crate::{error::ServerError, state::AppState};

/// Caller identity taken from a valid session token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// User ID.
    pub id: Uuid,
    /// Role at the time the token was issued.
    pub role: RoleKind,
}

impl TryFrom<Claims> for AuthenticatedUser {
    type Error = auth::AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: claims.user_id()?,
            role: claims.role,
        })
    }
}

/// Extracts the bearer token from the Authorization header.
pub fn extract_token(value: &str) -> Option<&str> {
    value.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
}

/// Optional authentication middleware.
///
/// Requests without an Authorization header pass through anonymously. A
/// header that is present but carries a bad or expired token is rejected
/// with 401. Valid tokens put an [`AuthenticatedUser`] into the request
/// extensions.
pub async fn optional_auth_middleware<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(header) = request.headers().get(AUTHORIZATION) else {
        return next.run(request).await;
    };

    let token = match header.to_str().ok().and_then(extract_token) {
        Some(token) => token,
        None => return ServerError::Auth(auth::AuthError::InvalidToken).into_response(),
    };

    let user = match state
        .credentials
        .validate_token(token)
        .and_then(AuthenticatedUser::try_from)
    {
        Ok(user) => user,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            return ServerError::Auth(e).into_response();
        }
    };

    request.extensions_mut().insert(user);
    next.run(request).await
}
