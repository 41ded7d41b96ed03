//! Session tokens.
//!
//! A token is an HS256 JWT naming the user and the role they held at login.
//! Tokens are accepted only when signed with the configured secret, issued
//! by the configured issuer and not yet expired.

use chrono::{DateTime, Duration, Utc};
use entities::RoleKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AuthError, AuthResult, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_JWT_ISSUER, MAX_JWT_EXPIRATION_HOURS,
};

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Role of the user when the token was issued.
    pub role: RoleKind,
    /// Issued at, seconds since the epoch.
    pub iat: i64,
    /// Expires at, seconds since the epoch.
    pub exp: i64,
    pub iss: String,
    /// Unique per token.
    pub jti: String,
}

impl Claims {
    /// Claims for `user_id` valid for `lifetime` from `issued_at`.
    ///
    /// Fails when the expiry is not representable.
    pub fn new(
        user_id: Uuid,
        role: RoleKind,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
        issuer: &str,
    ) -> AuthResult<Self> {
        let expires_at = issued_at
            .checked_add_signed(lifetime)
            .ok_or_else(|| AuthError::JwtEncoding("Token expiry is out of range".to_string()))?;

        Ok(Self {
            sub: user_id.to_string(),
            role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            iss: issuer.to_string(),
            jti: Uuid::new_v4().to_string(),
        })
    }

    /// Parses the subject back into a user id.
    pub fn user_id(&self) -> AuthResult<Uuid> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Signing settings.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC secret.
    pub secret: String,
    /// Token lifetime in hours.
    pub expiration_hours: u64,
    /// Expected `iss` claim.
    pub issuer: String,
}

impl JwtConfig {
    /// Settings with the default lifetime and issuer.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            issuer: DEFAULT_JWT_ISSUER.to_string(),
        }
    }

    pub fn with_expiration_hours(mut self, hours: u64) -> Self {
        self.expiration_hours = hours;
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    fn lifetime(&self) -> AuthResult<Duration> {
        if self.expiration_hours == 0 || self.expiration_hours > MAX_JWT_EXPIRATION_HOURS {
            return Err(AuthError::Configuration(format!(
                "Token lifetime must be between 1 and {MAX_JWT_EXPIRATION_HOURS} hours, got {}",
                self.expiration_hours
            )));
        }
        i64::try_from(self.expiration_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or_else(|| AuthError::Configuration("Token lifetime is out of range".to_string()))
    }
}

/// Issues and checks session tokens.
#[derive(Clone)]
pub struct JwtManager {
    issuer: String,
    lifetime: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("issuer", &self.issuer)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    /// Fails when the configured lifetime is out of range.
    pub fn new(config: JwtConfig) -> AuthResult<Self> {
        let lifetime = config.lifetime()?;
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Ok(Self {
            lifetime,
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer,
            validation,
        })
    }

    /// Issues a token for `user_id` acting as `role`.
    pub fn generate_token(&self, user_id: Uuid, role: RoleKind) -> AuthResult<String> {
        let claims = Claims::new(user_id, role, Utc::now(), self.lifetime, &self.issuer)?;

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::JwtEncoding(e.to_string()))
    }

    /// Checks signature, issuer and expiry and returns the claims.
    pub fn validate_token(&self, token: &str) -> AuthResult<Claims> {
        Ok(decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims)
    }

    /// How long issued tokens stay valid.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }
}
