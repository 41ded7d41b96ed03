//! Login and password management.

use entities::User;
use tokio::sync::OnceCell;

use crate::{
    check_password_policy, AuthError, AuthResult, Claims, JwtConfig, JwtManager, PasswordHasher,
};

/// Password checked against when the login name is unknown.
const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-users";

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    /// Signed session token.
    pub token: String,
    /// The authenticated user.
    pub user: User,
}

/// Hashes passwords at sign-up, checks them at login and issues session
/// tokens.
#[derive(Debug)]
pub struct CredentialService {
    hasher: PasswordHasher,
    jwt: JwtManager,
    dummy_hash: OnceCell<String>,
}

impl CredentialService {
    /// Creates a credential service signing tokens with the given config.
    pub fn new(config: JwtConfig) -> AuthResult<Self> {
        Ok(Self {
            hasher: PasswordHasher::new()?,
            jwt: JwtManager::new(config)?,
            dummy_hash: OnceCell::new(),
        })
    }

    /// Applies the password policy and hashes the password.
    pub async fn hash_password(&self, password: &str) -> AuthResult<String> {
        check_password_policy(password)?;
        self.hasher.hash(password).await
    }

    /// Checks `password` against the user found by name and issues a token.
    ///
    /// `user` is `None` when no user has the given name. In that case a
    /// verification still runs against a fixed hash so both failure paths
    /// take comparable time, and both yield [`AuthError::InvalidCredentials`].
    pub async fn login(&self, user: Option<User>, password: &str) -> AuthResult<Session> {
        let Some(user) = user else {
            let dummy = self.dummy_hash().await?;
            let _ = self.hasher.verify(password, dummy).await?;
            tracing::warn!("Login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.password_hash).await? {
            tracing::warn!(user_id = %user.id, "Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.jwt.generate_token(user.id, user.role.kind())?;
        tracing::info!(user_id = %user.id, role = %user.role.kind(), "User logged in");

        Ok(Session { token, user })
    }

    /// Validates a session token.
    pub fn validate_token(&self, token: &str) -> AuthResult<Claims> {
        self.jwt.validate_token(token)
    }

    async fn dummy_hash(&self) -> AuthResult<&String> {
        self.dummy_hash
            .get_or_try_init(|| self.hasher.hash(DUMMY_PASSWORD))
            .await
    }
}
