//! Server configuration.

use std::{env, time::Duration};

/// Secret used when running in development mode without a configured one.
const DEV_JWT_SECRET: &str = "insecure-development-secret-do-not-use-in-production";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Secret used to sign session tokens.
    pub jwt_secret: String,
    /// Session token lifetime in hours.
    pub jwt_expiration_hours: u64,
    /// Upper bound for every store call.
    pub store_timeout: Duration,
    /// Whether RPC methods other than `login` and `createUser` need a token.
    pub require_auth: bool,
    /// Whether the insecure development secret is in use.
    pub dev_mode: bool,
    /// Log level.
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let dev_mode = env_flag("TRACKER_DEV_MODE", false);

        let jwt_secret = match env::var("TRACKER_JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if dev_mode => DEV_JWT_SECRET.to_string(),
            _ => anyhow::bail!("TRACKER_JWT_SECRET is required unless TRACKER_DEV_MODE=true"),
        };

        let config = Self {
            host: env::var("TRACKER_SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_number("TRACKER_SERVER_PORT", 4000)?,
            jwt_secret,
            jwt_expiration_hours: env_number(
                "TRACKER_JWT_EXPIRATION_HOURS",
                auth::DEFAULT_JWT_EXPIRATION_HOURS,
            )?,
            store_timeout: Duration::from_millis(env_number("TRACKER_STORE_TIMEOUT_MS", 5000)?),
            require_auth: env_flag("TRACKER_REQUIRE_AUTH", false),
            dev_mode,
            log_level: env::var("TRACKER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        };

        if config.jwt_expiration_hours == 0
            || config.jwt_expiration_hours > auth::MAX_JWT_EXPIRATION_HOURS
        {
            anyhow::bail!(
                "TRACKER_JWT_EXPIRATION_HOURS must be between 1 and {}",
                auth::MAX_JWT_EXPIRATION_HOURS
            );
        }
        if config.store_timeout.is_zero() {
            anyhow::bail!("TRACKER_STORE_TIMEOUT_MS must be positive");
        }

        Ok(config)
    }

    /// Configuration for tests and local runs.
    pub fn development() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_expiration_hours: auth::DEFAULT_JWT_EXPIRATION_HOURS,
            store_timeout: entity_store::DEFAULT_STORE_TIMEOUT,
            require_auth: false,
            dev_mode: true,
            log_level: "debug".to_string(),
        }
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parses a numeric variable, falling back to `default` when unset.
fn env_number<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {name} '{raw}': {e}")),
        Err(_) => Ok(default),
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(default)
}
