//! Academic Task Tracker Server
//!
//! Serves the tracker's queries and mutations as JSON-RPC methods on `/rpc`
//! and pushes new chat messages to connected receivers over `/ws`.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
pub mod websocket;

use std::sync::Arc;

use auth::{AuthResult, CredentialService, JwtConfig};
use axum::Router;
use entity_store::EntityStore;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::auth::optional_auth_middleware;
use crate::state::{AppState, create_shared_state};

/// Creates the application router with all routes configured.
pub fn create_app<S: EntityStore + 'static>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api::create_router::<S>()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware::<S>,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Creates the application state with the given configuration and store.
pub fn create_state<S: EntityStore>(config: Config, store: S) -> AuthResult<Arc<AppState<S>>> {
    let jwt_config =
        JwtConfig::new(config.jwt_secret.clone()).with_expiration_hours(config.jwt_expiration_hours);
    let credentials = CredentialService::new(jwt_config)?;

    Ok(create_shared_state(config, store, credentials))
}

/// Initializes tracing with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
