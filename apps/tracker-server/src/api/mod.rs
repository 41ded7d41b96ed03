//! API endpoints.

pub mod auth;
pub mod convert;
pub mod messages;
pub mod projects;
pub mod rpc;
pub mod stats;
pub mod tasks;
pub mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use entity_store::EntityStore;

use crate::{state::AppState, websocket};

/// Creates the API router with all endpoints.
pub fn create_router<S: EntityStore + 'static>() -> Router<Arc<AppState<S>>> {
    Router::new()
        // Queries and mutations
        .route("/rpc", post(rpc::handle_rpc::<S>))
        // Live chat delivery
        .route("/ws", get(websocket::handle_websocket::<S>))
        // Health check
        .route("/health", get(health_check))
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
