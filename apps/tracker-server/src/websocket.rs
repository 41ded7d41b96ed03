//! WebSocket endpoint for live chat delivery.
//!
//! A client connects with `GET /ws?token=<jwt>`. The token is checked before
//! the upgrade; once upgraded the connection is registered as the user's
//! live connection and receives a `{sender, message}` frame for every chat
//! message sent to that user.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::{IntoResponse, Response},
};
use entity_store::EntityStore;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{error::ServerError, middleware::auth::AuthenticatedUser, state::AppState};

/// Query parameters of the upgrade request.
#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    /// Session token issued by `login`.
    #[serde(default)]
    pub token: Option<String>,
}

/// Handle WebSocket upgrade
pub async fn handle_websocket<S: EntityStore + 'static>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<WsParams>,
) -> Response {
    let Some(token) = params.token.filter(|t| !t.is_empty()) else {
        return ServerError::Auth(auth::AuthError::MissingToken).into_response();
    };

    let user = match state
        .credentials
        .validate_token(&token)
        .and_then(AuthenticatedUser::try_from)
    {
        Ok(user) => user,
        Err(e) => {
            warn!(error = %e, "Refused live connection");
            return ServerError::Auth(e).into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, user.id))
}

/// Handle WebSocket connection
async fn handle_socket<S: EntityStore>(socket: WebSocket, state: Arc<AppState<S>>, user_id: Uuid) {
    let (mut sender, mut receiver) = socket.split();

    let (mut session, mut outbound) = state.presence.connect(user_id);
    state.presence.open(&mut session).await;
    info!(user_id = %user_id, "Live connection established");

    // Task to forward deliveries to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(text) = outbound.recv().await {
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // Inbound frames carry nothing but keepalives and the close handshake.
    loop {
        match receiver.next().await {
            Some(Ok(Message::Close(_))) | None => break,
            Some(Ok(Message::Text(text))) => {
                debug!(user_id = %user_id, len = text.len(), "Ignoring inbound text frame");
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                warn!(user_id = %user_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    state.presence.close(&mut session).await;
    send_task.abort();
    info!(user_id = %user_id, "Live connection closed");
}
