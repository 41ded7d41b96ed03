//! Presence registry for live chat delivery.
//!
//! Maps a user id to the one live connection currently registered for it.
//! Delivery is best effort: a missing, closed or backed-up connection is
//! reported to the caller but is never an error.

use std::collections::HashMap;

use rpc_protocol::DeliveryPayload;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Capacity of each connection's outbound queue.
const OUTBOUND_CAPACITY: usize = 64;

/// Lifecycle of a live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Upgraded but not yet registered.
    Connecting,
    /// Registered and receiving deliveries.
    Open,
    /// Closed by either side.
    Closed,
}

/// A live connection as seen by the socket task that owns it.
#[derive(Debug)]
pub struct LiveSession {
    /// Unique per connection, distinguishes reconnects of the same user.
    pub connection_id: Uuid,
    /// The authenticated user.
    pub user_id: Uuid,
    state: ConnectionState,
    sender: mpsc::Sender<String>,
}

impl LiveSession {
    /// Returns the current state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }
}

/// Registry entry.
#[derive(Debug)]
struct LiveConnection {
    connection_id: Uuid,
    sender: mpsc::Sender<String>,
}

/// What happened to a delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Queued on the receiver's connection.
    Delivered,
    /// The receiver has no registered connection.
    NotConnected,
    /// The registered connection is no longer open.
    Closed,
    /// The connection's outbound queue is full.
    Dropped,
}

/// Registry of live connections keyed by user id.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    connections: RwLock<HashMap<Uuid, LiveConnection>>,
}

impl PresenceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a connection for `user_id`. Returns the session and the
    /// receiving end of its outbound queue.
    pub fn connect(&self, user_id: Uuid) -> (LiveSession, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(OUTBOUND_CAPACITY);
        let session = LiveSession {
            connection_id: Uuid::new_v4(),
            user_id,
            state: ConnectionState::Connecting,
            sender,
        };
        (session, receiver)
    }

    /// Registers the session as the user's live connection, replacing any
    /// previous entry. The previous socket is left running.
    pub async fn open(&self, session: &mut LiveSession) {
        let mut connections = self.connections.write().await;
        let previous = connections.insert(
            session.user_id,
            LiveConnection {
                connection_id: session.connection_id,
                sender: session.sender.clone(),
            },
        );
        session.state = ConnectionState::Open;

        tracing::debug!(
            user_id = %session.user_id,
            connection_id = %session.connection_id,
            replaced = previous.is_some(),
            "Live connection opened"
        );
    }

    /// Marks the session closed and removes its entry, unless a newer
    /// connection of the same user has replaced it.
    pub async fn close(&self, session: &mut LiveSession) {
        let mut connections = self.connections.write().await;
        let owned = connections
            .get(&session.user_id)
            .is_some_and(|c| c.connection_id == session.connection_id);
        if owned {
            connections.remove(&session.user_id);
        }
        session.state = ConnectionState::Closed;

        tracing::debug!(
            user_id = %session.user_id,
            connection_id = %session.connection_id,
            removed = owned,
            "Live connection closed"
        );
    }

    /// Pushes a payload to the user's live connection, if it is open.
    pub async fn deliver(&self, user_id: Uuid, payload: &DeliveryPayload) -> Delivery {
        let connections = self.connections.read().await;
        let Some(connection) = connections.get(&user_id) else {
            return Delivery::NotConnected;
        };
        if connection.sender.is_closed() {
            return Delivery::Closed;
        }

        let text = match serde_json::to_string(payload) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to encode delivery");
                return Delivery::Dropped;
            }
        };

        match connection.sender.try_send(text) {
            Ok(()) => Delivery::Delivered,
            Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Closed,
            Err(mpsc::error::TrySendError::Full(_)) => Delivery::Dropped,
        }
    }

    /// Returns true if the user has a registered connection that is still
    /// open.
    pub async fn is_online(&self, user_id: Uuid) -> bool {
        let connections = self.connections.read().await;
        connections
            .get(&user_id)
            .is_some_and(|c| !c.sender.is_closed())
    }

    /// Number of registered entries, including stale ones.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Returns true if nothing is registered.
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}
