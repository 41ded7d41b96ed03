//! Application state.

use std::sync::Arc;

use auth::CredentialService;
use entity_store::EntityStore;
use tokio::sync::{Mutex, MutexGuard};

use crate::config::Config;
use crate::services::integrity::IntegrityValidator;
use crate::services::presence::PresenceRegistry;

/// Shared application state.
pub struct AppState<S: EntityStore> {
    /// Server configuration.
    pub config: Config,
    /// Entity store.
    pub store: S,
    /// Password hashing and session tokens.
    pub credentials: CredentialService,
    /// Live chat connections.
    pub presence: PresenceRegistry,
    /// Serializes validated writes so a check and its write are not
    /// interleaved with another write.
    write_lock: Mutex<()>,
}

impl<S: EntityStore> AppState<S> {
    /// Creates new application state.
    pub fn new(config: Config, store: S, credentials: CredentialService) -> Self {
        Self {
            config,
            store,
            credentials,
            presence: PresenceRegistry::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns a validator reading from the store.
    pub fn validator(&self) -> IntegrityValidator<'_, S> {
        IntegrityValidator::new(&self.store)
    }

    /// Acquires the write lock. Hold it from the first check until the write
    /// has completed.
    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }
}

/// Type alias for shared state.
pub type SharedState<S> = Arc<AppState<S>>;

/// Creates shared state from config, store and credential service.
pub fn create_shared_state<S: EntityStore>(
    config: Config,
    store: S,
    credentials: CredentialService,
) -> SharedState<S> {
    Arc::new(AppState::new(config, store, credentials))
}
