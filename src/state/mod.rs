pub mod presence;
pub mod room;
pub mod room_locks;
pub mod state_machine;

use std::sync::Arc;

use crate::{
    auth::{IdentityResolver, TokenDirectory},
    config::AppConfig,
    dao::room_store::{RoomStore, memory::MemoryRoomStore},
};

use self::{presence::PresenceTracker, room_locks::RoomLocks};

/// Handle shared by every handler, service and the reaper task.
pub type SharedState = Arc<AppState>;

/// Central application state: collaborators, per-room guards and presence.
pub struct AppState {
    store: Arc<dyn RoomStore>,
    identities: Arc<dyn IdentityResolver>,
    locks: RoomLocks,
    presence: PresenceTracker,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        store: Arc<dyn RoomStore>,
        identities: Arc<dyn IdentityResolver>,
        config: AppConfig,
    ) -> SharedState {
        Arc::new(Self {
            store,
            identities,
            locks: RoomLocks::new(),
            presence: PresenceTracker::new(),
            config,
        })
    }

    /// State backed by the in-memory store and the configured token table.
    pub fn in_memory(config: AppConfig) -> SharedState {
        let identities = TokenDirectory::from_pairs(config.identities().clone());
        Self::new(
            Arc::new(MemoryRoomStore::new()),
            Arc::new(identities),
            config,
        )
    }

    /// Persistence collaborator.
    pub fn store(&self) -> &Arc<dyn RoomStore> {
        &self.store
    }

    /// Identity collaborator.
    pub fn identities(&self) -> &Arc<dyn IdentityResolver> {
        &self.identities
    }

    /// Per-room mutual exclusion.
    pub fn locks(&self) -> &RoomLocks {
        &self.locks
    }

    /// Last-seen registry feeding the reaper.
    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
