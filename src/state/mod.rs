mod intent;
mod session;
mod store;

pub use session::Session;
pub use store::RoomStore;

use crate::config::GameConfig;
use crate::deck::WordCatalogue;
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state.
///
/// Locks are always taken rooms first, then sessions.
#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RwLock<RoomStore>>,
    /// Open connections and the room each one is bound to
    pub sessions: Arc<RwLock<HashMap<ConnectionId, Session>>>,
    pub catalogue: WordCatalogue,
    pub config: GameConfig,
}

impl AppState {
    pub fn new(config: GameConfig, catalogue: WordCatalogue) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(RoomStore::default())),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            catalogue,
            config,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(GameConfig::default(), WordCatalogue::builtin())
    }
}
