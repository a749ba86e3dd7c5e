use std::sync::Arc;

use crate::config::session::SessionMemoryStore;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn Store>,
    sessions: SessionMemoryStore,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            sessions: SessionMemoryStore::default(),
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn sessions(&self) -> &SessionMemoryStore {
        &self.sessions
    }
}
