use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tower_sessions::{
    cookie::time::{Duration, OffsetDateTime},
    cookie::SameSite,
    session::{Id, Record},
    session_store, Expiry, ExpiredDeletion, SessionManagerLayer, SessionStore,
};

use crate::config::Config;

pub const SESSION_COOKIE_NAME: &str = "festix_session";

/// Session key holding the logged-in [`SessionUser`](crate::models::SessionUser).
pub const CURRENT_USER_KEY: &str = "current_user";

/// How often [`SessionMemoryStore::prune_periodically`] drops expired records.
pub const SESSION_PRUNE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

/// Cookie sessions kept in process memory; a restart logs everyone out.
///
/// Expired records stay in the map until [`ExpiredDeletion::delete_expired`]
/// runs, so the server spawns [`SessionMemoryStore::prune_periodically`].
#[derive(Clone, Debug, Default)]
pub struct SessionMemoryStore(Arc<Mutex<HashMap<Id, Record>>>);

fn is_active(record: &Record, now: OffsetDateTime) -> bool {
    record.expiry_date > now
}

impl SessionMemoryStore {
    /// Number of records held, expired ones included.
    pub async fn len(&self) -> usize {
        self.0.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.0.lock().await.is_empty()
    }

    /// Delete expired records every `period` until the task is dropped.
    pub async fn prune_periodically(self, period: std::time::Duration) {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = self.delete_expired().await {
                tracing::error!("Failed to prune expired sessions: {}", e);
            }
        }
    }
}

#[async_trait]
impl SessionStore for SessionMemoryStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut sessions = self.0.lock().await;
        while sessions.contains_key(&record.id) {
            record.id = Id::default();
        }
        sessions.insert(record.id, record.clone());
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.0.lock().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let now = OffsetDateTime::now_utc();
        Ok(self
            .0
            .lock()
            .await
            .get(session_id)
            .filter(|record| is_active(record, now))
            .cloned())
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.0.lock().await.remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for SessionMemoryStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        let now = OffsetDateTime::now_utc();
        let mut sessions = self.0.lock().await;
        let before = sessions.len();
        sessions.retain(|_, record| is_active(record, now));

        let removed = before - sessions.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = sessions.len(), "Pruned expired sessions");
        }
        Ok(())
    }
}

pub fn create_session_layer(
    config: &Config,
    store: SessionMemoryStore,
) -> SessionManagerLayer<SessionMemoryStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            config.session_expiry_seconds,
        )))
        .with_secure(config.session_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
