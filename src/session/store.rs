use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::Session;
use crate::errors::{AppError, AppResult};
use crate::models::LearningSettings;

/// Live sessions keyed by id. Each session has its own lock, so one session's
/// events run strictly one after another while other sessions proceed.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, settings: LearningSettings) -> Arc<Mutex<Session>> {
        let session = Session::new(settings);
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, handle.clone());
        info!("Session {} started", id);
        handle
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Arc<Mutex<Session>>> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(AppError::SessionNotFound(id))
    }

    pub async fn remove(&self, id: Uuid) -> AppResult<()> {
        match self.sessions.write().await.remove(&id) {
            Some(_) => {
                info!("Session {} ended", id);
                Ok(())
            }
            None => Err(AppError::SessionNotFound(id)),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drops sessions idle for longer than `ttl`. Busy sessions are skipped.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, handle| match handle.try_lock() {
            Ok(session) if session.idle_for() > ttl => {
                debug!(
                    "Session {} (started {}) expired after {:?}",
                    id,
                    session.created_at().format("%H:%M:%S"),
                    session.idle_for()
                );
                false
            }
            _ => true,
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {} idle session(s)", evicted);
        }
        evicted
    }
}
