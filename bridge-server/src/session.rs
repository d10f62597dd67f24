//! In-memory session storage

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    storage::SessionStore,
    time::{Clock, SystemClock},
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

struct SessionEntry {
    values: HashMap<String, String>,
    expires_at: DateTime<Utc>,
}

/// Process-local [`SessionStore`].
///
/// Every write pushes the session's expiry `ttl` into the future; reads never
/// extend it. Expired sessions read as empty and are removed by
/// [`prune_expired`](Self::prune_expired) or on the next access.
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36_500)),
            clock,
        }
    }

    /// Drop every expired session, returning how many were removed.
    pub async fn prune_expired(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.expires_at > now);
        let removed = before - sessions.len();

        if removed > 0 {
            debug!(removed, remaining = sessions.len(), "Pruned expired sessions");
        }

        removed
    }

    /// Number of sessions held, expired ones included.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, session_id: &str, key: &str) -> Result<Option<String>> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock().await;

        match sessions.get(session_id) {
            Some(entry) if entry.expires_at > now => Ok(entry.values.get(key).cloned()),
            Some(_) => {
                sessions.remove(session_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, session_id: &str, key: &str, value: &str) -> Result<()> {
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut sessions = self.sessions.lock().await;
        let entry = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionEntry {
                values: HashMap::new(),
                expires_at,
            });

        if entry.expires_at <= now {
            entry.values.clear();
        }

        entry.values.insert(key.to_string(), value.to_string());
        entry.expires_at = expires_at;

        Ok(())
    }
}
