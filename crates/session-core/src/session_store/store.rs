use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::session::{derive_session_key, CallSession};
use crate::types::{CallState, CallStatistics, ErrorInfo, SessionKey, VideoStats};

/// Lifetime counters of a [`SessionStore`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub total_inserted: u64,
    pub total_deleted: u64,
    pub total_migrated: u64,
    pub replaced: u64,
}

/// Partial update applied by [`SessionStore::update`]. `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub state: Option<CallState>,
    pub room_id: Option<String>,
    pub from_name: Option<String>,
    pub to_name: Option<String>,
    pub last_error: Option<ErrorInfo>,
    pub subscription_id: Option<String>,
    pub video_stats: Option<VideoStats>,
}

/// Owns every live session, keyed by its derived [`SessionKey`].
///
/// Accessed from one task only; reads hand out clones so callers never hold
/// references into the store.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: HashMap<SessionKey, CallSession>,
    monitor_room_id: String,
    stats: StoreStats,
}

impl SessionStore {
    pub fn new(monitor_room_id: impl Into<String>) -> Self {
        Self {
            sessions: HashMap::new(),
            monitor_room_id: monitor_room_id.into(),
            stats: StoreStats::default(),
        }
    }

    pub fn monitor_room_id(&self) -> &str {
        &self.monitor_room_id
    }

    /// Key the session would be filed under right now.
    pub fn key_for(&self, session: &CallSession) -> SessionKey {
        derive_session_key(session, &self.monitor_room_id)
    }

    /// Files the session under its derived key, replacing any session already
    /// there. Returns the key and the replaced session.
    pub fn insert(&mut self, mut session: CallSession) -> (SessionKey, Option<CallSession>) {
        let key = self.key_for(&session);
        session.session_key = key.clone();
        let previous = self.sessions.insert(key.clone(), session);
        self.stats.total_inserted += 1;
        if previous.is_some() {
            self.stats.replaced += 1;
            warn!(session_key = %key, "replaced existing session");
        } else {
            debug!(session_key = %key, "inserted session");
        }
        (key, previous)
    }

    /// Deep copy of the session.
    pub fn get(&self, key: &SessionKey) -> Option<CallSession> {
        self.sessions.get(key).cloned()
    }

    pub fn contains(&self, key: &SessionKey) -> bool {
        self.sessions.contains_key(key)
    }

    pub fn with_session<R>(&self, key: &SessionKey, f: impl FnOnce(&CallSession) -> R) -> Option<R> {
        self.sessions.get(key).map(f)
    }

    /// Mutable access to one session for the duration of `f`.
    pub fn with_session_mut<R>(&mut self, key: &SessionKey, f: impl FnOnce(&mut CallSession) -> R) -> Option<R> {
        self.sessions.get_mut(key).map(f)
    }

    /// Applies a partial update, returning the updated snapshot.
    pub fn update(&mut self, key: &SessionKey, update: SessionUpdate) -> Option<CallSession> {
        let session = self.sessions.get_mut(key)?;
        if let Some(state) = update.state {
            session.state = state;
        }
        if let Some(room_id) = update.room_id {
            session.room_id = Some(room_id);
        }
        if let Some(from_name) = update.from_name {
            session.from_name = from_name;
        }
        if let Some(to_name) = update.to_name {
            session.to_name = to_name;
        }
        if let Some(error) = update.last_error {
            session.last_error = Some(error);
        }
        if let Some(subscription_id) = update.subscription_id {
            session.subscription_id = Some(subscription_id);
        }
        if let Some(stats) = update.video_stats {
            session.video_stats = stats;
        }
        Some(session.clone())
    }

    pub fn delete(&mut self, key: &SessionKey) -> Option<CallSession> {
        let removed = self.sessions.remove(key);
        if removed.is_some() {
            self.stats.total_deleted += 1;
            info!(session_key = %key, "deleted session");
        }
        removed
    }

    /// Moves a session from its provisional key to the key derived from its
    /// current shape (its room id once assigned).
    ///
    /// Missing sessions are a no-op returning `None`. Calling again after a
    /// successful migration is also a no-op, so retries are safe. A session
    /// already stored under the new key is replaced, as with [`insert`](Self::insert),
    /// and counted in [`StoreStats::replaced`].
    pub fn migrate_key(&mut self, old_key: &SessionKey) -> Option<SessionKey> {
        let session = self.sessions.get(old_key)?;
        let new_key = self.key_for(session);
        if &new_key == old_key {
            return Some(new_key);
        }

        let mut session = self.sessions.remove(old_key)?;
        session.session_key = new_key.clone();
        if self.sessions.insert(new_key.clone(), session).is_some() {
            self.stats.replaced += 1;
            warn!(session_key = %new_key, "migration replaced existing session");
        }
        self.stats.total_migrated += 1;
        info!(from = %old_key, to = %new_key, "migrated session key");
        Some(new_key)
    }

    pub fn list_by_predicate(&self, predicate: impl Fn(&CallSession) -> bool) -> Vec<CallSession> {
        self.sessions.values().filter(|s| predicate(s)).cloned().collect()
    }

    pub fn keys(&self) -> Vec<SessionKey> {
        self.sessions.keys().cloned().collect()
    }

    pub fn snapshot_all(&self) -> Vec<CallSession> {
        self.sessions.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Live sessions per call type
    pub fn statistics(&self) -> CallStatistics {
        let mut stats = CallStatistics::default();
        for session in self.sessions.values() {
            stats.record(session.call_type);
        }
        stats
    }

    pub fn is_call_exist(&self) -> bool {
        !self.sessions.is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        self.stats
    }
}
