//! Per-browser sessions
//!
//! Each session owns its own [`HistoryStore`]. A session sits behind an async
//! mutex that is held for a whole interaction, so two submissions from the
//! same session run one after the other.
//!
//! Sessions idle for longer than the store's TTL are treated as unknown and
//! removed by [`SessionStore::cleanup_expired`].

use crate::history::HistoryStore;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

/// Idle time after which a session is dropped
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

/// State owned by one browser session
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub history: HistoryStore,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            history: HistoryStore::new(),
            created_at: now,
            last_active: now,
        }
    }

    /// Mark the session as used
    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    /// Whether the session has been idle for longer than `ttl`
    pub fn is_expired(&self, ttl: Duration) -> bool {
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        Utc::now() - self.last_active > ttl
    }
}

/// Shared handle to one session
pub type SessionHandle = Arc<Mutex<Session>>;

/// In-memory session table, cleared on restart
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionHandle>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    /// Create an empty store with the default TTL
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store whose sessions expire after `ttl` of inactivity
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Idle time after which a session expires
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // A session that is locked is serving a request, so it is live
    fn is_live(&self, session: &SessionHandle) -> bool {
        match session.try_lock() {
            Ok(session) => !session.is_expired(self.ttl),
            Err(_) => true,
        }
    }

    /// Look up a live session by id
    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .filter(|session| self.is_live(session))
            .cloned()
    }

    /// Return the session for `id`, or start a new one
    ///
    /// Unknown and expired ids are not adopted; a fresh id is issued instead.
    pub fn get_or_create(&self, id: Option<&str>) -> (String, SessionHandle) {
        if let Some(id) = id {
            if let Some(session) = self.get(id) {
                return (id.to_string(), session);
            }
            self.remove(id);
        }

        let id = Uuid::new_v4().to_string();
        let session = Arc::new(Mutex::new(Session::new(id.clone())));
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), session.clone());
        debug!(session_id = %id, "Session created");
        (id, session)
    }

    fn remove(&self, id: &str) {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        if removed.is_some() {
            debug!(session_id = %id, "Expired session removed");
        }
    }

    /// Drop every expired session, returning how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let initial_count = sessions.len();
        sessions.retain(|_, session| self.is_live(session));
        initial_count - sessions.len()
    }

    /// Run [`cleanup_expired`](Self::cleanup_expired) every `period`
    ///
    /// `period` must be non-zero.
    pub fn spawn_cleanup(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let removed = store.cleanup_expired();
                if removed > 0 {
                    debug!(removed, remaining = store.len(), "Session sweep");
                }
            }
        })
    }

    /// Number of stored sessions
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no session exists
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
