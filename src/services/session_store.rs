use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::services::clock::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub account_id: i32,
    pub expires_at: DateTime<Utc>,
}

/// Live login sessions keyed by session id. A session stays valid while it
/// is used at least once per `ttl`.
pub struct SessionStore {
    sessions: DashMap<Uuid, Session>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
            clock,
        }
    }

    /// Starts a fresh session for `account_id`, discarding `previous` so a
    /// session id is never reused across logins.
    pub fn rotate(&self, previous: Option<Uuid>, account_id: i32) -> (Uuid, Session) {
        if let Some(previous) = previous {
            if self.sessions.remove(&previous).is_some() {
                debug!(session_id = %previous, "Discarded previous session on login");
            }
        }
        let session_id = Uuid::new_v4();
        let session = Session {
            account_id,
            expires_at: self.clock.now() + self.ttl,
        };
        self.sessions.insert(session_id, session);
        (session_id, session)
    }

    /// Validates a session and pushes its expiry forward. Expired sessions
    /// are removed and reported as absent.
    pub fn touch(&self, session_id: Uuid, account_id: i32) -> Option<Session> {
        let now = self.clock.now();
        let mut entry = self.sessions.get_mut(&session_id)?;
        if entry.account_id != account_id {
            return None;
        }
        if entry.expires_at <= now {
            drop(entry);
            self.sessions.remove(&session_id);
            debug!(session_id = %session_id, "Session expired");
            return None;
        }
        entry.expires_at = now + self.ttl;
        Some(*entry)
    }

    pub fn end(&self, session_id: Uuid) {
        self.sessions.remove(&session_id);
    }

    pub fn purge_expired(&self) {
        let now = self.clock.now();
        self.sessions.retain(|_, session| session.expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
