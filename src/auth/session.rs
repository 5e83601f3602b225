//! Session management
//!
//! Maps opaque session tokens to logged-in usernames. The store is shared by
//! every request task, so all access goes through a single mutex.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::debug;
use tokio::sync::Mutex;
use uuid::Uuid;

/// One logged-in browser client
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub created_at: Instant,
}

impl Session {
    fn is_expired(&self, ttl: Option<Duration>) -> bool {
        ttl.is_some_and(|ttl| self.created_at.elapsed() > ttl)
    }
}

/// Process-wide token → session table. Nothing is persisted.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    ttl: Option<Duration>,
}

impl SessionStore {
    /// Sessions live until logout or process restart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions older than `ttl` are treated as logged out.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl: Some(ttl),
        }
    }

    /// Records a new session for `username` and returns its token.
    pub async fn create(&self, username: &str) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let session = Session {
            token: token.clone(),
            username: username.to_string(),
            created_at: Instant::now(),
        };

        let mut sessions = self.sessions.lock().await;
        sessions.insert(token.clone(), session);
        debug!("Session created for {} ({} active)", username, sessions.len());
        token
    }

    /// Username bound to `token`, if the session exists and has not expired.
    pub async fn lookup(&self, token: &str) -> Option<String> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get(token)?;

        if session.is_expired(self.ttl) {
            debug!("Session for {} expired", session.username);
            sessions.remove(token);
            return None;
        }
        Some(session.username.clone())
    }

    /// Removes the session; unknown tokens are ignored.
    ///
    /// Returns the username the token belonged to, if any.
    pub async fn destroy(&self, token: &str) -> Option<String> {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(token).map(|session| session.username)
    }

    /// Drops every expired session. Returns how many were removed.
    pub async fn prune_expired(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(self.ttl));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }
}
