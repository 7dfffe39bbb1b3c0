//! In-memory credential store keyed by session id.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use super::Credentials;

/// Credentials of one browser session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Provider account id, when the profile lookup succeeded.
    pub user_id: Option<String>,
    pub credentials: Credentials,
    /// Last time the session was read or updated.
    pub last_used: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: Option<String>, credentials: Credentials) -> Self {
        Self {
            user_id,
            credentials,
            last_used: Utc::now(),
        }
    }

    /// Account id for log lines.
    pub fn user(&self) -> &str {
        self.user_id.as_deref().unwrap_or("unknown")
    }
}

/// Shared map from session id to [`Session`].
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a session under a fresh id and return the id.
    pub async fn insert(&self, session: Session) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.sessions.write().await.insert(id.clone(), session);
        id
    }

    /// Look up a session and mark it as used.
    pub async fn get(&self, session_id: &str) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(session_id)?;
        session.last_used = Utc::now();
        Some(session.clone())
    }

    /// Replace the credentials of an existing session.
    ///
    /// Returns `false` if the session is unknown.
    pub async fn update(&self, session_id: &str, credentials: Credentials) -> bool {
        match self.sessions.write().await.get_mut(session_id) {
            Some(session) => {
                session.credentials = credentials;
                session.last_used = Utc::now();
                true
            }
            None => false,
        }
    }

    pub async fn remove(&self, session_id: &str) -> Option<Session> {
        self.sessions.write().await.remove(session_id)
    }

    /// Drop sessions not used within `max_idle`. Returns how many were removed.
    pub async fn cleanup_expired(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.last_used >= cutoff);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
