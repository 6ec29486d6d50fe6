// Session management for concurrent HTTP clients

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time;
use uuid::Uuid;

use crate::session::ConversationSession;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Maximum session limit reached ({active}/{max})")]
    Capacity { active: usize, max: usize },
}

/// Per-session state
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Unique session identifier
    pub id: String,
    /// Message log and risk state
    pub conversation: ConversationSession,
    /// Last activity timestamp
    pub last_activity: DateTime<Utc>,
    /// Session creation time
    pub created_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new(conversation: ConversationSession) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            conversation,
            last_activity: now,
            created_at: now,
        }
    }

    /// Update last activity timestamp
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// Check if session has been idle too long
    pub fn is_expired(&self, timeout_minutes: u64) -> bool {
        let elapsed = Utc::now().signed_duration_since(self.last_activity);
        elapsed.num_minutes() >= timeout_minutes as i64
    }
}

/// Concurrent session manager using DashMap
///
/// Map guards are only held inside synchronous closures, never across an
/// await, so a slow reply backend cannot block other sessions.
pub struct SessionManager {
    sessions: Arc<DashMap<String, SessionState>>,
    max_sessions: usize,
    timeout_minutes: u64,
}

impl SessionManager {
    pub fn new(max_sessions: usize, timeout_minutes: u64) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            max_sessions,
            timeout_minutes,
        }
    }

    /// Register a new session
    pub fn create(&self, conversation: ConversationSession) -> Result<SessionState, SessionError> {
        if self.sessions.len() >= self.max_sessions {
            return Err(SessionError::Capacity {
                active: self.sessions.len(),
                max: self.max_sessions,
            });
        }

        let session = SessionState::new(conversation);
        self.sessions.insert(session.id.clone(), session.clone());

        tracing::info!(session_id = %session.id, "Created new session");
        Ok(session)
    }

    /// Snapshot of a session
    pub fn get(&self, session_id: &str) -> Result<SessionState, SessionError> {
        self.sessions
            .get(session_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    /// Mutate a session in place and mark it active
    pub fn with_session<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut SessionState) -> R,
    ) -> Result<R, SessionError> {
        let mut entry = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        entry.touch();
        Ok(f(entry.value_mut()))
    }

    /// Delete a session (logout)
    pub fn delete(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    /// Get active session count
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// Remove idle sessions, returning how many were dropped
    pub fn cleanup_expired(&self) -> usize {
        remove_expired(&self.sessions, self.timeout_minutes)
    }

    /// Sweep idle sessions once a minute until the handle is aborted
    pub fn start_cleanup_task(&self) -> JoinHandle<()> {
        let sessions = Arc::clone(&self.sessions);
        let timeout_minutes = self.timeout_minutes;

        tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                remove_expired(&sessions, timeout_minutes);
            }
        })
    }
}

fn remove_expired(sessions: &DashMap<String, SessionState>, timeout_minutes: u64) -> usize {
    let expired: Vec<String> = sessions
        .iter()
        .filter(|entry| entry.value().is_expired(timeout_minutes))
        .map(|entry| entry.key().clone())
        .collect();

    let mut removed_count = 0;
    for session_id in expired {
        if sessions.remove(&session_id).is_some() {
            removed_count += 1;
            tracing::debug!(session_id = %session_id, "Removed expired session");
        }
    }

    if removed_count > 0 {
        tracing::info!(
            removed = removed_count,
            active = sessions.len(),
            "Cleaned up expired sessions"
        );
    }
    removed_count
}
