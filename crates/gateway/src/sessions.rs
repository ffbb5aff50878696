//! Session registry.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use fanplay_controller::{AnalysisSession, MomentOrchestrator};

struct SessionEntry {
    session: Arc<AnalysisSession>,
    last_used: Instant,
}

/// Live sessions keyed by caller-chosen id. Sessions never share state.
pub struct SessionRegistry {
    orchestrator: Arc<MomentOrchestrator>,
    sessions: DashMap<String, SessionEntry>,
}

impl SessionRegistry {
    pub fn new(orchestrator: Arc<MomentOrchestrator>) -> Self {
        Self {
            orchestrator,
            sessions: DashMap::new(),
        }
    }

    /// Get a session, creating it on first use.
    pub fn get_or_create(&self, session_id: &str) -> Arc<AnalysisSession> {
        let mut entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(session_id = %session_id, "Session created");
                SessionEntry {
                    session: Arc::new(AnalysisSession::with_id(
                        session_id,
                        self.orchestrator.clone(),
                    )),
                    last_used: Instant::now(),
                }
            });
        entry.last_used = Instant::now();
        entry.session.clone()
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<AnalysisSession>> {
        self.sessions.get_mut(session_id).map(|mut entry| {
            entry.last_used = Instant::now();
            entry.session.clone()
        })
    }

    /// Drop a session, cancelling anything it has pending.
    pub fn remove(&self, session_id: &str) -> bool {
        match self.sessions.remove(session_id) {
            Some((_, entry)) => {
                entry.session.cancel();
                true
            }
            None => false,
        }
    }

    /// Drop sessions unused for `max_idle`. Sessions with a pending
    /// analysis are kept. Returns how many were evicted.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, entry| entry.session.is_busy() || entry.last_used.elapsed() < max_idle);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.sessions.len(), "Idle sessions evicted");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
