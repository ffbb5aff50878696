//! Per-viewer analysis session.
//!
//! Owns the identification lock and enforces one in-flight analysis at a
//! time. A request for the same source while one is pending is refused; a
//! request for a different source supersedes and cancels the pending one.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use tokio::sync::Notify;

use fanplay_core::{
    types::{GuideResponse, PersonaTag, SourceInput, SportTag},
    Error, Result,
};

use crate::lock::{IdentificationLock, LockState};
use crate::normalizer::{normalize, source_key};
use crate::orchestrator::{record_outcome, MomentOrchestrator};

struct InFlight {
    generation: u64,
    source_key: String,
    cancel: Arc<Notify>,
}

#[derive(Default)]
struct SessionState {
    lock: IdentificationLock,
    generation: u64,
    in_flight: Option<InFlight>,
}

/// Owns the in-flight slot of one call.
///
/// Clears the slot if the call's future is dropped before it finishes, so a
/// disconnected or timed-out caller never leaves the session busy.
struct FlightSlot<'a> {
    session: &'a AnalysisSession,
    generation: u64,
    released: bool,
}

impl FlightSlot<'_> {
    /// Give the slot back under the held state lock. Returns whether this
    /// call was still the current one.
    fn release(&mut self, state: &mut SessionState) -> bool {
        self.released = true;
        let current = state
            .in_flight
            .as_ref()
            .is_some_and(|flight| flight.generation == self.generation);
        if current {
            state.in_flight = None;
        }
        current
    }
}

impl Drop for FlightSlot<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let session = self.session;
        let mut state = session.state();
        if self.release(&mut state) {
            tracing::debug!(
                session_id = %session.id,
                generation = self.generation,
                "Caller went away, pending analysis abandoned"
            );
        }
    }
}

/// One viewer's sequence of analyses.
pub struct AnalysisSession {
    id: String,
    orchestrator: Arc<MomentOrchestrator>,
    state: Mutex<SessionState>,
}

impl AnalysisSession {
    /// Create a session with a fresh id.
    pub fn new(orchestrator: Arc<MomentOrchestrator>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), orchestrator)
    }

    /// Create a session with a caller-chosen id.
    pub fn with_id(id: impl Into<String>, orchestrator: Arc<MomentOrchestrator>) -> Self {
        Self {
            id: id.into(),
            orchestrator,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        // State stays consistent even if a holder panicked: every critical
        // section is a handful of field assignments.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current identification lock state.
    pub fn lock_state(&self) -> LockState {
        self.state().lock.state()
    }

    /// Whether an analysis is pending.
    pub fn is_busy(&self) -> bool {
        self.state().in_flight.is_some()
    }

    /// Guard for the persona-change re-trigger: true when a confirmed
    /// result exists for this source and nothing is pending.
    pub fn should_reanalyze(&self, source: &SourceInput) -> bool {
        let Some(key) = source_key(source) else {
            return false;
        };
        let state = self.state();
        state.in_flight.is_none() && state.lock.is_locked_for(&key)
    }

    /// Cancel the pending analysis, if any. Returns whether one was cancelled.
    pub fn cancel(&self) -> bool {
        let mut state = self.state();
        match state.in_flight.take() {
            Some(flight) => {
                flight.cancel.notify_one();
                tracing::info!(
                    session_id = %self.id,
                    generation = flight.generation,
                    "Pending analysis cancelled"
                );
                true
            }
            None => false,
        }
    }

    /// Forget the confirmed identification. The next analysis of any
    /// source starts from an open identification.
    pub fn reset_identification(&self) {
        self.state().lock.reset();
    }

    /// Analyze a moment within this session.
    ///
    /// The confirmed event of the same source, if any, is passed as the
    /// identification hint. The lock is updated only on success.
    pub async fn analyze(
        &self,
        sport: SportTag,
        persona: PersonaTag,
        source: SourceInput,
    ) -> Result<GuideResponse> {
        let started = Instant::now();
        let result = self.analyze_inner(sport, persona, source).await;
        record_outcome(persona, &result, started);
        result
    }

    async fn analyze_inner(
        &self,
        sport: SportTag,
        persona: PersonaTag,
        source: SourceInput,
    ) -> Result<GuideResponse> {
        let mut request = normalize(sport, persona, source, None)?;

        let (mut slot, cancel) = {
            let mut state = self.state();

            if let Some(current) = &state.in_flight {
                if current.source_key == request.source_key {
                    return Err(Error::SessionBusy);
                }
                current.cancel.notify_one();
                tracing::info!(
                    session_id = %self.id,
                    generation = current.generation,
                    "Source changed, superseding pending analysis"
                );
            }

            state.generation += 1;
            let generation = state.generation;
            let cancel = Arc::new(Notify::new());
            state.in_flight = Some(InFlight {
                generation,
                source_key: request.source_key.clone(),
                cancel: cancel.clone(),
            });

            request.identification_hint = state.lock.hint_for(&request.source_key);
            let slot = FlightSlot {
                session: self,
                generation,
                released: false,
            };
            (slot, cancel)
        };
        let generation = slot.generation;

        tracing::debug!(
            session_id = %self.id,
            generation,
            hinted = request.identification_hint.is_some(),
            "Analysis started"
        );

        let outcome = tokio::select! {
            result = self.orchestrator.run(&request) => Some(result),
            _ = cancel.notified() => None,
        };

        let mut state = self.state();
        let still_current = slot.release(&mut state);

        match outcome {
            None => Err(Error::Superseded),
            Some(_) if !still_current => {
                tracing::debug!(session_id = %self.id, generation, "Discarding stale response");
                Err(Error::Superseded)
            }
            Some(Ok(analysis)) => {
                state
                    .lock
                    .confirm(request.source_key.clone(), analysis.guide.identified_event.clone());
                Ok(analysis.guide)
            }
            Some(Err(e)) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanplay_core::mocks::{guide_json, guide_reply, ScriptedEngine};

    fn session(engine: Arc<ScriptedEngine>) -> AnalysisSession {
        AnalysisSession::with_id("s1", Arc::new(MomentOrchestrator::new(engine)))
    }

    #[tokio::test]
    async fn test_success_locks_source() {
        let engine = Arc::new(ScriptedEngine::constant(&guide_json("E1")));
        let session = session(engine);
        let source = SourceInput::url("u1");

        assert!(!session.should_reanalyze(&source));
        session
            .analyze(SportTag::Tennis, PersonaTag::Beginner, source.clone())
            .await
            .unwrap();

        assert_eq!(
            session.lock_state(),
            LockState::Locked {
                source_key: "u1".into(),
                confirmed_event: "E1".into()
            }
        );
        assert!(session.should_reanalyze(&source));
        assert!(!session.should_reanalyze(&SourceInput::url("u2")));
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_failure_keeps_lock() {
        let engine = Arc::new(ScriptedEngine::new(vec![
            guide_reply("E1", None),
            fanplay_core::mocks::ScriptedReply::Unavailable("down".into()),
        ]));
        let session = session(engine);

        session
            .analyze(SportTag::Tennis, PersonaTag::Beginner, SourceInput::url("u1"))
            .await
            .unwrap();
        let before = session.lock_state();

        let err = session
            .analyze(SportTag::Tennis, PersonaTag::Hardcore, SourceInput::url("u2"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::EngineUnavailable(_)));
        assert_eq!(session.lock_state(), before);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_cancel_without_pending_is_false() {
        let engine = Arc::new(ScriptedEngine::constant(&guide_json("E")));
        assert!(!session(engine).cancel());
    }

    #[tokio::test]
    async fn test_reply_for_superseded_generation_is_discarded() {
        let engine = Arc::new(ScriptedEngine::constant(&guide_json("Old match")).gated());
        let session = Arc::new(session(engine.clone()));

        let s = session.clone();
        let pending = tokio::spawn(async move {
            s.analyze(SportTag::Tennis, PersonaTag::Beginner, SourceInput::url("u1"))
                .await
        });
        engine.wait_for_calls(1).await;

        // A newer call takes the slot; the pending one is never woken and
        // its engine reply arrives late.
        {
            let mut state = session.state();
            state.generation += 1;
            let generation = state.generation;
            state.in_flight = Some(InFlight {
                generation,
                source_key: "u2".into(),
                cancel: Arc::new(Notify::new()),
            });
        }
        engine.release(1);

        let err = pending.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::Superseded));
        assert_eq!(session.lock_state(), LockState::Unlocked);
        // The newer call's slot is left alone.
        assert!(session.is_busy());
    }

    #[tokio::test]
    async fn test_reset_identification_drops_hint() {
        let engine = Arc::new(ScriptedEngine::constant(&guide_json("E1")));
        let session = session(engine.clone());
        let source = SourceInput::url("u1");

        session
            .analyze(SportTag::Tennis, PersonaTag::Beginner, source.clone())
            .await
            .unwrap();
        session.reset_identification();

        assert_eq!(session.lock_state(), LockState::Unlocked);
        assert!(!session.should_reanalyze(&source));

        session
            .analyze(SportTag::Tennis, PersonaTag::Coach, source)
            .await
            .unwrap();
        assert!(!engine
            .last_request()
            .unwrap()
            .system_instruction
            .contains("ALREADY CONFIRMED"));
    }
}
