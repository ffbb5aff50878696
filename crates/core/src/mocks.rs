//! Mock implementations of core traits for testing.
//!
//! `ScriptedEngine` replays canned engine replies and records every request
//! it receives, so orchestrator tests run without a network.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Semaphore;

use crate::{
    traits::ReasoningEngine,
    types::{EngineReply, EngineRequest, GroundingChunk},
    Error, Result,
};

// =============================================================================
// Scripted Engine
// =============================================================================

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Reply(EngineReply),
    Unavailable(String),
}

/// Engine double returning predefined replies in order.
///
/// The last reply repeats once the script is exhausted.
pub struct ScriptedEngine {
    replies: Mutex<VecDeque<ScriptedReply>>,
    last: Mutex<Option<ScriptedReply>>,
    requests: Mutex<Vec<EngineRequest>>,
    call_count: AtomicUsize,
    gate: Option<Semaphore>,
}

impl ScriptedEngine {
    /// Create a new engine with a queue of replies.
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Engine that always answers with the same raw text.
    pub fn constant(text: &str) -> Self {
        Self::new(vec![ScriptedReply::Reply(EngineReply {
            text: text.to_string(),
            grounding_chunks: None,
        })])
    }

    /// Engine that always fails to connect.
    pub fn unavailable(reason: &str) -> Self {
        Self::new(vec![ScriptedReply::Unavailable(reason.to_string())])
    }

    /// Hold every call until `release` hands out a permit.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    /// Let `n` pending or future calls complete.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Number of calls received so far (including gated ones).
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<EngineRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<EngineRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Yield until at least `n` calls have arrived.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.call_count() < n {
            tokio::task::yield_now().await;
        }
    }

    fn next_reply(&self) -> Option<ScriptedReply> {
        let mut replies = self.replies.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        if let Some(reply) = replies.pop_front() {
            *last = Some(reply.clone());
            Some(reply)
        } else {
            last.clone()
        }
    }
}

#[async_trait]
impl ReasoningEngine for ScriptedEngine {
    async fn generate(&self, request: EngineRequest) -> Result<EngineReply> {
        self.requests.lock().unwrap().push(request);
        self.call_count.fetch_add(1, Ordering::SeqCst);

        // Reply is chosen at arrival so gated calls keep their script order.
        let reply = self.next_reply();

        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| Error::internal(format!("gate closed: {}", e)))?;
            permit.forget();
        }

        match reply {
            Some(ScriptedReply::Reply(reply)) => Ok(reply),
            Some(ScriptedReply::Unavailable(reason)) => Err(Error::engine_unavailable(reason)),
            None => Err(Error::engine_unavailable("no scripted reply")),
        }
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }
}

// =============================================================================
// Canned Payloads
// =============================================================================

/// A schema-conforming guide JSON for `event`.
pub fn guide_json(event: &str) -> String {
    serde_json::json!({
        "identifiedEvent": event,
        "foundationalRules": [
            "Points are scored by landing the ball in the opponent's court.",
            "Each point starts with a serve.",
            "A set is won by the first player to six games with a two-game lead."
        ],
        "whatHappened": "A decisive rally ended with a passing shot.",
        "whyItMatters": "It broke serve late in the deciding set.",
        "whatHappensNext": "The winner serves for the championship."
    })
    .to_string()
}

/// A successful reply for `event` with optional grounding.
pub fn guide_reply(event: &str, grounding: Option<Vec<GroundingChunk>>) -> ScriptedReply {
    ScriptedReply::Reply(EngineReply {
        text: guide_json(event),
        grounding_chunks: grounding,
    })
}
