//! Moment analysis orchestrator.
//!
//! Normalizer → instruction builder → engine → validator → source extractor.
//! Stateless apart from the injected engine; identification state lives in
//! `AnalysisSession`.

use std::sync::Arc;
use std::time::Instant;

use fanplay_core::{
    traits::ReasoningEngine,
    types::{AnalysisRequest, EngineRequest, GuideResponse, PersonaTag, SourceInput, SportTag},
    Error, Result,
};
use fanplay_governance::{track_analysis, track_drift_correction, AnalysisOutcome};

use crate::instruction::{build_contents, build_instruction, response_schema, RESPONSE_MIME_TYPE};
use crate::normalizer::normalize;
use crate::sources::extract_sources;
use crate::validator::validate;

/// Orchestrator settings.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Model override; empty uses the engine default.
    pub model: String,
    /// Let the engine ground its answer with web search.
    pub enable_search: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            enable_search: true,
        }
    }
}

/// Result of one engine round trip.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub guide: GuideResponse,
    /// The identification was replaced by the hint.
    pub drift_corrected: bool,
}

/// The moment analysis pipeline.
pub struct MomentOrchestrator {
    engine: Arc<dyn ReasoningEngine>,
    config: OrchestratorConfig,
}

impl MomentOrchestrator {
    /// Create an orchestrator around an engine.
    pub fn new(engine: Arc<dyn ReasoningEngine>) -> Self {
        Self {
            engine,
            config: OrchestratorConfig::default(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable or disable evidence search.
    pub fn with_search(mut self, enable: bool) -> Self {
        self.config.enable_search = enable;
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Analyze one moment.
    ///
    /// `hint` is a previously confirmed event for the same source; callers
    /// that track sessions should use `AnalysisSession` instead.
    pub async fn analyze(
        &self,
        sport: SportTag,
        persona: PersonaTag,
        source: SourceInput,
        hint: Option<&str>,
    ) -> Result<GuideResponse> {
        let started = Instant::now();

        let result = match normalize(sport, persona, source, hint.map(str::to_string)) {
            Ok(request) => self.run(&request).await.map(|analysis| analysis.guide),
            Err(e) => Err(e),
        };

        record_outcome(persona, &result, started);
        result
    }

    /// Build the engine request for a normalized request.
    pub fn engine_request(&self, request: &AnalysisRequest) -> EngineRequest {
        EngineRequest {
            model: self.config.model.clone(),
            contents: build_contents(request),
            system_instruction: build_instruction(
                request.persona,
                request.sport,
                request.identification_hint.as_deref(),
            ),
            response_mime_type: RESPONSE_MIME_TYPE.to_string(),
            response_schema: response_schema(),
            enable_search: self.config.enable_search,
        }
    }

    /// Invoke the engine once and validate its reply.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<Analysis> {
        let hint = request.identification_hint.as_deref();

        tracing::info!(
            sport = %request.sport,
            persona = %request.persona,
            source_kind = request.source_kind().as_str(),
            hinted = hint.is_some(),
            "Analyzing moment"
        );

        let reply = self.engine.generate(self.engine_request(request)).await?;

        let validated = validate(&reply.text, hint).map_err(|e| {
            tracing::warn!(error = %e, raw_len = reply.text.len(), "Engine output rejected");
            e
        })?;

        if validated.drift_corrected {
            track_drift_correction(request.persona.as_str());
        }

        let sources = extract_sources(reply.grounding_chunks.as_deref());

        tracing::info!(
            identified_event = %validated.identified_event,
            rules = validated.foundational_rules.len(),
            sources = sources.as_ref().map(Vec::len).unwrap_or(0),
            drift_corrected = validated.drift_corrected,
            "Moment analyzed"
        );

        Ok(Analysis {
            guide: GuideResponse {
                identified_event: validated.identified_event,
                foundational_rules: validated.foundational_rules,
                narrative: validated.narrative,
                sources,
            },
            drift_corrected: validated.drift_corrected,
        })
    }
}

/// Count and time a finished analysis.
pub(crate) fn record_outcome<T>(persona: PersonaTag, result: &Result<T>, started: Instant) {
    let outcome = AnalysisOutcome::of(result);
    if let Err(e) = result {
        match e {
            Error::InvalidInput(_) | Error::UnsupportedPersona(_) => {
                tracing::debug!(error = %e, "Analysis rejected")
            }
            _ => tracing::warn!(error = %e, outcome = outcome.as_str(), "Analysis failed"),
        }
    }
    track_analysis(persona.as_str(), outcome, started.elapsed());
}
