//! Metrics implementation using Prometheus.

use fanplay_core::{Error, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Terminal state of one analysis, used as a metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Success,
    InvalidInput,
    EngineUnavailable,
    MalformedResponse,
    Busy,
    Superseded,
    Failed,
}

impl AnalysisOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisOutcome::Success => "success",
            AnalysisOutcome::InvalidInput => "invalid_input",
            AnalysisOutcome::EngineUnavailable => "engine_unavailable",
            AnalysisOutcome::MalformedResponse => "malformed_response",
            AnalysisOutcome::Busy => "busy",
            AnalysisOutcome::Superseded => "superseded",
            AnalysisOutcome::Failed => "failed",
        }
    }

    /// Classify a result.
    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => AnalysisOutcome::Success,
            Err(Error::InvalidInput(_)) | Err(Error::UnsupportedPersona(_)) => {
                AnalysisOutcome::InvalidInput
            }
            Err(Error::EngineUnavailable(_)) => AnalysisOutcome::EngineUnavailable,
            Err(Error::MalformedResponse(_)) => AnalysisOutcome::MalformedResponse,
            Err(Error::SessionBusy) => AnalysisOutcome::Busy,
            Err(Error::Superseded) => AnalysisOutcome::Superseded,
            Err(_) => AnalysisOutcome::Failed,
        }
    }
}

/// Initialize Prometheus recorder and return the handle.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| Error::config(format!("Failed to install Prometheus recorder: {}", e)))?;

    tracing::info!("Prometheus metrics recorder initialized");
    Ok(handle)
}

/// Count an analysis and record its latency.
pub fn track_analysis(persona: &str, outcome: AnalysisOutcome, latency: Duration) {
    metrics::counter!(
        "fanplay_analyses_total",
        "persona" => persona.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);

    metrics::histogram!("fanplay_analysis_duration_seconds", "persona" => persona.to_string())
        .record(latency.as_secs_f64());
}

/// Count an identification overridden by the session hint.
pub fn track_drift_correction(persona: &str) {
    metrics::counter!("fanplay_drift_corrections_total", "persona" => persona.to_string())
        .increment(1);
}

/// Helper to track HTTP request metrics (latency, count).
pub fn track_request(method: &str, path: &str, status: u16, latency_sec: f64) {
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(latency_sec);
}
