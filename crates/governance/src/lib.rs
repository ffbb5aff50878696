//! Observability for FanPlay.
//!
//! This crate provides:
//! - Tracing subscriber setup with optional OTLP export
//! - Prometheus metrics for analyses and HTTP requests

pub mod metrics;
pub mod tracing_layer;

pub use metrics::{
    setup_metrics_recorder, track_analysis, track_drift_correction, track_request, AnalysisOutcome,
};
pub use tracing_layer::configure_tracing;
