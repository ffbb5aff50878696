//! Moment Analysis Orchestrator for FanPlay.
//!
//! This crate provides input normalization, persona instructions, the
//! identification lock, response validation, grounding extraction, and the
//! session that ties them together around a `ReasoningEngine`.

pub mod instruction;
pub mod lock;
pub mod normalizer;
pub mod orchestrator;
pub mod session;
pub mod sources;
pub mod validator;

pub use lock::{IdentificationLock, LockState};
pub use normalizer::{normalize, source_key, video_identifier};
pub use orchestrator::{Analysis, MomentOrchestrator, OrchestratorConfig};
pub use session::AnalysisSession;
pub use sources::extract_sources;
pub use validator::{validate, ValidatedGuide};
