//! External reasoning engine trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{EngineReply, EngineRequest};

/// Multi-modal reasoning/search engine.
///
/// Implementations perform exactly one upstream call per `generate` and
/// never retry on their own. Transport failures surface as
/// `Error::EngineUnavailable`.
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    /// Run one structured generation.
    async fn generate(&self, request: EngineRequest) -> Result<EngineReply>;

    /// Model used when a request leaves `model` empty.
    fn default_model(&self) -> &str;
}
