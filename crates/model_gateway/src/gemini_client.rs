//! Gemini engine client.
//!
//! Speaks the `generateContent` REST contract: one POST per analysis,
//! structured JSON output, optional Google Search grounding.

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use fanplay_core::{
    config::{DEFAULT_API_BASE, DEFAULT_MODEL},
    traits::ReasoningEngine,
    types::{ContentPart, EngineReply, EngineRequest, GroundingChunk},
    Error, Result,
};

/// Upstream error bodies are truncated to this many characters in errors.
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Configuration for the Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Base URL, without trailing slash.
    pub api_base: String,
    /// Default model name.
    pub model: String,
    /// API key sent as `x-goog-api-key`.
    pub api_key: Option<Secret<String>>,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(60),
        }
    }
}

impl GeminiConfig {
    /// Create config for a model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Set the base URL.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: Secret<String>) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Gemini-backed reasoning engine.
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base, model
        )
    }

    /// Build the wire body for a request.
    fn build_body<'a>(&self, request: &'a EngineRequest) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![WireContent {
                role: "user",
                parts: &request.contents,
            }],
            system_instruction: WireSystemInstruction {
                parts: vec![ContentPart::text(request.system_instruction.clone())],
            },
            generation_config: WireGenerationConfig {
                response_mime_type: &request.response_mime_type,
                response_schema: &request.response_schema,
            },
            tools: request
                .enable_search
                .then(|| vec![serde_json::json!({ "googleSearch": {} })]),
        }
    }
}

#[async_trait]
impl ReasoningEngine for GeminiClient {
    async fn generate(&self, request: EngineRequest) -> Result<EngineReply> {
        let model = if request.model.is_empty() {
            self.config.model.as_str()
        } else {
            request.model.as_str()
        };

        tracing::debug!(
            model = %model,
            parts = request.contents.len(),
            instruction_len = request.system_instruction.len(),
            search = request.enable_search,
            "Calling engine"
        );

        let body = self.build_body(&request);
        let mut builder = self.http.post(self.endpoint(model)).json(&body);
        if let Some(key) = &self.config.api_key {
            builder = builder.header("x-goog-api-key", key.expose_secret());
        }

        let started = Instant::now();
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::engine_unavailable(format!(
                    "request timed out after {} ms",
                    self.config.timeout.as_millis()
                ))
            } else {
                Error::engine_unavailable(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
            tracing::warn!(status = %status, body = %snippet, "Engine returned error status");
            return Err(Error::engine_unavailable(format!("HTTP {}: {}", status, snippet)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::engine_unavailable(format!("failed to read body: {}", e)))?;

        let envelope: GenerateContentResponse = serde_json::from_slice(&bytes)
            .map_err(|e| Error::malformed(format!("engine envelope is not valid JSON: {}", e)))?;

        let reply = envelope.into_reply();
        tracing::debug!(
            model = %model,
            latency_ms = started.elapsed().as_millis() as u64,
            text_len = reply.text.len(),
            grounding = reply.grounding_chunks.as_ref().map(|c| c.len()).unwrap_or(0),
            "Engine replied"
        );

        Ok(reply)
    }

    fn default_model(&self) -> &str {
        &self.config.model
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<WireContent<'a>>,
    system_instruction: WireSystemInstruction,
    generation_config: WireGenerationConfig<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
struct WireContent<'a> {
    role: &'static str,
    parts: &'a [ContentPart],
}

#[derive(Debug, Serialize)]
struct WireSystemInstruction {
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Option<Vec<GroundingChunk>>,
}

impl GenerateContentResponse {
    /// Concatenate the first candidate's text parts and take its grounding.
    fn into_reply(self) -> EngineReply {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return EngineReply::default();
        };

        let text = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        EngineReply {
            text,
            grounding_chunks: candidate.grounding_metadata.and_then(|g| g.grounding_chunks),
        }
    }
}
