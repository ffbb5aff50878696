//! Engine Invocation Gateway for FanPlay.
//!
//! This crate provides:
//! - Gemini `generateContent` client implementing `ReasoningEngine`
//! - Construction from the application's engine configuration

pub mod gemini_client;

pub use gemini_client::{GeminiClient, GeminiConfig};

use fanplay_core::config::EngineConfig;

/// Create the engine client from configuration.
///
/// Fails when no API key is configured.
pub fn create_client_from_config(config: &EngineConfig) -> fanplay_core::Result<GeminiClient> {
    let key = config.api_key.clone().ok_or_else(|| {
        fanplay_core::Error::config("No API key found. Set APP__ENGINE__API_KEY or GEMINI_API_KEY")
    })?;

    let gemini = GeminiConfig::new(&config.model)
        .with_api_base(&config.api_base)
        .with_api_key(key)
        .with_timeout(std::time::Duration::from_millis(config.timeout_ms));

    GeminiClient::new(gemini)
}
