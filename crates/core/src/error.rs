//! Error types for FanPlay.

use thiserror::Error;

/// Result type alias using FanPlay's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Shown when neither a link nor a file was supplied.
pub const MISSING_SOURCE_MESSAGE: &str = "Provide a video link or file.";

/// Shown when the engine answered with something we could not use.
pub const MALFORMED_RESPONSE_MESSAGE: &str =
    "Analysis failed. Try describing the play or link a clearer video.";

/// Shown when the engine could not be reached.
pub const ENGINE_UNAVAILABLE_MESSAGE: &str =
    "The analysis engine is unavailable right now. Please try again.";

/// Core error type for FanPlay.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Input Errors
    // =========================================================================
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported persona: {0}")]
    UnsupportedPersona(String),

    // =========================================================================
    // Engine Errors
    // =========================================================================
    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Malformed engine response: {0}")]
    MalformedResponse(String),

    // =========================================================================
    // Session Errors
    // =========================================================================
    #[error("An analysis for this source is already in progress")]
    SessionBusy,

    #[error("Analysis was superseded by a newer request")]
    Superseded,

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid input error for a request without any source.
    pub fn missing_source() -> Self {
        Self::InvalidInput(MISSING_SOURCE_MESSAGE.to_string())
    }

    /// Create an engine unavailable error.
    pub fn engine_unavailable(msg: impl Into<String>) -> Self {
        Self::EngineUnavailable(msg.into())
    }

    /// Create a malformed response error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the caller may sensibly retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::EngineUnavailable(_))
    }

    /// Human-readable message for the end user.
    ///
    /// Parse diagnostics of malformed responses are never exposed here.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(msg) => msg.clone(),
            Self::UnsupportedPersona(persona) => format!(
                "Unknown analysis depth '{}'. Choose beginner, new_fan, hardcore or coach.",
                persona
            ),
            Self::EngineUnavailable(_) => ENGINE_UNAVAILABLE_MESSAGE.to_string(),
            Self::MalformedResponse(_) => MALFORMED_RESPONSE_MESSAGE.to_string(),
            Self::SessionBusy => {
                "An analysis for this clip is still running. Wait for it to finish.".to_string()
            }
            Self::Superseded => "This analysis was replaced by a newer request.".to_string(),
            Self::SessionNotFound(_) => "Session not found.".to_string(),
            Self::Config(_) | Self::Serialization(_) | Self::Internal(_) | Self::Other(_) => {
                "Something went wrong on our side.".to_string()
            }
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::UnsupportedPersona(_) => "unsupported_persona",
            Self::EngineUnavailable(_) => "engine_unavailable",
            Self::MalformedResponse(_) => "malformed_response",
            Self::SessionBusy => "session_busy",
            Self::Superseded => "superseded",
            Self::SessionNotFound(_) => "session_not_found",
            Self::Config(_) => "config",
            Self::Serialization(_) => "serialization",
            Self::Internal(_) | Self::Other(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_distinct() {
        let missing = Error::missing_source().user_message();
        let engine = Error::engine_unavailable("connection refused").user_message();
        let malformed = Error::malformed("expected value at line 1").user_message();

        assert_ne!(missing, engine);
        assert_ne!(missing, malformed);
        assert_ne!(engine, malformed);
        assert!(!malformed.contains("line 1"));
    }

    #[test]
    fn test_only_engine_failures_are_retryable() {
        assert!(Error::engine_unavailable("timeout").is_retryable());
        assert!(!Error::malformed("x").is_retryable());
        assert!(!Error::missing_source().is_retryable());
        assert!(!Error::SessionBusy.is_retryable());
    }
}
