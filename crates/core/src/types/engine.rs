use serde::{Deserialize, Serialize};

// =============================================================================
// Engine Contract Types
// =============================================================================

/// Inline media sent to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineMedia {
    pub mime_type: String,
    /// Base64 (standard alphabet) encoded bytes.
    pub data: String,
}

/// One ordered content part of an engine request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    Text {
        text: String,
    },
    InlineMedia {
        #[serde(rename = "inlineData")]
        inline_data: InlineMedia,
    },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn inline_media(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        ContentPart::InlineMedia {
            inline_data: InlineMedia {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text { text } => Some(text),
            ContentPart::InlineMedia { .. } => None,
        }
    }
}

/// Everything the engine needs for one structured generation.
#[derive(Debug, Clone)]
pub struct EngineRequest {
    /// Model identifier. Empty means "engine default".
    pub model: String,
    pub contents: Vec<ContentPart>,
    pub system_instruction: String,
    pub response_mime_type: String,
    pub response_schema: serde_json::Value,
    /// Allow the engine to consult web search for grounding.
    pub enable_search: bool,
}

/// A web citation inside grounding metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebCitation {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// One grounding chunk; only chunks with `web` carry a citation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<WebCitation>,
}

impl GroundingChunk {
    pub fn web(title: Option<&str>, uri: Option<&str>) -> Self {
        Self {
            web: Some(WebCitation {
                uri: uri.map(str::to_string),
                title: title.map(str::to_string),
            }),
        }
    }
}

/// Raw engine output.
#[derive(Debug, Clone, Default)]
pub struct EngineReply {
    /// Structured text, expected to be JSON.
    pub text: String,
    pub grounding_chunks: Option<Vec<GroundingChunk>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_parts_serialize_to_wire_shape() {
        let parts = vec![
            ContentPart::inline_media("video/mp4", "AAEC"),
            ContentPart::text("Analyze this"),
        ];
        let value = serde_json::to_value(&parts).unwrap();
        assert_eq!(
            value,
            json!([
                {"inlineData": {"mimeType": "video/mp4", "data": "AAEC"}},
                {"text": "Analyze this"}
            ])
        );
    }

    #[test]
    fn test_grounding_chunk_without_web() {
        let chunk: GroundingChunk = serde_json::from_value(json!({"notWeb": true})).unwrap();
        assert!(chunk.web.is_none());
    }
}
