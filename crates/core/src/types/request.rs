use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::{PersonaTag, SportTag};

// =============================================================================
// Request Types
// =============================================================================

/// An uploaded clip or still.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Display name, used as the source key.
    pub name: String,
    /// MIME type as reported by the uploader (e.g. `video/mp4`).
    pub mime_type: String,
    /// Raw media bytes.
    pub data: Bytes,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// Raw caller input before normalization.
///
/// Either field may be empty; the normalizer decides which one is used.
#[derive(Debug, Clone, Default)]
pub struct SourceInput {
    pub url: Option<String>,
    pub media: Option<MediaFile>,
}

impl SourceInput {
    /// Input carrying only a link.
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            media: None,
        }
    }

    /// Input carrying only an uploaded file.
    pub fn media(media: MediaFile) -> Self {
        Self {
            url: None,
            media: Some(media),
        }
    }

    /// Build from the `(source, is_url)` pair used by the UI layer.
    ///
    /// With `is_url` set the text is the link and any file is ignored;
    /// otherwise the file is the source.
    pub fn from_flagged(text: Option<String>, media: Option<MediaFile>, is_url: bool) -> Self {
        if is_url {
            Self { url: text, media: None }
        } else {
            Self { url: None, media }
        }
    }
}

/// Which kind of source a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Url,
    Media,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Url => "url",
            SourceKind::Media => "media",
        }
    }
}

/// The populated source of a normalized request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcePayload {
    Url(String),
    Media(MediaFile),
}

impl SourcePayload {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourcePayload::Url(_) => SourceKind::Url,
            SourcePayload::Media(_) => SourceKind::Media,
        }
    }
}

/// Canonical request handed to the instruction builder and the engine.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Declared sport (hint only).
    pub sport: SportTag,
    /// Requested explanation depth.
    pub persona: PersonaTag,
    /// The single populated source.
    pub source: SourcePayload,
    /// Fingerprint of the source: the link verbatim or the file name.
    pub source_key: String,
    /// Previously confirmed event for the same source.
    pub identification_hint: Option<String>,
}

impl AnalysisRequest {
    pub fn source_kind(&self) -> SourceKind {
        self.source.kind()
    }
}
