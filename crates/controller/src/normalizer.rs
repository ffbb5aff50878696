//! Input normalization.
//!
//! Turns a link or an uploaded file into one canonical `AnalysisRequest`.

use fanplay_core::{
    types::{AnalysisRequest, PersonaTag, SourceInput, SourcePayload, SportTag},
    Error, Result,
};
use url::Url;

/// Normalize caller input.
///
/// A blank URL or an empty file counts as absent. When both are present
/// the URL wins. Fails with `InvalidInput` when no source remains.
pub fn normalize(
    sport: SportTag,
    persona: PersonaTag,
    input: SourceInput,
    identification_hint: Option<String>,
) -> Result<AnalysisRequest> {
    let url = input
        .url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());
    let media = input.media.filter(|m| !m.data.is_empty());

    let (source, source_key) = match (url, media) {
        (Some(url), _) => (SourcePayload::Url(url.clone()), url),
        (None, Some(media)) => {
            let key = media.name.clone();
            (SourcePayload::Media(media), key)
        }
        (None, None) => return Err(Error::missing_source()),
    };

    Ok(AnalysisRequest {
        sport,
        persona,
        source,
        source_key,
        identification_hint: identification_hint
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty()),
    })
}

/// Source key for raw input, without building a request.
pub fn source_key(input: &SourceInput) -> Option<String> {
    if let Some(url) = input.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        return Some(url.to_string());
    }
    input
        .media
        .as_ref()
        .filter(|m| !m.data.is_empty())
        .map(|m| m.name.clone())
}

/// Extract a video identifier from common highlight links.
///
/// Handles `?v=<id>`, `youtu.be/<id>`, `/shorts/<id>`, `/embed/<id>` and `/live/<id>`.
pub fn video_identifier(link: &str) -> Option<String> {
    let parsed = Url::parse(link.trim()).ok()?;

    if let Some((_, v)) = parsed.query_pairs().find(|(k, _)| k == "v") {
        if !v.is_empty() {
            return Some(v.into_owned());
        }
    }

    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());
    let host = parsed.host_str().unwrap_or_default();

    if host.ends_with("youtu.be") {
        return segments.next().map(str::to_string);
    }

    while let Some(segment) = segments.next() {
        if matches!(segment, "shorts" | "embed" | "live") {
            return segments.next().map(str::to_string);
        }
    }

    None
}
