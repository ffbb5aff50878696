//! Grounding source extraction.

use std::collections::HashSet;

use fanplay_core::types::{EvidenceCitation, GroundingChunk};

/// Title used when the engine cites a page without one.
pub const DEFAULT_SOURCE_TITLE: &str = "Source";

/// Collect web citations from grounding chunks.
///
/// Keeps engine order, drops non-web chunks and chunks without a URL,
/// and keeps only the first citation of each URL. Returns `None` when
/// nothing is left. Display truncation is up to the caller.
pub fn extract_sources(chunks: Option<&[GroundingChunk]>) -> Option<Vec<EvidenceCitation>> {
    let mut seen = HashSet::new();

    let sources: Vec<EvidenceCitation> = chunks?
        .iter()
        .filter_map(|chunk| chunk.web.as_ref())
        .filter_map(|web| {
            let url = web.uri.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
            let title = web
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_SOURCE_TITLE);
            Some(EvidenceCitation {
                title: title.to_string(),
                url: url.to_string(),
            })
        })
        .filter(|citation| seen.insert(citation.url.clone()))
        .collect();

    (!sources.is_empty()).then_some(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation(title: &str, url: &str) -> EvidenceCitation {
        EvidenceCitation {
            title: title.into(),
            url: url.into(),
        }
    }

    #[test]
    fn test_drops_non_web_and_defaults_title() {
        let chunks = vec![
            GroundingChunk::web(Some("A"), Some("u1")),
            GroundingChunk::default(),
            GroundingChunk::web(None, Some("u2")),
        ];

        assert_eq!(
            extract_sources(Some(&chunks)),
            Some(vec![citation("A", "u1"), citation("Source", "u2")])
        );
    }

    #[test]
    fn test_absent_or_empty_is_none() {
        assert_eq!(extract_sources(None), None);
        assert_eq!(extract_sources(Some(&[])), None);
        let only_bad = vec![GroundingChunk::web(Some("No link"), None), GroundingChunk::default()];
        assert_eq!(extract_sources(Some(&only_bad)), None);
    }

    #[test]
    fn test_duplicate_urls_keep_first() {
        let chunks = vec![
            GroundingChunk::web(Some("First"), Some("https://a")),
            GroundingChunk::web(Some("B"), Some("https://b")),
            GroundingChunk::web(Some("Again"), Some("https://a")),
        ];
        assert_eq!(
            extract_sources(Some(&chunks)),
            Some(vec![citation("First", "https://a"), citation("B", "https://b")])
        );
    }

    #[test]
    fn test_blank_title_defaults() {
        let chunks = vec![GroundingChunk::web(Some("  "), Some("https://x"))];
        assert_eq!(
            extract_sources(Some(&chunks)),
            Some(vec![citation("Source", "https://x")])
        );
    }
}
