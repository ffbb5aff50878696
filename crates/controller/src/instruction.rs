//! Persona instruction building.
//!
//! Produces the system instruction, the fixed response schema and the
//! ordered content parts for one analysis.

use base64::Engine as _;
use serde_json::{json, Value};

use fanplay_core::types::{AnalysisRequest, ContentPart, PersonaTag, SourcePayload, SportTag};

use crate::normalizer::video_identifier;

/// MIME type requested from the engine.
pub const RESPONSE_MIME_TYPE: &str = "application/json";

/// Minimum number of foundational rules.
pub const MIN_RULES: usize = 3;
/// Maximum number of foundational rules.
pub const MAX_RULES: usize = 5;

/// Tone directive for a persona.
fn persona_directive(persona: PersonaTag) -> &'static str {
    match persona {
        PersonaTag::Beginner => {
            "Assume ZERO prior knowledge. Use simple language and everyday analogies \
             (e.g. 'it's like tag'). No jargon at all."
        }
        PersonaTag::NewFan => {
            "Use standard terminology but explain each term briefly. Focus on why this \
             play matters in a typical game."
        }
        PersonaTag::Hardcore => {
            "Lead with player statistics, historical context, team rivalries and the \
             specific stakes for the season."
        }
        PersonaTag::Coach => {
            "Analyze technical execution, formations, biomechanics and strategic \
             decision-making."
        }
    }
}

/// Build the system instruction.
pub fn build_instruction(persona: PersonaTag, sport: SportTag, hint: Option<&str>) -> String {
    let role = persona.as_str().replace('_', " ");

    let identification = match hint {
        Some(event) => format!(
            "IDENTIFICATION (ALREADY CONFIRMED):\n\
             The event has already been verified as: \"{event}\".\n\
             Stay on this exact event. Set identifiedEvent to \"{event}\". \
             Reuse the facts already established for it; do not search for a \
             different match from scratch."
        ),
        None => "IDENTIFICATION (REQUIRED):\n\
             Determine the exact event: competition, date and participants. \
             Use search and visual evidence to verify it. Do not trust the declared \
             sport or any caption on its own."
            .to_string(),
    };

    format!(
        "You are a world-class AI Sports Analyst explaining a moment to a {role}.\n\
         \n\
         DECLARED SPORT: {sport} (a hint, not a fact).\n\
         \n\
         {identification}\n\
         \n\
         OVERRIDE RULE:\n\
         If verified evidence contradicts the declared sport, silently pivot to the \
         sport the evidence supports and explain the correction in whatHappened. \
         Never refuse or fail because of a sport mismatch.\n\
         \n\
         TASK:\n\
         1. Identify the specific event (teams or players, competition, year).\n\
         2. Provide {MIN_RULES}-{MAX_RULES} foundational rules of the sport in general.\n\
         3. Analyze the specific moment provided.\n\
         \n\
         PERSONA RULES ({persona_upper}):\n\
         {directive}\n\
         \n\
         OUTPUT FORMAT (JSON ONLY):\n\
         {{\n  \
           \"identifiedEvent\": \"Specific match title (e.g. 2024 Super Bowl - Chiefs vs 49ers)\",\n  \
           \"foundationalRules\": [\"Rule 1: brief explanation\", \"Rule 2...\", \"Rule 3...\"],\n  \
           \"whatHappened\": \"The core analysis for this persona.\",\n  \
           \"whyItMatters\": \"Why the crowd and players react the way they do.\",\n  \
           \"whatHappensNext\": \"What happens next in this match or situation.\"\n\
         }}",
        sport = sport.display_name(),
        persona_upper = persona.as_str().to_uppercase(),
        directive = persona_directive(persona),
    )
}

/// Fixed response schema: five required fields, rules hold 3-5 strings.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "identifiedEvent": { "type": "STRING" },
            "foundationalRules": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "minItems": MIN_RULES,
                "maxItems": MAX_RULES
            },
            "whatHappened": { "type": "STRING" },
            "whyItMatters": { "type": "STRING" },
            "whatHappensNext": { "type": "STRING" }
        },
        "required": [
            "identifiedEvent",
            "foundationalRules",
            "whatHappened",
            "whyItMatters",
            "whatHappensNext"
        ]
    })
}

/// Ordered content parts for the request.
pub fn build_contents(request: &AnalysisRequest) -> Vec<ContentPart> {
    let sport = request.sport.display_name();

    match &request.source {
        SourcePayload::Url(link) => {
            let video = video_identifier(link)
                .map(|id| format!(" The video identifier is \"{}\".", id))
                .unwrap_or_default();

            vec![ContentPart::text(format!(
                "Analyze this {sport} moment from: {link}.{video} \
                 Resolve the link to the exact broadcast or highlight and cross-reference \
                 it with public play-by-play records and match reports."
            ))]
        }
        SourcePayload::Media(media) => {
            let data = base64::engine::general_purpose::STANDARD.encode(&media.data);
            let persona = request.persona.as_str().replace('_', " ");

            vec![
                ContentPart::inline_media(media.mime_type.clone(), data),
                ContentPart::text(format!(
                    "Analyze this {sport} visual for a {persona}. Identify gear, team kits, \
                     logos, venue and scoreboard markers, then cross-reference them to find \
                     the most likely match."
                )),
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanplay_core::types::MediaFile;

    fn url_request(link: &str) -> AnalysisRequest {
        AnalysisRequest {
            sport: SportTag::Tennis,
            persona: PersonaTag::Beginner,
            source: SourcePayload::Url(link.to_string()),
            source_key: link.to_string(),
            identification_hint: None,
        }
    }

    #[test]
    fn test_each_persona_has_distinct_directive() {
        let directives: std::collections::HashSet<_> =
            PersonaTag::ALL.iter().map(|p| persona_directive(*p)).collect();
        assert_eq!(directives.len(), PersonaTag::ALL.len());
    }

    #[test]
    fn test_instruction_without_hint_requires_identification() {
        let text = build_instruction(PersonaTag::Beginner, SportTag::Tennis, None);
        assert!(text.contains("Determine the exact event"));
        assert!(text.contains("competition, date and participants"));
        assert!(text.contains("OVERRIDE RULE"));
        assert!(text.contains("ZERO prior knowledge"));
        assert!(!text.contains("ALREADY CONFIRMED"));
    }

    #[test]
    fn test_instruction_with_hint_anchors_event() {
        let text = build_instruction(
            PersonaTag::Hardcore,
            SportTag::Tennis,
            Some("2008 Final: A vs B"),
        );
        assert!(text.contains("ALREADY CONFIRMED"));
        assert!(text.contains("\"2008 Final: A vs B\""));
        assert!(text.contains("do not search for a different match"));
        assert!(text.contains("OVERRIDE RULE"));
        assert!(text.contains("PERSONA RULES (HARDCORE)"));
    }

    #[test]
    fn test_schema_requires_five_fields() {
        let schema = response_schema();
        assert_eq!(schema["required"].as_array().unwrap().len(), 5);
        assert_eq!(schema["properties"]["foundationalRules"]["minItems"], 3);
        assert_eq!(schema["properties"]["foundationalRules"]["maxItems"], 5);
    }

    #[test]
    fn test_url_contents_include_video_identifier() {
        let parts = build_contents(&url_request("https://example.com/watch?v=abc123"));
        assert_eq!(parts.len(), 1);
        let text = parts[0].as_text().unwrap();
        assert!(text.contains("https://example.com/watch?v=abc123"));
        assert!(text.contains("\"abc123\""));
        assert!(text.contains("play-by-play"));
    }

    #[test]
    fn test_media_contents_inline_then_text() {
        let request = AnalysisRequest {
            sport: SportTag::Soccer,
            persona: PersonaTag::NewFan,
            source: SourcePayload::Media(MediaFile::new("kit.png", "image/png", vec![1u8, 2, 3])),
            source_key: "kit.png".into(),
            identification_hint: None,
        };

        let parts = build_contents(&request);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], ContentPart::inline_media("image/png", "AQID"));
        let text = parts[1].as_text().unwrap();
        assert!(text.contains("Soccer visual for a new fan"));
        assert!(text.contains("team kits"));
    }
}
