//! Response validation and drift correction.

use serde::Deserialize;

use fanplay_core::{types::Narrative, Error, Result};

use crate::instruction::{MAX_RULES, MIN_RULES};

/// Guide parsed from engine output, before sources are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedGuide {
    pub identified_event: String,
    pub foundational_rules: Vec<String>,
    pub narrative: Narrative,
    /// The engine drifted away from the hint and was overridden.
    pub drift_corrected: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGuide {
    #[serde(default, alias = "identifiedGame")]
    identified_event: Option<String>,
    #[serde(default, alias = "basicRules")]
    foundational_rules: Option<Vec<String>>,
    #[serde(default)]
    what_happened: Option<String>,
    #[serde(default, alias = "whyReacted")]
    why_it_matters: Option<String>,
    #[serde(default, alias = "nextSteps")]
    what_happens_next: Option<String>,
}

/// Strip a surrounding Markdown code fence, if any.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening line.
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn required(field: &str, value: Option<String>) -> Result<String> {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
    if value.is_empty() {
        return Err(Error::malformed(format!("missing or empty field '{}'", field)));
    }
    Ok(value)
}

/// Parse and check raw engine output against the fixed schema.
///
/// When `hint` is given and the identified event does not contain it
/// (case-insensitive), the event is replaced by the hint verbatim.
pub fn validate(raw: &str, hint: Option<&str>) -> Result<ValidatedGuide> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(Error::malformed("engine returned no content"));
    }

    let parsed: RawGuide = serde_json::from_str(body)
        .map_err(|e| Error::malformed(format!("response is not schema JSON: {}", e)))?;

    let mut identified_event = required("identifiedEvent", parsed.identified_event)?;

    let rules: Vec<String> = parsed
        .foundational_rules
        .ok_or_else(|| Error::malformed("missing field 'foundationalRules'"))?
        .into_iter()
        .map(|r| r.trim().to_string())
        .collect();
    if rules.iter().any(|r| r.is_empty()) {
        return Err(Error::malformed("empty foundational rule"));
    }
    if !(MIN_RULES..=MAX_RULES).contains(&rules.len()) {
        return Err(Error::malformed(format!(
            "expected {}-{} foundational rules, got {}",
            MIN_RULES,
            MAX_RULES,
            rules.len()
        )));
    }

    let narrative = Narrative {
        what_happened: required("whatHappened", parsed.what_happened)?,
        why_it_matters: required("whyItMatters", parsed.why_it_matters)?,
        what_happens_next: required("whatHappensNext", parsed.what_happens_next)?,
    };

    let mut drift_corrected = false;
    if let Some(hint) = hint.map(str::trim).filter(|h| !h.is_empty()) {
        if !identified_event.to_lowercase().contains(&hint.to_lowercase()) {
            tracing::warn!(
                engine_event = %identified_event,
                hint = %hint,
                "Identification drifted from confirmed event, overriding"
            );
            identified_event = hint.to_string();
            drift_corrected = true;
        }
    }

    Ok(ValidatedGuide {
        identified_event,
        foundational_rules: rules,
        narrative,
        drift_corrected,
    })
}
