use serde::{Deserialize, Serialize};

/// Three-part story of the moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Narrative {
    pub what_happened: String,
    pub why_it_matters: String,
    pub what_happens_next: String,
}

/// A web source cited by the engine. Never produced by FanPlay itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceCitation {
    pub title: String,
    pub url: String,
}

/// Final, validated explanation returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideResponse {
    /// Exact event, e.g. "2008 Wimbledon Final: Nadal vs Federer".
    pub identified_event: String,
    /// 3 to 5 general rules of the sport.
    pub foundational_rules: Vec<String>,
    pub narrative: Narrative,
    /// Grounding citations in engine order, absent when none were returned.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sources: Option<Vec<EvidenceCitation>>,
}
