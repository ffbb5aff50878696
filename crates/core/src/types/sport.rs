use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Declared sport of a clip.
///
/// Only a hint: the engine may pivot to a different sport when the evidence
/// disagrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SportTag {
    AmericanFootball,
    Basketball,
    Soccer,
    Tennis,
}

impl SportTag {
    /// Every sport offered by the picker, in display order.
    pub const ALL: [SportTag; 4] = [
        SportTag::AmericanFootball,
        SportTag::Basketball,
        SportTag::Soccer,
        SportTag::Tennis,
    ];

    /// Human-readable name, as used inside instructions.
    pub fn display_name(&self) -> &'static str {
        match self {
            SportTag::AmericanFootball => "American Football",
            SportTag::Basketball => "Basketball",
            SportTag::Soccer => "Soccer",
            SportTag::Tennis => "Tennis",
        }
    }
}

impl fmt::Display for SportTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for SportTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        SportTag::ALL
            .into_iter()
            .find(|sport| sport.display_name().to_lowercase() == normalized)
            .ok_or_else(|| Error::invalid_input(format!("Unsupported sport: {}", s.trim())))
    }
}
