use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Requested explanation depth.
///
/// Drives tone only; the response schema is the same for every persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaTag {
    Beginner,
    NewFan,
    Hardcore,
    Coach,
}

impl PersonaTag {
    pub const ALL: [PersonaTag; 4] = [
        PersonaTag::Beginner,
        PersonaTag::NewFan,
        PersonaTag::Hardcore,
        PersonaTag::Coach,
    ];

    /// Wire tag (`new_fan`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaTag::Beginner => "beginner",
            PersonaTag::NewFan => "new_fan",
            PersonaTag::Hardcore => "hardcore",
            PersonaTag::Coach => "coach",
        }
    }

    /// Picker label.
    pub fn label(&self) -> &'static str {
        match self {
            PersonaTag::Beginner => "Beginner",
            PersonaTag::NewFan => "New Fan",
            PersonaTag::Hardcore => "Hardcore",
            PersonaTag::Coach => "Coach",
        }
    }

    /// One-line picker description.
    pub fn description(&self) -> &'static str {
        match self {
            PersonaTag::Beginner => "No jargon, just basics",
            PersonaTag::NewFan => "Contextual rules",
            PersonaTag::Hardcore => "Stats & historical weight",
            PersonaTag::Coach => "Technique & strategy",
        }
    }
}

impl fmt::Display for PersonaTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersonaTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        PersonaTag::ALL
            .into_iter()
            .find(|persona| persona.as_str() == tag)
            .ok_or_else(|| Error::UnsupportedPersona(s.trim().to_string()))
    }
}
