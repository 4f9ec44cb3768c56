use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A practice module: a family of skills with its own rule tables and
/// token rates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum SkillModule {
    MathFacts,
    Ratios,
    Fractions,
    DecimalDefender,
}

impl SkillModule {
    pub const ALL: [SkillModule; 4] = [
        SkillModule::MathFacts,
        SkillModule::Ratios,
        SkillModule::Fractions,
        SkillModule::DecimalDefender,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillModule::MathFacts => "math-facts",
            SkillModule::Ratios => "ratios",
            SkillModule::Fractions => "fractions",
            SkillModule::DecimalDefender => "decimal-defender",
        }
    }
}

impl fmt::Display for SkillModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unrecognized module: {0}")]
pub struct ParseModuleError(pub String);

impl FromStr for SkillModule {
    type Err = ParseModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "math-facts" => Ok(SkillModule::MathFacts),
            "ratios" => Ok(SkillModule::Ratios),
            "fractions" => Ok(SkillModule::Fractions),
            "decimal-defender" => Ok(SkillModule::DecimalDefender),
            other => Err(ParseModuleError(other.to_string())),
        }
    }
}
