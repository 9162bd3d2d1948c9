//! Preset configurations
//!
//! Presets provide complete default configurations for common use cases.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Quick feedback while iterating on a loop
    ///
    /// - PDG: up to 5k nodes
    /// - Classifier: no memory-cloning proofs
    /// - Partitioner: 64 merge iterations, no deep SCCDAG verification
    Fast,

    /// Default compilation setting
    ///
    /// - PDG: up to 50k nodes
    /// - Classifier: memory-cloning proofs when an iteration oracle exists
    /// - Partitioner: 1024 merge iterations
    #[default]
    Balanced,

    /// Large regions, exhaustive merging
    ///
    /// - PDG: up to 500k nodes
    /// - Partitioner: 100k merge iterations
    Thorough,

    /// Custom: User-defined (YAML only)
    ///
    /// Starts from balanced defaults.
    Custom,
}

impl Preset {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Thorough => "thorough",
            Self::Custom => "custom",
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "thorough" => Ok(Self::Thorough),
            "custom" => Ok(Self::Custom),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
