//! Configuration validation
//!
//! Per-stage configs implement [`Validatable`]; [`CrossStageValidator`]
//! checks combinations no single stage can see.

use super::engine_config::EngineConfig;
use super::error::{ConfigError, ConfigResult};

/// Trait for validatable configuration objects
pub trait Validatable {
    /// Validate the configuration
    ///
    /// Returns `Ok(())` if valid, `Err(ConfigError)` with details if invalid.
    fn validate(&self) -> ConfigResult<()>;

    /// Get the configuration name for error messages
    fn config_name(&self) -> &'static str {
        "Config"
    }
}

/// Cross-stage validator
pub struct CrossStageValidator;

impl CrossStageValidator {
    /// Validate settings that span stages
    pub fn validate(config: &EngineConfig) -> ConfigResult<()> {
        // A must-alias memory edge between partitions needs synchronization the
        // code generators never emit, so the memory pass cannot be dropped
        // while the PDG still carries memory edges.
        if config.pdg.include_memory && !config.partition.merge_memory_edges {
            return Err(ConfigError::CrossStageConflict {
                issue: "memory dependences are built but the memory merge pass is disabled"
                    .to_string(),
                fix: "set partition.merge_memory_edges=true or pdg.include_memory=false"
                    .to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;

    #[test]
    fn test_cross_stage_default_is_consistent() {
        let config = EngineConfig::preset(Preset::Balanced);
        assert!(CrossStageValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_cross_stage_memory_conflict() {
        let config = EngineConfig::preset(Preset::Balanced).partition(|c| c.merge_memory_edges(false));
        let err = CrossStageValidator::validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::CrossStageConflict { .. }));

        let config = config.pdg(|c| c.include_memory(false));
        assert!(CrossStageValidator::validate(&config).is_ok());
    }
}
