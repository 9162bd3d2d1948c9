//! Engine configuration
//!
//! Main configuration struct with preset-based defaults and override support.

use super::{
    error::{ConfigError, ConfigResult},
    io::{ConfigExportV1, ConfigOverrides},
    preset::Preset,
    stage_configs::*,
    validation::{CrossStageValidator, Validatable},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

const SUPPORTED_VERSIONS: &[u32] = &[1];

/// Complete configuration of one analysis invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub preset: Preset,
    pub pdg: PdgConfig,
    pub classifier: ClassifierConfig,
    pub cost: CostConfig,
    pub partition: PartitionConfig,
    /// Re-verify SCCDAG structure (coverage, acyclicity, edge soundness)
    /// after condensation and every explicit merge
    pub verify_invariants: bool,
}

impl EngineConfig {
    /// Level 1: Preset defaults for every stage
    pub fn preset(preset: Preset) -> Self {
        Self {
            preset,
            pdg: PdgConfig::from_preset(preset),
            classifier: ClassifierConfig::from_preset(preset),
            cost: CostConfig::from_preset(preset),
            partition: PartitionConfig::from_preset(preset),
            verify_invariants: !matches!(preset, Preset::Fast),
        }
    }

    /// Level 2: Override PDG construction
    pub fn pdg<F>(mut self, f: F) -> Self
    where
        F: FnOnce(PdgConfig) -> PdgConfig,
    {
        self.pdg = f(self.pdg);
        self
    }

    /// Level 2: Override the classifier
    pub fn classifier<F>(mut self, f: F) -> Self
    where
        F: FnOnce(ClassifierConfig) -> ClassifierConfig,
    {
        self.classifier = f(self.classifier);
        self
    }

    /// Level 2: Override cost model latencies
    pub fn cost<F>(mut self, f: F) -> Self
    where
        F: FnOnce(CostConfig) -> CostConfig,
    {
        self.cost = f(self.cost);
        self
    }

    /// Level 2: Override the partitioner
    pub fn partition<F>(mut self, f: F) -> Self
    where
        F: FnOnce(PartitionConfig) -> PartitionConfig,
    {
        self.partition = f(self.partition);
        self
    }

    pub fn verify_invariants(mut self, v: bool) -> Self {
        self.verify_invariants = v;
        self
    }

    /// Validate every stage, then cross-stage consistency
    pub fn build(self) -> ConfigResult<Self> {
        self.validate()?;
        Ok(self)
    }

    /// Level 3: Load from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Level 3: Load from YAML text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let export: ConfigExportV1 = serde_yaml::from_str(content)?;

        let version = export.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let preset: Preset = export.preset.parse()?;
        let mut config = Self::preset(preset);

        if let Some(overrides) = export.overrides {
            if let Some(pdg) = overrides.pdg {
                config.pdg = pdg;
            }
            if let Some(classifier) = overrides.classifier {
                config.classifier = classifier;
            }
            if let Some(cost) = overrides.cost {
                config.cost = cost;
            }
            if let Some(partition) = overrides.partition {
                config.partition = partition;
            }
            if let Some(verify) = overrides.verify_invariants {
                config.verify_invariants = verify;
            }
        }

        tracing::debug!(preset = %config.preset, "loaded engine configuration from YAML");
        config.build()
    }

    /// Export as YAML schema v1 (every stage written as an override)
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: Some(1),
            preset: self.preset.to_string(),
            overrides: Some(ConfigOverrides {
                pdg: Some(self.pdg.clone()),
                classifier: Some(self.classifier.clone()),
                cost: Some(self.cost.clone()),
                partition: Some(self.partition.clone()),
                verify_invariants: Some(self.verify_invariants),
            }),
        };

        Ok(serde_yaml::to_string(&export)?)
    }

    /// Human-readable one-line summary
    pub fn describe(&self) -> String {
        format!(
            "preset={} max_nodes={} memory_cloning={} float_as_real={} min_partitions={} queue_latency={}",
            self.preset,
            self.pdg.max_nodes,
            self.classifier.memory_cloning,
            self.classifier.float_as_real,
            self.partition.min_partitions,
            self.cost.queue_latency,
        )
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::preset(Preset::Balanced)
    }
}

impl Validatable for EngineConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.pdg.validate()?;
        self.classifier.validate()?;
        self.cost.validate()?;
        self.partition.validate()?;
        CrossStageValidator::validate(self)
    }

    fn config_name(&self) -> &'static str {
        "engine"
    }
}
