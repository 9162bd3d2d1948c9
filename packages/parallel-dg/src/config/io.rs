//! Configuration I/O
//!
//! YAML schema types. Loading and export live on [`super::EngineConfig`].

use super::stage_configs::{ClassifierConfig, CostConfig, PartitionConfig, PdgConfig};
use serde::{Deserialize, Serialize};

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigExportV1 {
    /// Schema version (always 1 for v1)
    #[serde(default)]
    pub version: Option<u32>,

    /// Base preset
    pub preset: String,

    /// Fine-grained overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<ConfigOverrides>,
}

/// Configuration overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdg: Option<PdgConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<ClassifierConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<CostConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<PartitionConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_invariants: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::error::ConfigError;
    use crate::config::{EngineConfig, Preset};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_yaml_roundtrip() {
        let config = EngineConfig::preset(Preset::Balanced).partition(|c| c.min_partitions(3));

        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("version: 1"));
        assert!(yaml.contains("preset: balanced"));
        assert!(yaml.contains("min_partitions: 3"));

        let loaded = EngineConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_yaml_loading() {
        let yaml_content = r#"
version: 1
preset: fast
overrides:
  cost:
    queue_latency: 40
  partition:
    min_partitions: 2
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml_content.as_bytes()).unwrap();

        let config = EngineConfig::from_yaml(temp_file.path()).unwrap();
        assert_eq!(config.preset, Preset::Fast);
        assert_eq!(config.cost.queue_latency, 40);
        assert_eq!(config.cost.memory_latency, 10);
        assert_eq!(config.partition.min_partitions, 2);
        // PDG untouched: keeps the fast preset
        assert_eq!(config.pdg.max_nodes, 5_000);
    }

    #[test]
    fn test_yaml_missing_version() {
        let result = EngineConfig::from_yaml_str("preset: fast\n");
        assert!(matches!(result, Err(ConfigError::MissingVersion)));
    }

    #[test]
    fn test_yaml_unsupported_version() {
        let result = EngineConfig::from_yaml_str("version: 2\npreset: fast\n");
        assert!(matches!(
            result,
            Err(ConfigError::UnsupportedVersion { found: 2, .. })
        ));
    }

    #[test]
    fn test_yaml_unknown_preset() {
        let result = EngineConfig::from_yaml_str("version: 1\npreset: turbo\n");
        assert!(matches!(result, Err(ConfigError::UnknownPreset(_))));
    }

    #[test]
    fn test_yaml_invalid_override_rejected() {
        let yaml = "version: 1\npreset: balanced\noverrides:\n  pdg:\n    max_nodes: 0\n";
        assert!(matches!(
            EngineConfig::from_yaml_str(yaml),
            Err(ConfigError::Range { .. })
        ));
    }

    #[test]
    fn test_yaml_unknown_field_rejected() {
        let yaml = "version: 1\npreset: balanced\noverrides:\n  scheduler: {}\n";
        assert!(matches!(
            EngineConfig::from_yaml_str(yaml),
            Err(ConfigError::Yaml(_))
        ));
    }
}
