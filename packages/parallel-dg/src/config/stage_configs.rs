//! Stage-specific configurations
//!
//! One struct per engine stage. Each has:
//! - `from_preset()` defaults
//! - builder setters
//! - `validate()` range checks

use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use super::validation::Validatable;
use serde::{Deserialize, Serialize};

// ============================================================================
// PDG Construction
// ============================================================================

/// PDG construction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdgConfig {
    /// Include control dependencies (default: true)
    pub include_control: bool,

    /// Include data (use-def) dependencies (default: true)
    pub include_data: bool,

    /// Include memory dependencies from alias queries (default: true)
    pub include_memory: bool,

    /// Add backward loop-carried memory edges in loop regions (default: true)
    pub loop_carried_memory: bool,

    /// Maximum PDG nodes per region (1..=1000000)
    pub max_nodes: usize,
}

impl PdgConfig {
    /// Builder: Set include_control
    pub fn include_control(mut self, v: bool) -> Self {
        self.include_control = v;
        self
    }

    /// Builder: Set include_data
    pub fn include_data(mut self, v: bool) -> Self {
        self.include_data = v;
        self
    }

    /// Builder: Set include_memory
    pub fn include_memory(mut self, v: bool) -> Self {
        self.include_memory = v;
        self
    }

    /// Builder: Set loop_carried_memory
    pub fn loop_carried_memory(mut self, v: bool) -> Self {
        self.loop_carried_memory = v;
        self
    }

    /// Builder: Set max_nodes
    pub fn max_nodes(mut self, v: usize) -> Self {
        self.max_nodes = v;
        self
    }

    /// Create from preset
    pub fn from_preset(preset: Preset) -> Self {
        let max_nodes = match preset {
            Preset::Fast => 5_000,
            Preset::Balanced | Preset::Custom => 50_000,
            Preset::Thorough => 500_000,
        };
        Self {
            include_control: true,
            include_data: true,
            include_memory: true,
            loop_carried_memory: true,
            max_nodes,
        }
    }
}

impl Default for PdgConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

impl Validatable for PdgConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_nodes == 0 || self.max_nodes > 1_000_000 {
            return Err(ConfigError::range_with_hint(
                "max_nodes",
                self.max_nodes,
                1,
                1_000_000,
                "PDG node limit must be reasonable",
            ));
        }
        if !(self.include_control || self.include_data || self.include_memory) {
            return Err(ConfigError::Validation(
                "PDG must include at least one dependence kind".to_string(),
            ));
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "pdg"
    }
}

// ============================================================================
// SCC Classification
// ============================================================================

/// Component classifier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Treat floating-point arithmetic as real (associative), enabling
    /// fadd/fmul reductions (default: false)
    pub float_as_real: bool,

    /// Accept SCCs whose memory accesses are disjoint across iterations as
    /// clonable (default: true)
    pub memory_cloning: bool,
}

impl ClassifierConfig {
    /// Builder: Set float_as_real
    pub fn float_as_real(mut self, v: bool) -> Self {
        self.float_as_real = v;
        self
    }

    /// Builder: Set memory_cloning
    pub fn memory_cloning(mut self, v: bool) -> Self {
        self.memory_cloning = v;
        self
    }

    /// Create from preset
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            float_as_real: false,
            memory_cloning: !matches!(preset, Preset::Fast),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

impl Validatable for ClassifierConfig {
    fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "classifier"
    }
}

// ============================================================================
// Cost Model
// ============================================================================

/// Fallback latencies used when no profile is available
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Load / store latency (default: 10)
    pub memory_latency: u64,

    /// Branch / return latency (default: 5)
    pub terminator_latency: u64,

    /// Any other non-sugar instruction (default: 1)
    pub default_latency: u64,

    /// Call to a body that cannot be resolved (default: 50)
    pub unknown_callee_latency: u64,

    /// Enqueue + dequeue of one value crossing partitions (default: 100)
    pub queue_latency: u64,
}

const MAX_LATENCY: u64 = 1_000_000;

impl CostConfig {
    /// Builder: Set memory_latency
    pub fn memory_latency(mut self, v: u64) -> Self {
        self.memory_latency = v;
        self
    }

    /// Builder: Set terminator_latency
    pub fn terminator_latency(mut self, v: u64) -> Self {
        self.terminator_latency = v;
        self
    }

    /// Builder: Set default_latency
    pub fn default_latency(mut self, v: u64) -> Self {
        self.default_latency = v;
        self
    }

    /// Builder: Set unknown_callee_latency
    pub fn unknown_callee_latency(mut self, v: u64) -> Self {
        self.unknown_callee_latency = v;
        self
    }

    /// Builder: Set queue_latency
    pub fn queue_latency(mut self, v: u64) -> Self {
        self.queue_latency = v;
        self
    }

    /// Create from preset (latencies do not depend on the preset)
    pub fn from_preset(_preset: Preset) -> Self {
        Self {
            memory_latency: 10,
            terminator_latency: 5,
            default_latency: 1,
            unknown_callee_latency: 50,
            queue_latency: 100,
        }
    }
}

impl Default for CostConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

impl Validatable for CostConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.default_latency == 0 || self.default_latency > MAX_LATENCY {
            return Err(ConfigError::range_with_hint(
                "default_latency",
                self.default_latency,
                1,
                MAX_LATENCY,
                "Every non-sugar instruction costs at least one cycle",
            ));
        }
        for (field, value) in [
            ("memory_latency", self.memory_latency),
            ("terminator_latency", self.terminator_latency),
            ("unknown_callee_latency", self.unknown_callee_latency),
            ("queue_latency", self.queue_latency),
        ] {
            if value > MAX_LATENCY {
                return Err(ConfigError::range_with_hint(
                    field,
                    value,
                    0,
                    MAX_LATENCY,
                    "Latency constants are cycle estimates",
                ));
            }
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "cost"
    }
}

// ============================================================================
// Partitioner
// ============================================================================

/// Partitioner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionConfig {
    /// Stop cost-guided merging at this many partitions (default: 1)
    pub min_partitions: usize,

    /// Run the merge-along-must-memory-edges pass (default: true)
    pub merge_memory_edges: bool,

    /// Run the cost-guided merge pass (default: true)
    pub cost_guided: bool,

    /// Upper bound on merges per pass (1..=1000000)
    pub max_iterations: usize,
}

impl PartitionConfig {
    /// Builder: Set min_partitions
    pub fn min_partitions(mut self, v: usize) -> Self {
        self.min_partitions = v;
        self
    }

    /// Builder: Set merge_memory_edges
    pub fn merge_memory_edges(mut self, v: bool) -> Self {
        self.merge_memory_edges = v;
        self
    }

    /// Builder: Set cost_guided
    pub fn cost_guided(mut self, v: bool) -> Self {
        self.cost_guided = v;
        self
    }

    /// Builder: Set max_iterations
    pub fn max_iterations(mut self, v: usize) -> Self {
        self.max_iterations = v;
        self
    }

    /// Create from preset
    pub fn from_preset(preset: Preset) -> Self {
        let max_iterations = match preset {
            Preset::Fast => 64,
            Preset::Balanced | Preset::Custom => 1024,
            Preset::Thorough => 100_000,
        };
        Self {
            min_partitions: 1,
            merge_memory_edges: true,
            cost_guided: true,
            max_iterations,
        }
    }
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

impl Validatable for PartitionConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.min_partitions == 0 {
            return Err(ConfigError::range_with_hint(
                "min_partitions",
                self.min_partitions,
                1,
                usize::MAX,
                "At least one partition always remains",
            ));
        }
        if self.max_iterations == 0 || self.max_iterations > 1_000_000 {
            return Err(ConfigError::range_with_hint(
                "max_iterations",
                self.max_iterations,
                1,
                1_000_000,
                "Merge loop needs a finite positive bound",
            ));
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "partition"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdg_config_presets() {
        assert_eq!(PdgConfig::from_preset(Preset::Fast).max_nodes, 5_000);
        assert_eq!(PdgConfig::from_preset(Preset::Thorough).max_nodes, 500_000);
        assert!(PdgConfig::default().loop_carried_memory);
    }

    #[test]
    fn test_pdg_config_validation() {
        assert!(PdgConfig::default().validate().is_ok());
        assert!(PdgConfig::default().max_nodes(0).validate().is_err());

        let nothing = PdgConfig::default()
            .include_control(false)
            .include_data(false)
            .include_memory(false);
        assert!(matches!(nothing.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_classifier_presets() {
        assert!(!ClassifierConfig::from_preset(Preset::Fast).memory_cloning);
        assert!(ClassifierConfig::default().memory_cloning);
        assert!(!ClassifierConfig::default().float_as_real);
    }

    #[test]
    fn test_cost_config_defaults() {
        let cost = CostConfig::default();
        assert_eq!(cost.memory_latency, 10);
        assert_eq!(cost.terminator_latency, 5);
        assert_eq!(cost.default_latency, 1);
        assert_eq!(cost.unknown_callee_latency, 50);
        assert_eq!(cost.queue_latency, 100);
        assert!(cost.validate().is_ok());
    }

    #[test]
    fn test_cost_config_validation() {
        assert!(CostConfig::default().default_latency(0).validate().is_err());
        let err = CostConfig::default()
            .queue_latency(MAX_LATENCY + 1)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("queue_latency"));
    }

    #[test]
    fn test_partition_config_validation() {
        assert!(PartitionConfig::default().validate().is_ok());
        assert!(PartitionConfig::default().min_partitions(0).validate().is_err());
        assert!(PartitionConfig::default().max_iterations(0).validate().is_err());
        assert_eq!(PartitionConfig::from_preset(Preset::Fast).max_iterations, 64);
    }
}
