//! Configuration system
//!
//! Three levels of control:
//! - Level 1: Preset - one-liner defaults
//! - Level 2: Stage override - closures over one stage config
//! - Level 3: YAML - complete control, schema v1
//!
//! # Examples
//!
//! ```rust,ignore
//! use parallel_dg::config::{EngineConfig, Preset};
//!
//! let config = EngineConfig::preset(Preset::Fast).build()?;
//!
//! let config = EngineConfig::preset(Preset::Balanced)
//!     .partition(|c| c.min_partitions(2))
//!     .cost(|c| c.queue_latency(40))
//!     .build()?;
//!
//! let config = EngineConfig::from_yaml("pipeline.yaml")?;
//! ```

pub mod engine_config;
pub mod error;
pub mod io;
pub mod preset;
pub mod stage_configs;
pub mod validation;

// Re-exports
pub use engine_config::EngineConfig;
pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigExportV1, ConfigOverrides};
pub use preset::Preset;
pub use stage_configs::{ClassifierConfig, CostConfig, PartitionConfig, PdgConfig};
pub use validation::{CrossStageValidator, Validatable};
