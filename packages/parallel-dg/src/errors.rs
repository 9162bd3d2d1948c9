//! Error types for parallel-dg
//!
//! Configuration and caller errors are recoverable and flow through
//! [`EngineError`]. Structural bugs inside the engine are not errors: they are
//! reported through [`crate::shared::invariants`] and abort the analysis.

use crate::config::ConfigError;
use thiserror::Error;

/// Main error type for dependence-engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// An oracle the component needs was not supplied
    #[error("Configuration error: {oracle} oracle is unavailable")]
    MissingOracle { oracle: &'static str },

    /// The region exceeds the configured node budget
    #[error("Region '{region}' has {nodes} instructions, limit is {limit}")]
    RegionTooLarge {
        region: String,
        nodes: usize,
        limit: usize,
    },

    /// A component id that is not part of the SCCDAG
    #[error("Unknown SCCDAG component: {0}")]
    UnknownComponent(usize),

    /// Merge requested on fewer than two distinct components
    #[error("Invalid merge: {0}")]
    InvalidMerge(String),

    /// Merging the requested components would make the SCCDAG cyclic
    #[error("Merging components {components:?} would introduce a cycle through {through:?}")]
    MergeIntroducesCycle {
        components: Vec<usize>,
        through: Vec<usize>,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Create a missing-oracle error
    pub fn missing_oracle(oracle: &'static str) -> Self {
        EngineError::MissingOracle { oracle }
    }

    /// Create an invalid-merge error
    pub fn invalid_merge(msg: impl Into<String>) -> Self {
        EngineError::InvalidMerge(msg.into())
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
