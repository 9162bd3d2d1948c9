/*
 * Parallel DG - Dependence Graph Engine for Loop Parallelization
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : IR model (Instruction, Region, Module) + invariant checks
 * - features/    : Vertical slices (dg → pdg → sccdag → scc_attrs → partition)
 * - config/      : Presets, stage configs, YAML loading
 * - api          : The operations exposed to code-generation layers
 *
 * Data flow:
 *   Region ──build_pdg──▶ PDG ──condense──▶ SCCDAG ──classify──▶ SCCDAGAttrs
 *                                              │                      │
 *                                              └──────partition◀──────┘
 */

#![allow(clippy::upper_case_acronyms)] // PDG, SCC naming
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::module_inception)] // Module naming intentional

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
pub mod shared;

/// Feature modules (dg, pdg, sccdag, scc_attrs, partition)
pub mod features;

/// Configuration system
pub mod config;

/// Exposed operations (build_pdg, condense, classify, partition, merge_components)
pub mod api;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use api::{build_pdg, classify, condense, merge_components, partition, PdgOracles};
pub use config::{EngineConfig, Preset};
pub use errors::{EngineError, Result};
pub use features::dg::{Certainty, DataHazard, Dependence, DependenceGraph, DependenceKinds, EdgeId, NodeId};
pub use features::partition::{CostModel, Partition, PartitionId, PartitionPlan, Partitioner};
pub use features::pdg::ProgramDependenceGraph;
pub use features::scc_attrs::{ReductionOp, SccAttrs, SccClassifier, SccDagAttrs, SccKind};
pub use features::sccdag::{Scc, SccDag, SccId};
pub use shared::models::{Instruction, InstId, Module, Opcode, Operand, Region, RegionKind};
