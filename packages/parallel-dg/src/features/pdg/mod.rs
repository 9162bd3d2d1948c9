//! Program Dependence Graph
//!
//! Instruction-level dependence graph of one region, built from use-def,
//! alias and control-dependence oracles.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::PdgOracles;
pub use domain::PdgStats;
pub use infrastructure::{PdgBuilder, PdgDto, ProgramDependenceGraph};
pub use ports::{AliasOracle, AliasResult, ControlDependenceOracle, ModRefInfo, UseDefOracle};
