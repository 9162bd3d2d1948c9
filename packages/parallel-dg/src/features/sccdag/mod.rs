//! SCCDAG
//!
//! Condensation of a PDG into its strongly connected components. Component
//! edges summarize the PDG edges crossing between them.

pub mod domain;
pub mod infrastructure;

pub use domain::{Boundary, Scc, SccDagDto, SccDagStats, SccId};
pub use infrastructure::{SccDag, SccFinder};
