//! Feature modules (vertical slices)
//!
//! Each feature follows the hexagonal layout used across the crate:
//! - `domain/`: types and pure logic
//! - `ports/`: traits for external collaborators (oracles)
//! - `application/`: the use case driving the feature
//! - `infrastructure/`: algorithms and concrete adapters
//!
//! Leaf-first: `dg` → `pdg` → `sccdag` → `scc_attrs` → `partition`.

pub mod dg;
pub mod partition;
pub mod pdg;
pub mod scc_attrs;
pub mod sccdag;
