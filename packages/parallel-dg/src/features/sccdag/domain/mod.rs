//! SCCDAG domain models

mod scc;

pub use scc::{Boundary, Scc};

use crate::features::dg::{Certainty, DependenceKinds, NodeId};
use crate::shared::models::InstId;
use serde::{Deserialize, Serialize};

/// Component handle: a node of the SCCDAG
pub type SccId = NodeId;

/// SCCDAG summary counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SccDagStats {
    pub scc_count: usize,
    pub edge_count: usize,
    pub cyclic_sccs: usize,
    pub largest_scc: usize,
    pub sub_edges: usize,
    pub must_edges: usize,
    pub may_edges: usize,
}

/// Serializable component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SccDto {
    pub id: usize,
    pub instructions: Vec<InstId>,
    pub has_cycle: bool,
}

/// Serializable component-level edge; sub-edges by instruction endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SccEdgeDto {
    pub from: usize,
    pub to: usize,
    pub kinds: DependenceKinds,
    pub certainty: Certainty,
    pub loop_carried: bool,
    pub sub_edges: Vec<(InstId, InstId)>,
}

/// Serializable DTO for SccDag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SccDagDto {
    pub region: String,
    pub sccs: Vec<SccDto>,
    pub edges: Vec<SccEdgeDto>,
}
