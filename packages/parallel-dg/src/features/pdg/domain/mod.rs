//! PDG domain models

use serde::{Deserialize, Serialize};

/// PDG summary counts
///
/// An edge carrying several kinds counts once per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdgStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub control_edges: usize,
    pub data_edges: usize,
    pub memory_edges: usize,
    pub must_memory_edges: usize,
    pub may_memory_edges: usize,
    pub loop_carried_edges: usize,
}
