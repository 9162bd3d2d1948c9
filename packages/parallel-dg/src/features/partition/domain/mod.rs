//! Partition models

use crate::features::sccdag::SccId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Partition handle; a merge keeps the smallest id of the merged set
pub type PartitionId = usize;

/// SCCs assigned to one work unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub id: PartitionId,
    pub sccs: BTreeSet<SccId>,
}

impl Partition {
    pub fn new(id: PartitionId, sccs: BTreeSet<SccId>) -> Self {
        Self { id, sccs }
    }

    pub fn contains(&self, scc: SccId) -> bool {
        self.sccs.contains(&scc)
    }

    pub fn len(&self) -> usize {
        self.sccs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sccs.is_empty()
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sccs: Vec<String> = self.sccs.iter().map(|s| s.index().to_string()).collect();
        write!(f, "P{}{{{}}}", self.id, sccs.join(","))
    }
}

/// One emitted partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSummary {
    pub id: PartitionId,
    /// SCCDAG node indices
    pub sccs: Vec<usize>,
    /// Clonable SCCs replicated into this partition
    pub replicated: Vec<usize>,
    /// Internal cost, replicated SCCs included
    pub cost: u64,
    pub instruction_count: usize,
}

/// Final result of partitioning, in dependence (depth) order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionPlan {
    pub partitions: Vec<PartitionSummary>,
    /// Latency of all partitions running together
    pub total_latency: u64,
    pub initial_partitions: usize,
    pub memory_merges: usize,
    pub cost_merges: usize,
}

impl PartitionPlan {
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn merges(&self) -> usize {
        self.memory_merges + self.cost_merges
    }

    /// Partition holding the SCCDAG node `scc`
    pub fn partition_of(&self, scc: SccId) -> Option<&PartitionSummary> {
        self.partitions.iter().find(|p| p.sccs.contains(&scc.index()))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
