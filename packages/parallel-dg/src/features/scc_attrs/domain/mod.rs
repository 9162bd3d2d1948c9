//! SCC classification models

use crate::features::dg::EdgeId;
use crate::features::sccdag::SccId;
use crate::shared::models::{BinaryOp, InstId, Operand};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reducing operator of an accumulator SCC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReductionOp {
    Add,
    Mul,
    Or,
    Xor,
    And,
}

impl ReductionOp {
    /// Reducing operator an accumulating instruction contributes to
    ///
    /// Subtraction accumulates with addition (`s - x == s + (-x)`).
    pub fn from_binary(op: BinaryOp) -> Option<Self> {
        match op {
            BinaryOp::Add | BinaryOp::FAdd | BinaryOp::Sub | BinaryOp::FSub => Some(ReductionOp::Add),
            BinaryOp::Mul | BinaryOp::FMul => Some(ReductionOp::Mul),
            BinaryOp::Or => Some(ReductionOp::Or),
            BinaryOp::Xor => Some(ReductionOp::Xor),
            BinaryOp::And => Some(ReductionOp::And),
            BinaryOp::SDiv | BinaryOp::UDiv | BinaryOp::Shl => None,
        }
    }

    /// Algebraic identity used to seed per-worker partial results
    pub fn identity(self) -> i64 {
        match self {
            ReductionOp::Add | ReductionOp::Or | ReductionOp::Xor => 0,
            // And reductions are only recognized on i1, where 1 is all-ones
            ReductionOp::Mul | ReductionOp::And => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReductionOp::Add => "add",
            ReductionOp::Mul => "mul",
            ReductionOp::Or => "or",
            ReductionOp::Xor => "xor",
            ReductionOp::And => "and",
        }
    }
}

impl fmt::Display for ReductionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution semantics of one SCC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SccKind {
    /// Carries a loop-carried dependence nothing else explains
    Sequential,
    /// Single accumulation pattern
    Reducible { op: ReductionOp, identity: i64 },
    /// Safe to replicate on every worker
    Clonable,
    /// No loop-carried dependence
    Independent,
}

impl SccKind {
    pub fn is_sequential(&self) -> bool {
        matches!(self, SccKind::Sequential)
    }

    pub fn is_reducible(&self) -> bool {
        matches!(self, SccKind::Reducible { .. })
    }

    pub fn is_clonable(&self) -> bool {
        matches!(self, SccKind::Clonable)
    }

    pub fn is_independent(&self) -> bool {
        matches!(self, SccKind::Independent)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SccKind::Sequential => "sequential",
            SccKind::Reducible { .. } => "reducible",
            SccKind::Clonable => "clonable",
            SccKind::Independent => "independent",
        }
    }
}

impl fmt::Display for SccKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SccKind::Reducible { op, identity } => write!(f, "reducible({}, {})", op, identity),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Accumulator recognized in a reducible SCC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionInfo {
    pub phi: InstId,
    /// Accumulating instructions, first to last
    pub accumulators: Vec<InstId>,
    /// Value entering the loop, if the phi has one
    pub initial: Option<Operand>,
    pub op: ReductionOp,
    pub identity: i64,
    pub floating_point: bool,
}

/// Phi stepped by a loop-invariant amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InductionVariable {
    pub phi: InstId,
    pub update: InstId,
    pub step: Operand,
    pub start: Option<Operand>,
}

/// Classification result of one SCC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SccAttrs {
    pub id: SccId,
    pub kind: SccKind,
    pub has_cycle: bool,
    /// Replicable on every worker, whatever `kind` is
    pub clonable: bool,
    pub induction_variable: Option<InductionVariable>,
    pub reduction: Option<ReductionInfo>,
    /// Every internal dependence goes through memory
    pub memory_only_cycle: bool,
    /// Internal loop-carried PDG edges left after disjointness pruning
    pub loop_carried_edges: Vec<EdgeId>,
}

impl SccAttrs {
    pub fn is_partitionable(&self) -> bool {
        !self.clonable
    }
}

/// Per-kind SCC counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationStats {
    pub independent: usize,
    pub reducible: usize,
    pub clonable: usize,
    pub sequential: usize,
    /// SCCs with the clonable flag, whatever their kind
    pub replicated: usize,
}
