//! Classifier ports

use crate::shared::models::InstId;

/// Iteration-space facts about memory accesses
pub trait IterationDomainOracle {
    /// True if `a` in one iteration and `b` in any other iteration never
    /// touch the same memory. `a == b` asks about one access against itself.
    fn are_disjoint_across_iterations(&self, a: InstId, b: InstId) -> bool;
}
