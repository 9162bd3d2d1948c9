//! Built-in iteration-domain adapters

use crate::features::scc_attrs::ports::IterationDomainOracle;
use crate::shared::models::InstId;
use rustc_hash::FxHashSet;

/// Proves nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIterationDomain;

impl IterationDomainOracle for NoIterationDomain {
    fn are_disjoint_across_iterations(&self, _a: InstId, _b: InstId) -> bool {
        false
    }
}

/// Explicit table of access pairs known to be disjoint across iterations
///
/// Pairs are unordered. A self-pair `(a, a)` states that `a` touches a
/// different location in every iteration.
#[derive(Debug, Clone, Default)]
pub struct DisjointAccesses {
    pairs: FxHashSet<(InstId, InstId)>,
}

impl DisjointAccesses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, a: u32, b: u32) -> Self {
        self.add(InstId(a), InstId(b));
        self
    }

    pub fn add(&mut self, a: InstId, b: InstId) {
        self.pairs.insert(Self::key(a, b));
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn key(a: InstId, b: InstId) -> (InstId, InstId) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

impl IterationDomainOracle for DisjointAccesses {
    fn are_disjoint_across_iterations(&self, a: InstId, b: InstId) -> bool {
        self.pairs.contains(&Self::key(a, b))
    }
}
