//! Structural invariant violations
//!
//! These are engine bugs, never input problems. A violated invariant means the
//! dependence graph can no longer be trusted, so no plan may be produced from
//! it: the violation is logged and the analysis panics (the release profile
//! turns that into a process abort).

use thiserror::Error;

/// Broken structural invariant of the PDG, SCCDAG or partition set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("node {node} belongs to components {first} and {second}")]
    NodeInMultipleComponents {
        node: usize,
        first: usize,
        second: usize,
    },

    #[error("node {node} is not covered by any component")]
    UncoveredNode { node: usize },

    #[error("SCCDAG contains a cycle through components {components:?}")]
    CyclicSccDag { components: Vec<usize> },

    #[error("SCCDAG edge {edge}: sub-edge {sub_edge} does not connect {from} to {to}")]
    MisplacedSubEdge {
        edge: usize,
        sub_edge: usize,
        from: usize,
        to: usize,
    },

    #[error("SCCDAG edge {edge}: certainty {found} disagrees with its sub-edges")]
    CertaintyMismatch { edge: usize, found: &'static str },

    #[error("component {component} is assigned to partitions {first} and {second}")]
    PartitionOverlap {
        component: usize,
        first: usize,
        second: usize,
    },

    #[error("partitions do not cover components {missing:?}")]
    PartitionNotExhaustive { missing: Vec<usize> },

    #[error("partition {partition} holds component {component} that is not partitionable")]
    PartitionForeignComponent { partition: usize, component: usize },

    #[error("partition graph contains a cycle through partitions {partitions:?}")]
    CyclicPartitionGraph { partitions: Vec<usize> },

    #[error("merge of {merged} sets went from {before} to {after} partitions")]
    MergeCountMismatch {
        merged: usize,
        before: usize,
        after: usize,
    },
}

/// Log the violation and stop the analysis
#[cold]
#[track_caller]
pub fn abort_on(violation: InvariantViolation) -> ! {
    tracing::error!(%violation, "structural invariant violated, aborting analysis");
    panic!("structural invariant violated: {}", violation);
}

/// Unwrap a check result or abort the analysis
#[track_caller]
pub fn enforce<T>(result: Result<T, InvariantViolation>) -> T {
    match result {
        Ok(value) => value,
        Err(violation) => abort_on(violation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_messages() {
        let v = InvariantViolation::NodeInMultipleComponents {
            node: 3,
            first: 0,
            second: 2,
        };
        assert_eq!(v.to_string(), "node 3 belongs to components 0 and 2");

        let v = InvariantViolation::PartitionNotExhaustive { missing: vec![4, 5] };
        assert!(v.to_string().contains("[4, 5]"));
    }

    #[test]
    fn test_enforce_passes_values_through() {
        assert_eq!(enforce::<u32>(Ok(7)), 7);
    }

    #[test]
    #[should_panic(expected = "structural invariant violated")]
    fn test_enforce_aborts_on_violation() {
        enforce::<()>(Err(InvariantViolation::UncoveredNode { node: 1 }));
    }
}
