//! Structural assertions

use parallel_dg::{PartitionPlan, ProgramDependenceGraph, SccDag, SccDagAttrs};
use std::collections::BTreeSet;

/// Every PDG node sits in exactly one SCC
pub fn assert_coverage(pdg: &ProgramDependenceGraph, dag: &SccDag<'_>) {
    let mut seen = BTreeSet::new();
    for id in dag.scc_ids() {
        for &node in &dag.scc(id).unwrap().internal {
            assert!(seen.insert(node), "node {:?} is in two SCCs", node);
        }
    }
    let all: BTreeSet<_> = pdg.graph().node_ids().into_iter().collect();
    assert_eq!(seen, all, "SCCs do not cover the PDG");
}

/// Every sub-edge connects the right SCCs; certainty is the AND of sub-edges
pub fn assert_edge_soundness(pdg: &ProgramDependenceGraph, dag: &SccDag<'_>) {
    let graph = dag.graph();
    for edge in graph.edge_ids() {
        let (from, to) = graph.edge_endpoints(edge).unwrap();
        let dep = graph.edge(edge).unwrap();
        assert!(!dep.sub_edges.is_empty(), "edge {:?} carries no sub-edge", edge);

        let mut all_must = true;
        for &sub in &dep.sub_edges {
            let (a, b) = pdg.graph().edge_endpoints(sub).unwrap();
            assert_eq!(dag.scc_of_node(a), Some(from));
            assert_eq!(dag.scc_of_node(b), Some(to));
            all_must &= pdg.dependence(sub).unwrap().is_must();
        }
        assert_eq!(dep.is_must(), all_must, "certainty of edge {:?}", edge);
    }
    assert!(graph.is_acyclic());
}

/// The plan partitions exactly the non-clonable SCCs
pub fn assert_plan_partitions(plan: &PartitionPlan, attrs: &SccDagAttrs) {
    let mut seen = BTreeSet::new();
    for partition in &plan.partitions {
        assert!(!partition.sccs.is_empty());
        for &scc in &partition.sccs {
            assert!(seen.insert(scc), "SCC {} in two partitions", scc);
        }
    }
    let expected: BTreeSet<usize> = attrs.partitionable_sccs().iter().map(|s| s.index()).collect();
    assert_eq!(seen, expected);
}
