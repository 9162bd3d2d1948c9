//! Property-based tests for condensation, classification and partitioning
//!
//! Random dependence graphs over plain arithmetic instructions, with a mix
//! of forward, loop-carried and memory edges.

#[path = "../common/mod.rs"]
mod common;

use common::{assert_coverage, assert_edge_soundness, assert_plan_partitions, PdgSketch};
use parallel_dg::config::PartitionConfig;
use parallel_dg::{
    classify, condense, Certainty, CostModel, DataHazard, EngineConfig, EngineError, Partitioner,
    ProgramDependenceGraph, SccId,
};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy)]
enum EdgeKind {
    Data,
    MustMemory,
    MayMemory,
}

fn edge_kind() -> impl Strategy<Value = EdgeKind> {
    prop_oneof![
        4 => Just(EdgeKind::Data),
        1 => Just(EdgeKind::MustMemory),
        1 => Just(EdgeKind::MayMemory),
    ]
}

// Strategy for (instruction count, edges between them)
fn random_graph() -> impl Strategy<Value = (u32, Vec<(u32, u32, EdgeKind)>)> {
    (1u32..24).prop_flat_map(|n| {
        let edge = (0..n, 0..n, edge_kind());
        (Just(n), prop::collection::vec(edge, 0..(n as usize * 2)))
    })
}

fn sketch(n: u32, edges: &[(u32, u32, EdgeKind)]) -> ProgramDependenceGraph {
    let mut sketch = PdgSketch::loop_body("random");
    for id in 0..n {
        sketch = sketch.op(id);
    }
    for &(from, to, kind) in edges {
        sketch = match kind {
            EdgeKind::Data if from >= to => sketch.carried_data(from, to),
            EdgeKind::Data => sketch.data(from, to),
            EdgeKind::MustMemory => sketch.memory(from, to, DataHazard::WAW, Certainty::Must),
            EdgeKind::MayMemory => sketch.memory(from, to, DataHazard::RAW, Certainty::May),
        };
    }
    sketch.build()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn condensation_covers_and_keeps_edges_sound((n, edges) in random_graph()) {
        let pdg = sketch(n, &edges);
        let dag = condense(&pdg, &EngineConfig::default());

        assert_coverage(&pdg, &dag);
        assert_edge_soundness(&pdg, &dag);
        prop_assert_eq!(dag.topological_order().len(), dag.len());
    }

    #[test]
    fn classification_is_idempotent((n, edges) in random_graph()) {
        let pdg = sketch(n, &edges);
        let config = EngineConfig::default();
        let dag = condense(&pdg, &config);

        prop_assert_eq!(classify(&dag, &config, None), classify(&dag, &config, None));
    }

    #[test]
    fn partitions_stay_disjoint_and_exhaustive(
        (n, edges) in random_graph(),
        min_partitions in 1usize..4,
    ) {
        let pdg = sketch(n, &edges);
        let config = EngineConfig::default();
        let dag = condense(&pdg, &config);
        let attrs = classify(&dag, &config, None);
        let cost = CostModel::new(config.cost.clone());

        let partition_config = PartitionConfig::default().min_partitions(min_partitions);
        let mut partitioner = Partitioner::new(&dag, &attrs, &cost, partition_config)
            .unwrap()
            .with_verification(true);
        let initial = partitioner.len();

        partitioner.merge_memory_edges();
        let after_memory = partitioner.len();
        let cost_merges = partitioner.merge_by_cost();

        prop_assert!(partitioner.verify().is_ok());
        prop_assert!(after_memory <= initial);
        // Cost-guided merging never goes below the minimum on its own
        if cost_merges > 0 {
            prop_assert!(partitioner.len() >= min_partitions);
        }

        let plan = partitioner.plan();
        assert_plan_partitions(&plan, &attrs);
        prop_assert_eq!(plan.initial_partitions, initial);
    }

    #[test]
    fn closure_merges_are_monotone((n, edges) in random_graph()) {
        let pdg = sketch(n, &edges);
        let config = EngineConfig::default();
        let dag = condense(&pdg, &config);
        let attrs = classify(&dag, &config, None);
        let cost = CostModel::new(config.cost.clone());
        let mut partitioner = Partitioner::new(&dag, &attrs, &cost, PartitionConfig::default())
            .unwrap()
            .with_verification(true);

        while let Some(&(parent, child)) = partitioner.graph().edges().first() {
            let closure = partitioner.graph().closure(parent, child);
            let inputs: Vec<BTreeSet<SccId>> = closure
                .iter()
                .map(|&p| partitioner.partition(p).unwrap().clone())
                .collect();
            let before = partitioner.len();

            let survivor = partitioner.merge(&closure.iter().copied().collect::<Vec<_>>()).unwrap();
            prop_assert_eq!(survivor, *closure.iter().next().unwrap());
            prop_assert_eq!(partitioner.len(), before - (closure.len() - 1));

            let merged = cost.internal_cost(&dag, &attrs, partitioner.partition(survivor).unwrap());
            for input in &inputs {
                prop_assert!(merged >= cost.internal_cost(&dag, &attrs, input));
            }
        }
        prop_assert!(partitioner.verify().is_ok());
    }

    #[test]
    fn component_merges_keep_the_dag_valid(
        (n, edges) in random_graph(),
        pick in any::<(prop::sample::Index, prop::sample::Index)>(),
    ) {
        let pdg = sketch(n, &edges);
        let mut dag = condense(&pdg, &EngineConfig::default());
        let ids = dag.scc_ids();
        let (a, b) = (ids[pick.0.index(ids.len())], ids[pick.1.index(ids.len())]);
        let before = dag.len();
        let cyclic_before: BTreeMap<SccId, bool> = ids
            .iter()
            .map(|&id| (id, dag.scc(id).is_some_and(|scc| scc.has_cycle)))
            .collect();

        match dag.merge_components(&[a, b]) {
            Ok(survivor) => {
                prop_assert_eq!(survivor, a.min(b));
                prop_assert_eq!(dag.len(), before - 1);
                // Cyclic only when the merged members already were
                let was_cyclic = cyclic_before.get(&a).copied().unwrap_or(false)
                    || cyclic_before.get(&b).copied().unwrap_or(false);
                prop_assert_eq!(dag.scc(survivor).unwrap().has_cycle, was_cyclic);
                assert_coverage(&pdg, &dag);
                assert_edge_soundness(&pdg, &dag);
            }
            Err(EngineError::InvalidMerge(_)) => prop_assert_eq!(a, b),
            Err(EngineError::MergeIntroducesCycle { through, .. }) => {
                prop_assert!(!through.is_empty());
                prop_assert_eq!(dag.len(), before);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}
