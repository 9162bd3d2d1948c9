//! Reference scenarios for condensation, classification and partitioning

#[path = "../common/mod.rs"]
mod common;

use common::{assert_coverage, assert_edge_soundness, must_alias_stores, pdg_of, product_loop, sum_loop, PdgSketch};
use parallel_dg::{
    classify, condense, partition, CostModel, EngineConfig, InstId, Instruction, Operand, Preset, ReductionOp, Region,
    SccKind,
};
use pretty_assertions::assert_eq;

// ═══════════════════════════════════════════════════════════════════
// Condensation
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_three_cycle_with_tail() {
    // 1 → 2 → 3 → 1, 3 → 4
    let pdg = PdgSketch::function("cycle")
        .op(1)
        .op(2)
        .op(3)
        .op(4)
        .data(1, 2)
        .data(2, 3)
        .data(3, 1)
        .data(3, 4)
        .build();
    let config = EngineConfig::default();
    let dag = condense(&pdg, &config);

    assert_eq!(dag.len(), 2);
    assert_coverage(&pdg, &dag);
    assert_edge_soundness(&pdg, &dag);

    let cycle = dag.scc_of_inst(InstId(1)).unwrap();
    let tail = dag.scc_of_inst(InstId(4)).unwrap();
    assert_eq!(dag.scc_of_inst(InstId(2)), Some(cycle));
    assert_eq!(dag.scc_of_inst(InstId(3)), Some(cycle));
    assert!(dag.scc(cycle).unwrap().has_cycle);
    assert!(!dag.scc(tail).unwrap().has_cycle);
    assert_eq!(dag.scc(cycle).unwrap().internal.len(), 3);

    assert_eq!(dag.graph().edge_count(), 1);
    let edge = dag.edge_between(cycle, tail).unwrap();
    let dep = dag.dependence(edge).unwrap();
    assert_eq!(dep.sub_edges, pdg.edges_between(InstId(3), InstId(4)));
    assert_eq!(dep.sub_edges.len(), 1);
}

// ═══════════════════════════════════════════════════════════════════
// Partitioning
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_must_alias_stores_share_a_partition() {
    let region = must_alias_stores();
    let pdg = pdg_of(&region);
    let config = EngineConfig::default();
    let dag = condense(&pdg, &config);
    let attrs = classify(&dag, &config, None);

    let first = dag.scc_of_inst(InstId(0)).unwrap();
    let second = dag.scc_of_inst(InstId(1)).unwrap();
    assert_ne!(first, second);
    assert!(!attrs.is_clonable(first));
    assert!(!attrs.is_clonable(second));

    let cost = CostModel::new(config.cost.clone());
    // The minimum only bounds cost-guided merging
    let plan = partition(&dag, &attrs, &cost, 2, &config).unwrap();

    assert_eq!(plan.len(), 1);
    assert_eq!(plan.memory_merges, 1);
    assert_eq!(plan.cost_merges, 0);
    assert_eq!(plan.partition_of(first), plan.partition_of(second));
}

#[test]
fn test_long_store_chain_ignores_iteration_cap() {
    // 70 stores to @x: more memory merges than the fast preset's cap
    let region = (0..70).fold(Region::function("fill"), |region, i| {
        region.with(Instruction::store(i, Operand::Constant(i as i64), Operand::Global("x".into())))
    });
    let pdg = pdg_of(&region);
    let config = EngineConfig::preset(Preset::Fast);
    assert_eq!(config.partition.max_iterations, 64);
    let dag = condense(&pdg, &config);
    let attrs = classify(&dag, &config, None);
    assert_eq!(attrs.partitionable_sccs().len(), 70);

    let cost = CostModel::new(config.cost.clone());
    let plan = partition(&dag, &attrs, &cost, 1, &config).unwrap();

    assert_eq!(plan.len(), 1);
    assert_eq!(plan.memory_merges, 69);
    assert_eq!(plan.partitions[0].sccs.len(), 70);
}

// ═══════════════════════════════════════════════════════════════════
// Classification
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_address_computation_is_clonable_despite_carried_edges() {
    let pdg = PdgSketch::loop_body("gep")
        .op(0)
        .inst(parallel_dg::Instruction::gep(1, Operand::Global("a".into()), Operand::Argument(0)))
        .data(0, 1)
        .carried_data(1, 1)
        .build();
    let config = EngineConfig::default();
    let dag = condense(&pdg, &config);
    let attrs = classify(&dag, &config, None);

    let gep = attrs.get(dag.scc_of_inst(InstId(1)).unwrap()).unwrap();
    assert_eq!(gep.kind, SccKind::Clonable);
    assert!(gep.clonable);
    assert!(!gep.loop_carried_edges.is_empty());
}

#[test]
fn test_sum_accumulator_is_add_reduction() {
    let region = sum_loop();
    let pdg = pdg_of(&region);
    let config = EngineConfig::default();
    let dag = condense(&pdg, &config);
    let attrs = classify(&dag, &config, None);

    let sum = dag.scc_of_inst(InstId(1)).unwrap();
    assert_eq!(dag.scc_of_inst(InstId(4)), Some(sum));
    assert_eq!(dag.scc(sum).unwrap().internal.len(), 2);

    let sum_attrs = attrs.get(sum).unwrap();
    assert_eq!(
        sum_attrs.kind,
        SccKind::Reducible {
            op: ReductionOp::Add,
            identity: 0
        }
    );
    let reduction = sum_attrs.reduction.as_ref().unwrap();
    assert_eq!(reduction.initial, Some(Operand::Constant(0)));
    assert_eq!(reduction.accumulators, vec![InstId(4)]);
}

#[test]
fn test_product_accumulator_is_mul_reduction() {
    let region = product_loop();
    let pdg = pdg_of(&region);
    let config = EngineConfig::default();
    let dag = condense(&pdg, &config);
    let attrs = classify(&dag, &config, None);

    let product = dag.scc_of_inst(InstId(1)).unwrap();
    assert_eq!(
        attrs.kind(product),
        Some(SccKind::Reducible {
            op: ReductionOp::Mul,
            identity: 1
        })
    );
}
