//! End-to-end runs of build_pdg → condense → classify → partition

#[path = "../common/mod.rs"]
mod common;

use common::{
    assert_coverage, assert_edge_soundness, assert_plan_partitions, logging_loop, pdg_of, pdg_with, step_module,
    sum_loop, v,
};
use parallel_dg::features::partition::StaticProfile;
use parallel_dg::features::scc_attrs::DisjointAccesses;
use parallel_dg::shared::models::BinaryOp;
use parallel_dg::{
    build_pdg, classify, condense, merge_components, partition, CostModel, EngineConfig, EngineError, InstId,
    Instruction, Operand, PdgOracles, Region, SccKind,
};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_sum_loop_pipeline() {
    let region = sum_loop();
    let config = EngineConfig::default();
    let pdg = pdg_of(&region);
    let dag = condense(&pdg, &config);
    assert_coverage(&pdg, &dag);
    assert_edge_soundness(&pdg, &dag);

    let attrs = classify(&dag, &config, None);
    let iv = dag.scc_of_inst(InstId(0)).unwrap();
    let sum = dag.scc_of_inst(InstId(1)).unwrap();
    let gep = dag.scc_of_inst(InstId(2)).unwrap();
    let load = dag.scc_of_inst(InstId(3)).unwrap();
    assert_eq!(attrs.partitionable_sccs(), vec![sum, load]);

    let cost = CostModel::new(config.cost.clone());

    // Kept apart: the load stage feeds one value to the reduction
    let split = partition(&dag, &attrs, &cost, 2, &config).unwrap();
    assert_plan_partitions(&split, &attrs);
    assert_eq!(split.len(), 2);
    assert_eq!(split.partitions[0].sccs, vec![load.index()]);
    assert_eq!(split.partitions[1].sccs, vec![sum.index()]);
    // load 10 + replicated address and loop control 7
    assert_eq!(split.partitions[0].cost, 17);
    assert_eq!(split.partitions[0].replicated, vec![iv.index(), gep.index()]);
    assert_eq!(split.total_latency, 117);

    // Fused: no queue left
    let fused = partition(&dag, &attrs, &cost, 1, &config).unwrap();
    assert_plan_partitions(&fused, &attrs);
    assert_eq!(fused.len(), 1);
    assert_eq!(fused.cost_merges, 1);
    assert_eq!(fused.partitions[0].cost, 18);
    assert_eq!(fused.total_latency, 18);
    assert_eq!(fused.partitions[0].instruction_count, 3);
}

#[test]
fn test_callee_bodies_feed_the_cost_model() {
    let region = logging_loop();
    let config = EngineConfig::default();
    let pdg = pdg_of(&region);
    let dag = condense(&pdg, &config);
    let attrs = classify(&dag, &config, None);

    let body = dag.scc_of_inst(InstId(1)).unwrap();
    assert_eq!(dag.scc_of_inst(InstId(3)), Some(body));
    assert_eq!(attrs.kind(body), Some(SccKind::Sequential));

    // load 10 + call (1 + mul 1 + add 1 + ret 5) + store 10 + loop control 7
    let module = step_module();
    let resolved = CostModel::new(config.cost.clone()).with_callees(&module);
    let plan = partition(&dag, &attrs, &resolved, 1, &config).unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.partitions[0].cost, 35);

    // Unknown callee costs 50
    let unresolved = CostModel::new(config.cost.clone());
    let plan = partition(&dag, &attrs, &unresolved, 1, &config).unwrap();
    assert_eq!(plan.partitions[0].cost, 78);
}

#[test]
fn test_profile_keeps_heavy_stages_apart() {
    let region = sum_loop();
    let config = EngineConfig::default();
    let pdg = pdg_of(&region);
    let dag = condense(&pdg, &config);
    let attrs = classify(&dag, &config, None);

    // The load dominates; merging would double the slowest stage
    let profile = StaticProfile::new().with(3, 900).with(4, 900);
    let cost = CostModel::new(config.cost.clone()).with_profile(&profile);
    let plan = partition(&dag, &attrs, &cost, 1, &config).unwrap();

    assert_eq!(plan.len(), 2);
    assert_eq!(plan.cost_merges, 0);
    assert_eq!(plan.total_latency, 1000);
}

#[test]
fn test_iteration_domain_turns_stores_independent() {
    // a[i] = 0
    let region = Region::loop_body("clear")
        .with(Instruction::phi(0, vec![Operand::Constant(0), v(3)]))
        .with(Instruction::gep(1, Operand::Global("a".into()), v(0)))
        .with(Instruction::store(2, Operand::Constant(0), v(1)))
        .with(Instruction::binary(3, BinaryOp::Add, v(0), Operand::Constant(1)))
        .with(Instruction::compare(4, v(3), Operand::Argument(0)))
        .with(Instruction::branch(5, Some(v(4))));
    let config = EngineConfig::default();
    let pdg = pdg_of(&region);
    let dag = condense(&pdg, &config);
    let store = dag.scc_of_inst(InstId(2)).unwrap();

    let conservative = classify(&dag, &config, None);
    assert_eq!(conservative.kind(store), Some(SccKind::Sequential));

    let oracle = DisjointAccesses::new().with(2, 2);
    let proven = classify(&dag, &config, Some(&oracle));
    assert_eq!(proven.kind(store), Some(SccKind::Independent));
    assert!(proven.is_clonable(store));
    assert!(proven.partitionable_sccs().is_empty());

    let cost = CostModel::new(config.cost.clone());
    let plan = partition(&dag, &proven, &cost, 1, &config).unwrap();
    assert!(plan.is_empty());
    assert_eq!(plan.total_latency, 0);
}

#[test]
fn test_explicit_merge_then_reclassify() {
    let region = sum_loop();
    let config = EngineConfig::default();
    let pdg = pdg_of(&region);
    let mut dag = condense(&pdg, &config);
    let before = dag.len();

    let load = dag.scc_of_inst(InstId(3)).unwrap();
    let sum = dag.scc_of_inst(InstId(1)).unwrap();
    let merged = merge_components(&mut dag, &[sum, load]).unwrap();
    assert_eq!(merged, sum.min(load));
    assert_eq!(dag.len(), before - 1);
    assert_coverage(&pdg, &dag);
    assert_edge_soundness(&pdg, &dag);

    // The load now sits on the accumulator cycle
    let attrs = classify(&dag, &config, None);
    assert!(dag.scc(merged).unwrap().has_cycle);
    assert_eq!(attrs.partitionable_sccs(), vec![merged]);

    let iv = dag.scc_of_inst(InstId(0)).unwrap();
    assert!(matches!(
        merge_components(&mut dag, &[iv]),
        Err(EngineError::InvalidMerge(_))
    ));
}

#[test]
fn test_missing_oracle_is_a_configuration_error() {
    let region = sum_loop();
    let err = build_pdg(&region, PdgOracles::new(), &EngineConfig::default()).unwrap_err();
    assert!(matches!(err, EngineError::MissingOracle { oracle: "use-def" }));
}

#[test]
fn test_yaml_configured_run() {
    let yaml = r#"
version: 1
preset: thorough
overrides:
  cost:
    queue_latency: 1
  partition:
    cost_guided: false
"#;
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    let config = EngineConfig::from_yaml(file.path()).unwrap();
    assert!(!config.partition.cost_guided);
    assert_eq!(config.cost.queue_latency, 1);

    let region = sum_loop();
    let pdg = pdg_with(&region, &config);
    let dag = condense(&pdg, &config);
    let attrs = classify(&dag, &config, None);
    let cost = CostModel::new(config.cost.clone());
    let plan = partition(&dag, &attrs, &cost, 1, &config).unwrap();

    assert_eq!(plan.len(), 2);
    assert_eq!(plan.merges(), 0);
    assert_eq!(plan, partition(&dag, &attrs, &cost, 1, &config).unwrap());
}
