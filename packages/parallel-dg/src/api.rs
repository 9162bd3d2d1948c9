//! Exposed operations
//!
//! Thin entry points over the feature use cases, each driven by one
//! [`EngineConfig`]. A typical run:
//!
//! ```ignore
//! let pdg = build_pdg(&region, oracles, &config)?;
//! let dag = condense(&pdg, &config);
//! let attrs = classify(&dag, &config, None);
//! let cost = CostModel::new(config.cost.clone());
//! let plan = partition(&dag, &attrs, &cost, 2, &config)?;
//! ```

use crate::config::EngineConfig;
use crate::errors::Result;
use crate::features::partition::{CostModel, PartitionPlan, Partitioner};
use crate::features::pdg::{PdgBuilder, ProgramDependenceGraph};
use crate::features::scc_attrs::{IterationDomainOracle, SccClassifier, SccDagAttrs};
use crate::features::sccdag::{SccDag, SccId};
use crate::shared::models::Region;

pub use crate::features::pdg::PdgOracles;

/// Build the dependence graph of one region
pub fn build_pdg(region: &Region, oracles: PdgOracles<'_>, config: &EngineConfig) -> Result<ProgramDependenceGraph> {
    PdgBuilder::new(config.pdg.clone()).with_oracles(oracles).build(region)
}

/// Condense a PDG into its SCCDAG
pub fn condense<'g>(pdg: &'g ProgramDependenceGraph, config: &EngineConfig) -> SccDag<'g> {
    let dag = SccDag::condense(pdg).with_verification(config.verify_invariants);
    if config.verify_invariants {
        dag.verify_or_abort();
    }
    dag
}

/// Classify every SCC of `dag`
pub fn classify(
    dag: &SccDag<'_>,
    config: &EngineConfig,
    iteration_domain: Option<&dyn IterationDomainOracle>,
) -> SccDagAttrs {
    let classifier = SccClassifier::new(config.classifier.clone());
    match iteration_domain {
        Some(oracle) => classifier.with_iteration_domain(oracle).classify(dag),
        None => classifier.classify(dag),
    }
}

/// Partition a classified SCCDAG, keeping at least `min_partitions`
/// partitions unless memory dependences force them together
pub fn partition<'a>(
    dag: &'a SccDag<'a>,
    attrs: &'a SccDagAttrs,
    cost: &'a CostModel<'a>,
    min_partitions: usize,
    config: &EngineConfig,
) -> Result<PartitionPlan> {
    let partition_config = config.partition.clone().min_partitions(min_partitions.max(1));
    let partitioner = Partitioner::new(dag, attrs, cost, partition_config)?.with_verification(config.verify_invariants);
    Ok(partitioner.run())
}

/// Merge SCCDAG components into one
///
/// Any [`SccDagAttrs`] computed before the merge is stale afterwards.
pub fn merge_components(dag: &mut SccDag<'_>, components: &[SccId]) -> Result<SccId> {
    dag.merge_components(components)
}
