//! Partitioner
//!
//! Groups the non-clonable SCCs of a classified SCCDAG into partitions:
//!
//! 1. every partitionable SCC starts alone (ids follow SCC order)
//! 2. partitions joined by a `must` memory dependence are merged, so memory
//!    ordering never needs synchronization across partitions
//! 3. parent → child pairs are merged greedily while the cost model says the
//!    merge does not make things slower
//!
//! Pair merges take the convex closure of the pair in the partition graph,
//! which keeps that graph acyclic. The SCCDAG itself is never mutated.

use crate::config::PartitionConfig;
use crate::errors::{EngineError, Result};
use crate::features::partition::domain::{Partition, PartitionId, PartitionPlan, PartitionSummary};
use crate::features::partition::infrastructure::{CostModel, PartitionGraph};
use crate::features::scc_attrs::SccDagAttrs;
use crate::features::sccdag::{SccDag, SccId};
use crate::shared::invariants::{enforce, InvariantViolation};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Candidate of the cost-guided pass
#[derive(Debug, Clone)]
struct Candidate {
    pair: (PartitionId, PartitionId),
    closure: BTreeSet<PartitionId>,
    benefit: i128,
    instruction_count: usize,
}

impl Candidate {
    /// Greater benefit, then fewer instructions, then smaller ids
    fn beats(&self, other: &Candidate) -> bool {
        (self.benefit, std::cmp::Reverse(self.instruction_count), std::cmp::Reverse(self.pair))
            > (other.benefit, std::cmp::Reverse(other.instruction_count), std::cmp::Reverse(other.pair))
    }
}

pub struct Partitioner<'a> {
    dag: &'a SccDag<'a>,
    attrs: &'a SccDagAttrs,
    cost: &'a CostModel<'a>,
    config: PartitionConfig,
    verify_invariants: bool,
    partitions: BTreeMap<PartitionId, BTreeSet<SccId>>,
    /// Every SCC a partition may hold
    partitionable: BTreeSet<SccId>,
    initial_partitions: usize,
    memory_merges: usize,
    cost_merges: usize,
}

impl<'a> Partitioner<'a> {
    /// Start from one singleton partition per partitionable SCC
    ///
    /// `attrs` must come from classifying `dag` as it is now.
    pub fn new(
        dag: &'a SccDag<'a>,
        attrs: &'a SccDagAttrs,
        cost: &'a CostModel<'a>,
        config: PartitionConfig,
    ) -> Result<Self> {
        if let Some(missing) = dag.scc_ids().into_iter().find(|&id| !attrs.contains(id)) {
            return Err(EngineError::UnknownComponent(missing.index()));
        }
        if !cost.uses_profile() {
            warn!("no profile available, partition costs use fixed latencies");
        }

        let partitionable: BTreeSet<SccId> = attrs.partitionable_sccs().into_iter().collect();
        let partitions: BTreeMap<PartitionId, BTreeSet<SccId>> = partitionable
            .iter()
            .enumerate()
            .map(|(id, &scc)| (id, BTreeSet::from([scc])))
            .collect();
        let initial_partitions = partitions.len();

        debug!(
            region = %dag.pdg().region,
            partitions = initial_partitions,
            replicated = attrs.clonable_sccs().len(),
            "initial partitions"
        );

        Ok(Self {
            dag,
            attrs,
            cost,
            config,
            verify_invariants: false,
            partitions,
            partitionable,
            initial_partitions,
            memory_merges: 0,
            cost_merges: 0,
        })
    }

    /// Also check partition-graph acyclicity around every merge
    pub fn with_verification(mut self, enabled: bool) -> Self {
        self.verify_invariants = enabled;
        self
    }

    pub fn partitions(&self) -> Vec<Partition> {
        self.partitions
            .iter()
            .map(|(&id, sccs)| Partition::new(id, sccs.clone()))
            .collect()
    }

    pub fn partition(&self, id: PartitionId) -> Option<&BTreeSet<SccId>> {
        self.partitions.get(&id)
    }

    pub fn partition_of(&self, scc: SccId) -> Option<PartitionId> {
        self.partitions
            .iter()
            .find(|(_, sccs)| sccs.contains(&scc))
            .map(|(&id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn graph(&self) -> PartitionGraph {
        PartitionGraph::build(self.attrs, &self.partitions)
    }

    // ------------------------------------------------------------------
    // Merging
    // ------------------------------------------------------------------

    /// Merge `ids` into the smallest of them
    ///
    /// Fails when fewer than two distinct known partitions are named, or when
    /// some other partition sits on a path between two of them.
    pub fn merge(&mut self, ids: &[PartitionId]) -> Result<PartitionId> {
        let targets: BTreeSet<PartitionId> = ids.iter().copied().collect();
        if let Some(unknown) = targets.iter().find(|id| !self.partitions.contains_key(id)) {
            return Err(EngineError::invalid_merge(format!("unknown partition {}", unknown)));
        }
        if targets.len() < 2 {
            return Err(EngineError::invalid_merge(format!(
                "need at least two distinct partitions, got {:?}",
                ids
            )));
        }

        let graph = self.graph();
        let mut through = BTreeSet::new();
        for &a in &targets {
            let desc = graph.descendants(a);
            for &b in &targets {
                if a == b {
                    continue;
                }
                through.extend(
                    desc.intersection(&graph.ancestors(b))
                        .filter(|p| !targets.contains(p))
                        .copied(),
                );
            }
        }
        if !through.is_empty() {
            return Err(EngineError::MergeIntroducesCycle {
                components: targets.into_iter().collect(),
                through: through.into_iter().collect(),
            });
        }

        Ok(self.merge_unchecked(&targets))
    }

    fn merge_unchecked(&mut self, targets: &BTreeSet<PartitionId>) -> PartitionId {
        enforce(self.check());
        let before = self.partitions.len();

        let mut ids = targets.iter().copied();
        let survivor = ids.next().unwrap_or_default();
        let mut merged = self.partitions.remove(&survivor).unwrap_or_default();
        for id in ids {
            if let Some(sccs) = self.partitions.remove(&id) {
                merged.extend(sccs);
            }
        }
        self.partitions.insert(survivor, merged);

        let after = self.partitions.len();
        if after + targets.len() != before + 1 {
            enforce::<()>(Err(InvariantViolation::MergeCountMismatch {
                merged: targets.len(),
                before,
                after,
            }));
        }
        enforce(self.check());

        debug!(
            into = survivor,
            merged = ?targets,
            partitions = after,
            "merged partitions"
        );
        survivor
    }

    /// Merge partitions joined by `must` memory dependences until none remain
    ///
    /// Runs regardless of the minimum partition count and the iteration
    /// cap; every merge removes at least one partition. Returns merges done.
    pub fn merge_memory_edges(&mut self) -> usize {
        let mut merges = 0;
        while let Some((a, b)) = self.must_memory_pair() {
            let closure = self.graph().closure(a, b);
            self.merge_unchecked(&closure);
            merges += 1;
        }
        self.memory_merges += merges;
        merges
    }

    /// Smallest pair of distinct partitions with a `must` memory edge between them
    fn must_memory_pair(&self) -> Option<(PartitionId, PartitionId)> {
        let owner = self.owner_map();
        let pdg = self.dag.pdg();
        let graph = self.dag.graph();

        graph
            .edge_ids()
            .into_iter()
            .filter_map(|edge| {
                let (from, to) = graph.edge_endpoints(edge)?;
                let (&p, &q) = (owner.get(&from)?, owner.get(&to)?);
                if p == q {
                    return None;
                }
                let dep = graph.edge(edge)?;
                let must_memory = dep
                    .sub_edges
                    .iter()
                    .any(|&sub| pdg.dependence(sub).is_some_and(|d| d.is_memory() && d.is_must()));
                must_memory.then_some((p.min(q), p.max(q)))
            })
            .min()
    }

    /// Greedy cost-guided merging; returns merges done
    pub fn merge_by_cost(&mut self) -> usize {
        let mut merges = 0;
        while merges < self.config.max_iterations && self.partitions.len() > self.config.min_partitions {
            let Some(best) = self.best_candidate() else {
                break;
            };
            if best.benefit < 0 {
                break;
            }
            debug!(
                parent = best.pair.0,
                child = best.pair.1,
                benefit = %best.benefit,
                "cost-guided merge"
            );
            self.merge_unchecked(&best.closure);
            merges += 1;
        }
        self.cost_merges += merges;
        merges
    }

    fn best_candidate(&self) -> Option<Candidate> {
        let graph = self.graph();
        let mut best: Option<Candidate> = None;

        for (parent, child) in graph.edges() {
            let closure = graph.closure(parent, child);
            if self.partitions.len() + 1 < self.config.min_partitions + closure.len() {
                continue;
            }

            let sets: Vec<&BTreeSet<SccId>> = closure.iter().filter_map(|id| self.partitions.get(id)).collect();
            let union: BTreeSet<SccId> = sets.iter().flat_map(|s| s.iter().copied()).collect();

            let separate = self.cost.latency(self.dag, self.attrs, &sets);
            let merged = self.cost.latency(self.dag, self.attrs, &[&union]);
            let candidate = Candidate {
                pair: (parent, child),
                benefit: i128::from(separate) - i128::from(merged),
                instruction_count: self.instruction_count(&union),
                closure,
            };

            if best.as_ref().map_or(true, |b| candidate.beats(b)) {
                best = Some(candidate);
            }
        }
        best
    }

    /// Run the enabled passes and emit the plan
    pub fn run(mut self) -> PartitionPlan {
        if self.config.merge_memory_edges {
            self.merge_memory_edges();
        }
        if self.config.cost_guided {
            self.merge_by_cost();
        }
        let plan = self.plan();
        info!(
            region = %self.dag.pdg().region,
            initial = plan.initial_partitions,
            partitions = plan.len(),
            memory_merges = plan.memory_merges,
            cost_merges = plan.cost_merges,
            latency = plan.total_latency,
            "partitioning complete"
        );
        plan
    }

    /// Current partitions in dependence order
    pub fn plan(&self) -> PartitionPlan {
        let graph = self.graph();
        let order = match graph.topological_order() {
            Some(order) => order,
            None => {
                enforce(graph.verify_acyclic());
                Vec::new()
            }
        };

        let partitions = order
            .into_iter()
            .filter_map(|id| self.partitions.get(&id).map(|sccs| self.summarize(id, sccs)))
            .collect();
        let sets: Vec<&BTreeSet<SccId>> = self.partitions.values().collect();

        PartitionPlan {
            partitions,
            total_latency: self.cost.latency(self.dag, self.attrs, &sets),
            initial_partitions: self.initial_partitions,
            memory_merges: self.memory_merges,
            cost_merges: self.cost_merges,
        }
    }

    fn summarize(&self, id: PartitionId, sccs: &BTreeSet<SccId>) -> PartitionSummary {
        let replicated: BTreeSet<SccId> = sccs
            .iter()
            .flat_map(|&s| self.attrs.clonable_ancestors(s))
            .collect();
        PartitionSummary {
            id,
            sccs: sccs.iter().map(|s| s.index()).collect(),
            replicated: replicated.iter().map(|s| s.index()).collect(),
            cost: self.cost.internal_cost(self.dag, self.attrs, sccs),
            instruction_count: self.instruction_count(sccs),
        }
    }

    fn instruction_count(&self, sccs: &BTreeSet<SccId>) -> usize {
        sccs.iter()
            .filter_map(|&s| self.dag.scc(s))
            .map(|scc| scc.internal.len())
            .sum()
    }

    fn owner_map(&self) -> BTreeMap<SccId, PartitionId> {
        self.partitions
            .iter()
            .flat_map(|(&p, sccs)| sccs.iter().map(move |&s| (s, p)))
            .collect()
    }

    // ------------------------------------------------------------------
    // Invariants
    // ------------------------------------------------------------------

    /// Partitions are disjoint, cover every partitionable SCC and nothing else,
    /// and form an acyclic partition graph
    pub fn verify(&self) -> std::result::Result<(), InvariantViolation> {
        self.check_cover()?;
        self.graph().verify_acyclic()
    }

    fn check(&self) -> std::result::Result<(), InvariantViolation> {
        self.check_cover()?;
        if self.verify_invariants {
            self.graph().verify_acyclic()?;
        }
        Ok(())
    }

    fn check_cover(&self) -> std::result::Result<(), InvariantViolation> {
        let mut owner: BTreeMap<SccId, PartitionId> = BTreeMap::new();
        for (&p, sccs) in &self.partitions {
            for &scc in sccs {
                if !self.partitionable.contains(&scc) {
                    return Err(InvariantViolation::PartitionForeignComponent {
                        partition: p,
                        component: scc.index(),
                    });
                }
                if let Some(first) = owner.insert(scc, p) {
                    return Err(InvariantViolation::PartitionOverlap {
                        component: scc.index(),
                        first,
                        second: p,
                    });
                }
            }
        }

        let missing: Vec<usize> = self
            .partitionable
            .iter()
            .filter(|s| !owner.contains_key(s))
            .map(|s| s.index())
            .collect();
        if !missing.is_empty() {
            return Err(InvariantViolation::PartitionNotExhaustive { missing });
        }
        Ok(())
    }
}

impl std::fmt::Debug for Partitioner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Partitioner")
            .field("config", &self.config)
            .field("partitions", &self.partitions)
            .field("memory_merges", &self.memory_merges)
            .field("cost_merges", &self.cost_merges)
            .finish()
    }
}
