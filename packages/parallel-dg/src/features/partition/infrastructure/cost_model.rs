/*
 * Cost Model - latency estimates that rank candidate merges
 *
 * Instruction cost:
 * - phis, address computations, casts: 0
 * - profile available: profiled count
 * - otherwise: memory / terminator / default latency, calls add callee cost
 *
 * Set cost:
 * - internal = Σ instruction cost over the set and the clonable SCCs
 *   replicated into it
 * - queue    = queue latency × distinct values entering from a
 *   non-clonable producer outside the set
 * - latency(sets compared together) = max internal + Σ queue
 *
 * Instruction and callee costs are memoized for the model's lifetime.
 */

use crate::config::CostConfig;
use crate::features::dg::NodeId;
use crate::features::partition::ports::{CalleeResolver, ProfileOracle};
use crate::features::scc_attrs::SccDagAttrs;
use crate::features::sccdag::{SccDag, SccId};
use crate::shared::models::{InstId, Instruction, Opcode};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::collections::BTreeSet;

/// Latency estimator
pub struct CostModel<'a> {
    config: CostConfig,
    profile: Option<&'a dyn ProfileOracle>,
    callees: Option<&'a dyn CalleeResolver>,
    instruction_costs: RefCell<FxHashMap<InstId, u64>>,
    callee_costs: RefCell<FxHashMap<String, u64>>,
    /// Callees whose cost is being computed (recursion guard)
    in_progress: RefCell<FxHashSet<String>>,
}

impl<'a> CostModel<'a> {
    pub fn new(config: CostConfig) -> Self {
        Self {
            config,
            profile: None,
            callees: None,
            instruction_costs: RefCell::new(FxHashMap::default()),
            callee_costs: RefCell::new(FxHashMap::default()),
            in_progress: RefCell::new(FxHashSet::default()),
        }
    }

    pub fn with_profile(mut self, profile: &'a dyn ProfileOracle) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn with_callees(mut self, callees: &'a dyn CalleeResolver) -> Self {
        self.callees = Some(callees);
        self
    }

    pub fn config(&self) -> &CostConfig {
        &self.config
    }

    /// Whether costs come from profiled counts
    pub fn uses_profile(&self) -> bool {
        self.profile.is_some_and(|p| p.is_available())
    }

    // ------------------------------------------------------------------
    // Instructions
    // ------------------------------------------------------------------

    pub fn instruction_cost(&self, inst: &Instruction) -> u64 {
        if let Some(&cached) = self.instruction_costs.borrow().get(&inst.id) {
            return cached;
        }
        let cost = self.compute_instruction_cost(inst);
        self.instruction_costs.borrow_mut().insert(inst.id, cost);
        cost
    }

    fn compute_instruction_cost(&self, inst: &Instruction) -> u64 {
        if inst.is_syntactic_sugar() {
            return 0;
        }
        if let Some(profile) = self.profile.filter(|p| p.is_available()) {
            return profile.instruction_count(inst);
        }
        self.fallback_cost(inst)
    }

    fn fallback_cost(&self, inst: &Instruction) -> u64 {
        match &inst.opcode {
            Opcode::Call { callee, .. } => {
                let body = match callee {
                    Some(name) => self.callee_cost(name),
                    None => self.config.unknown_callee_latency,
                };
                self.config.default_latency.saturating_add(body)
            }
            Opcode::Load | Opcode::Store => self.config.memory_latency,
            Opcode::Branch | Opcode::Return => self.config.terminator_latency,
            _ => self.config.default_latency,
        }
    }

    /// Estimated cost of one invocation of `name`
    ///
    /// Unresolvable and recursive callees cost `unknown_callee_latency`.
    pub fn callee_cost(&self, name: &str) -> u64 {
        if let Some(&cached) = self.callee_costs.borrow().get(name) {
            return cached;
        }
        let Some(body) = self.callees.and_then(|c| c.callee_body(name)) else {
            return self.config.unknown_callee_latency;
        };
        if !self.in_progress.borrow_mut().insert(name.to_string()) {
            return self.config.unknown_callee_latency;
        }

        // Callee bodies are costed with fallback latencies; their
        // instruction ids live in another region and must not hit the cache
        let cost = body
            .iter()
            .map(|inst| {
                if inst.is_syntactic_sugar() {
                    0
                } else {
                    self.fallback_cost(inst)
                }
            })
            .fold(0u64, u64::saturating_add);

        self.in_progress.borrow_mut().remove(name);
        self.callee_costs.borrow_mut().insert(name.to_string(), cost);
        cost
    }

    // ------------------------------------------------------------------
    // SCC sets
    // ------------------------------------------------------------------

    pub fn scc_cost(&self, dag: &SccDag<'_>, scc: SccId) -> u64 {
        dag.instructions(scc)
            .into_iter()
            .map(|inst| self.instruction_cost(inst))
            .fold(0u64, u64::saturating_add)
    }

    /// Cost of running `sccs` once, clonable SCCs replicated into it included
    pub fn internal_cost(&self, dag: &SccDag<'_>, attrs: &SccDagAttrs, sccs: &BTreeSet<SccId>) -> u64 {
        let mut all: BTreeSet<SccId> = sccs.clone();
        for &scc in sccs {
            all.extend(attrs.clonable_ancestors(scc));
        }
        all.into_iter()
            .map(|scc| self.scc_cost(dag, scc))
            .fold(0u64, u64::saturating_add)
    }

    /// Distinct producer instructions outside `sccs` whose values it consumes
    pub fn crossing_values(
        &self,
        dag: &SccDag<'_>,
        attrs: &SccDagAttrs,
        sccs: &BTreeSet<SccId>,
    ) -> BTreeSet<NodeId> {
        let pdg = dag.pdg();
        let mut values = BTreeSet::new();
        for &scc in sccs {
            for parent in attrs.parents_via_clones(scc) {
                if sccs.contains(&parent) {
                    continue;
                }
                for edge in attrs.edges_via_clones(scc, parent) {
                    let Some(dep) = dag.dependence(edge) else {
                        continue;
                    };
                    values.extend(
                        dep.sub_edges
                            .iter()
                            .filter_map(|&sub| pdg.graph().edge_endpoints(sub))
                            .map(|(from, _)| from),
                    );
                }
            }
        }
        values
    }

    pub fn queue_cost(&self, dag: &SccDag<'_>, attrs: &SccDagAttrs, sccs: &BTreeSet<SccId>) -> u64 {
        let values = self.crossing_values(dag, attrs, sccs).len() as u64;
        values.saturating_mul(self.config.queue_latency)
    }

    /// Latency of `sets` running concurrently: the slowest one plus all
    /// communication into each of them
    pub fn latency(&self, dag: &SccDag<'_>, attrs: &SccDagAttrs, sets: &[&BTreeSet<SccId>]) -> u64 {
        let slowest = sets
            .iter()
            .map(|set| self.internal_cost(dag, attrs, set))
            .max()
            .unwrap_or(0);
        sets.iter()
            .map(|set| self.queue_cost(dag, attrs, set))
            .fold(slowest, u64::saturating_add)
    }
}

impl std::fmt::Debug for CostModel<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CostModel")
            .field("config", &self.config)
            .field("profile", &self.uses_profile())
            .field("callees", &self.callees.is_some())
            .finish()
    }
}
