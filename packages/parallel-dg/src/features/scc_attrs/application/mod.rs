//! SCC Classifier
//!
//! Decides the execution semantics of every SCCDAG node.
//!
//! Preference order when several kinds apply:
//! `Independent > Reducible > Clonable > Sequential`.
//!
//! - Independent: no internal loop-carried dependence left after pruning
//!   `may` memory edges the iteration-domain oracle proves disjoint
//! - Reducible: one phi feeding an accumulator chain (see
//!   [`patterns::detect_reduction`]) whose values stay inside the SCC
//! - Clonable: syntactic sugar only, compare/branch only, an induction
//!   variable, or memory accesses proven disjoint across iterations
//! - Sequential: everything else
//!
//! The clonable flag is kept separately from the kind: an Independent GEP is
//! still replicated rather than given its own partition.

use crate::config::ClassifierConfig;
use crate::features::dg::{DependenceKinds, EdgeId, NodeId};
use crate::features::scc_attrs::domain::{SccAttrs, SccKind};
use crate::features::scc_attrs::infrastructure::patterns;
use crate::features::scc_attrs::infrastructure::SccDagAttrs;
use crate::features::scc_attrs::ports::IterationDomainOracle;
use crate::features::sccdag::{SccDag, SccId};
use crate::shared::models::{Instruction, Operand};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Labels SCCDAG nodes with an [`SccKind`]
#[derive(Clone)]
pub struct SccClassifier<'o> {
    config: ClassifierConfig,
    iteration_domain: Option<&'o dyn IterationDomainOracle>,
}

impl<'o> SccClassifier<'o> {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            iteration_domain: None,
        }
    }

    pub fn with_iteration_domain(mut self, oracle: &'o dyn IterationDomainOracle) -> Self {
        self.iteration_domain = Some(oracle);
        self
    }

    /// Classify every SCC of `dag`
    pub fn classify(&self, dag: &SccDag<'_>) -> SccDagAttrs {
        if self.config.memory_cloning && self.iteration_domain.is_none() {
            warn!("no iteration-domain oracle, memory-disjointness cloning skipped");
        }

        let attrs: BTreeMap<SccId, SccAttrs> = dag
            .scc_ids()
            .into_iter()
            .map(|id| (id, self.classify_scc(dag, id)))
            .collect();
        let result = SccDagAttrs::new(dag, attrs);

        let stats = result.get_stats();
        info!(
            region = %dag.pdg().region,
            independent = stats.independent,
            reducible = stats.reducible,
            clonable = stats.clonable,
            sequential = stats.sequential,
            replicated = stats.replicated,
            "SCCs classified"
        );
        result
    }

    /// Classify one SCC
    pub fn classify_scc(&self, dag: &SccDag<'_>, id: SccId) -> SccAttrs {
        let pdg = dag.pdg();
        let members = dag.instructions(id);
        let has_cycle = dag.scc(id).is_some_and(|s| s.has_cycle);

        let loop_carried_edges: Vec<EdgeId> = dag
            .internal_loop_carried_edges(id)
            .into_iter()
            .filter(|&edge| !self.proven_disjoint(dag, edge))
            .collect();

        let internal = dag.internal_edges(id);
        let memory_only_cycle = has_cycle
            && !internal.is_empty()
            && internal
                .iter()
                .all(|&e| pdg.dependence(e).is_some_and(|d| d.kinds == DependenceKinds::MEMORY));

        let induction_variable = if has_cycle {
            let invariant = |op: &Operand| op.as_inst().map_or(true, |v| !pdg.contains_instruction(v));
            patterns::detect_induction_variable(&members, invariant)
        } else {
            None
        };

        let reduction = if has_cycle && !Self::values_escape(dag, id) {
            patterns::detect_reduction(&members, self.config.float_as_real)
        } else {
            None
        };

        let clonable = patterns::is_syntactic_sugar_only(&members)
            || patterns::is_control_only(&members)
            || induction_variable.is_some()
            || self.memory_disjoint(&members);

        let kind = if loop_carried_edges.is_empty() {
            SccKind::Independent
        } else if let Some(info) = &reduction {
            SccKind::Reducible {
                op: info.op,
                identity: info.identity,
            }
        } else if clonable {
            SccKind::Clonable
        } else {
            SccKind::Sequential
        };

        debug!(
            scc = id.index(),
            size = members.len(),
            kind = %kind,
            clonable,
            carried = loop_carried_edges.len(),
            "classified SCC"
        );

        SccAttrs {
            id,
            kind,
            has_cycle,
            clonable,
            induction_variable,
            reduction,
            memory_only_cycle,
            loop_carried_edges,
        }
    }

    /// A `may` memory edge whose endpoints never meet across iterations
    fn proven_disjoint(&self, dag: &SccDag<'_>, edge: EdgeId) -> bool {
        let Some(oracle) = self.iteration_domain else {
            return false;
        };
        let pdg = dag.pdg();
        let Some(dep) = pdg.dependence(edge) else {
            return false;
        };
        if dep.kinds != DependenceKinds::MEMORY || dep.is_must() {
            return false;
        }
        let Some((from, to)) = pdg.graph().edge_endpoints(edge) else {
            return false;
        };
        match (pdg.inst_id(from), pdg.inst_id(to)) {
            (Some(a), Some(b)) => oracle.are_disjoint_across_iterations(a, b),
            _ => false,
        }
    }

    /// Loads and stores whose every pair, self-pairs included, is disjoint
    fn memory_disjoint(&self, members: &[&Instruction]) -> bool {
        let Some(oracle) = self.iteration_domain.filter(|_| self.config.memory_cloning) else {
            return false;
        };
        if !patterns::is_memory_access_only(members) {
            return false;
        }
        members.iter().enumerate().all(|(idx, a)| {
            members[idx..]
                .iter()
                .all(|b| oracle.are_disjoint_across_iterations(a.id, b.id))
        })
    }

    /// Some member value feeds an instruction outside the SCC
    fn values_escape(dag: &SccDag<'_>, id: SccId) -> bool {
        let Some(scc) = dag.scc(id) else {
            return false;
        };
        let graph = dag.pdg().graph();
        scc.internal.iter().any(|&node: &NodeId| {
            graph.outgoing(node).into_iter().any(|edge| {
                let leaves = graph
                    .edge_endpoints(edge)
                    .is_some_and(|(_, to)| !scc.contains(to));
                leaves && graph.edge(edge).is_some_and(|d| d.is_data())
            })
        })
    }
}

impl std::fmt::Debug for SccClassifier<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SccClassifier")
            .field("config", &self.config)
            .field("iteration_domain", &self.iteration_domain.is_some())
            .finish()
    }
}
