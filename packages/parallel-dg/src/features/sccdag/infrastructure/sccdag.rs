/*
 * SCCDAG - condensation of a PDG into strongly connected components
 *
 * - One DAG node per SCC (DependenceGraph<Scc>)
 * - One DAG edge per ordered component pair; sub-edges remember the PDG edges
 * - Aggregate edge is must only if every sub-edge is must
 * - merge_components collapses a component set and recomputes edges
 *
 * Component ids are stable: merges keep the smallest id of the merged set.
 */

use super::scc_finder::SccFinder;
use crate::errors::{EngineError, Result};
use crate::features::dg::{Dependence, DependenceGraph, EdgeId, GraphView, NodeId};
use crate::features::pdg::ProgramDependenceGraph;
use crate::features::sccdag::domain::{Scc, SccDagDto, SccDagStats, SccDto, SccEdgeDto, SccId};
use crate::shared::invariants::{enforce, InvariantViolation};
use crate::shared::models::{InstId, Instruction};
use petgraph::dot::Dot;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Condensation graph of one PDG
#[derive(Debug, Clone)]
pub struct SccDag<'g> {
    pdg: &'g ProgramDependenceGraph,
    graph: DependenceGraph<Scc>,
    scc_of: FxHashMap<NodeId, SccId>,
    /// PDG nodes that must be covered (the whole PDG, or a view of it)
    scope: BTreeSet<NodeId>,
    verify_invariants: bool,
}

impl<'g> SccDag<'g> {
    /// Condense the whole PDG
    pub fn condense(pdg: &'g ProgramDependenceGraph) -> Self {
        Self::from_view(pdg, pdg.graph())
    }

    /// Condense a node-restricted view of the PDG (e.g. one loop body)
    pub fn from_view<V: GraphView<Instruction>>(pdg: &'g ProgramDependenceGraph, view: &V) -> Self {
        let components = SccFinder::find(view);

        let mut dag = Self {
            pdg,
            graph: DependenceGraph::new(),
            scc_of: FxHashMap::default(),
            scope: view.members().into_iter().collect(),
            verify_invariants: true,
        };

        for component in components {
            let nodes = component.nodes.clone();
            let id = dag.graph.add_node(Scc::new(component.nodes, component.has_cycle));
            for node in nodes {
                dag.scc_of.insert(node, id);
            }
        }

        dag.recompute_edges();

        let stats = dag.get_stats();
        info!(
            region = %pdg.region,
            sccs = stats.scc_count,
            edges = stats.edge_count,
            cyclic = stats.cyclic_sccs,
            "SCCDAG built"
        );
        debug!(
            largest = stats.largest_scc,
            sub_edges = stats.sub_edges,
            must = stats.must_edges,
            may = stats.may_edges,
            "SCCDAG edge summary"
        );

        dag
    }

    /// Toggle the structural check after every merge
    pub fn with_verification(mut self, enabled: bool) -> Self {
        self.verify_invariants = enabled;
        self
    }

    /// Rebuild DAG edges and external boundaries from the PDG
    fn recompute_edges(&mut self) {
        self.graph.clear_edges();
        for id in self.graph.node_ids() {
            if let Some(scc) = self.graph.node_mut(id) {
                scc.external.clear();
            }
        }

        let mut aggregates: BTreeMap<(SccId, SccId), Dependence> = BTreeMap::new();
        let mut boundary: Vec<(SccId, NodeId, bool)> = Vec::new();

        for (edge, from, to, dep) in self.pdg.graph().edges() {
            let src = self.scc_of.get(&from).copied();
            let dst = self.scc_of.get(&to).copied();
            match (src, dst) {
                (Some(a), Some(b)) if a == b => {}
                (Some(a), Some(b)) => {
                    aggregates
                        .entry((a, b))
                        .or_insert_with(Dependence::aggregate)
                        .absorb(edge, dep);
                    boundary.push((a, to, false));
                    boundary.push((b, from, true));
                }
                // Edges leaving the condensed view only extend the boundary
                (Some(a), None) => boundary.push((a, to, false)),
                (None, Some(b)) => boundary.push((b, from, true)),
                (None, None) => {}
            }
        }

        for (scc, node, incoming) in boundary {
            if let Some(scc) = self.graph.node_mut(scc) {
                scc.mark_external(node, incoming);
            }
        }

        for ((a, b), dep) in aggregates {
            #[cfg(feature = "trace")]
            tracing::trace!(from = a.index(), to = b.index(), sub_edges = dep.sub_edges.len(), "SCCDAG edge");
            self.graph.add_edge(a, b, dep);
        }
    }

    // ------------------------------------------------------------------
    // Merge
    // ------------------------------------------------------------------

    /// Collapse `components` into one SCC and return its id
    ///
    /// The surviving id is the smallest of the set. Fails without touching
    /// the DAG if fewer than two distinct components are given, if an id is
    /// unknown, or if a component outside the set lies on a path between two
    /// members (the merged node would sit on a cycle).
    pub fn merge_components(&mut self, components: &[SccId]) -> Result<SccId> {
        let set: BTreeSet<SccId> = components.iter().copied().collect();
        if set.len() < 2 {
            return Err(EngineError::invalid_merge(format!(
                "need at least two distinct components, got {}",
                set.len()
            )));
        }
        if let Some(unknown) = set.iter().find(|&&id| !self.graph.contains_node(id)) {
            return Err(EngineError::UnknownComponent(unknown.index()));
        }

        let through = self.nodes_between(&set);
        if !through.is_empty() {
            return Err(EngineError::MergeIntroducesCycle {
                components: set.iter().map(|id| id.index()).collect(),
                through: through.iter().map(|id| id.index()).collect(),
            });
        }

        let mut members = set.iter().copied();
        let Some(survivor) = members.next() else {
            return Err(EngineError::invalid_merge("empty component set"));
        };
        let before = self.graph.node_count();

        let mut absorbed = BTreeSet::new();
        for id in members {
            if let Some(scc) = self.graph.remove_node(id) {
                absorbed.extend(scc.internal);
            }
        }
        for &node in &absorbed {
            self.scc_of.insert(node, survivor);
        }
        let mut internal = self
            .graph
            .node(survivor)
            .map(|scc| scc.internal.clone())
            .unwrap_or_default();
        internal.extend(absorbed);
        // Cyclic only if the merged members still reach each other internally
        let has_cycle = SccFinder::find(&self.pdg.graph().subgraph(internal.iter().copied()))
            .iter()
            .any(|c| c.has_cycle);
        if let Some(scc) = self.graph.node_mut(survivor) {
            scc.internal = internal;
            scc.has_cycle = has_cycle;
        }

        self.recompute_edges();

        info!(
            survivor = survivor.index(),
            merged = set.len(),
            before,
            after = self.graph.node_count(),
            "merged SCCDAG components"
        );

        if self.verify_invariants {
            self.verify_or_abort();
        }
        Ok(survivor)
    }

    /// Components outside `set` that are reachable from one member and reach another
    fn nodes_between(&self, set: &BTreeSet<SccId>) -> BTreeSet<SccId> {
        let mut below = BTreeSet::new();
        let mut above = BTreeSet::new();
        for &id in set {
            below.extend(self.graph.descendants(id));
            above.extend(self.graph.ancestors(id));
        }
        below
            .intersection(&above)
            .filter(|id| !set.contains(id))
            .copied()
            .collect()
    }

    // ------------------------------------------------------------------
    // Invariants
    // ------------------------------------------------------------------

    /// Check coverage, acyclicity and sub-edge soundness
    pub fn verify(&self) -> std::result::Result<(), InvariantViolation> {
        let mut owner: BTreeMap<NodeId, SccId> = BTreeMap::new();
        for (id, scc) in self.graph.nodes() {
            for &node in &scc.internal {
                if let Some(first) = owner.insert(node, id) {
                    return Err(InvariantViolation::NodeInMultipleComponents {
                        node: node.index(),
                        first: first.index(),
                        second: id.index(),
                    });
                }
            }
        }
        if let Some(node) = self.scope.iter().find(|n| !owner.contains_key(n)) {
            return Err(InvariantViolation::UncoveredNode { node: node.index() });
        }

        if !self.graph.is_acyclic() {
            let components = SccFinder::find(&self.graph)
                .into_iter()
                .filter(|c| c.has_cycle)
                .flat_map(|c| c.nodes)
                .map(|n| n.index())
                .collect();
            return Err(InvariantViolation::CyclicSccDag { components });
        }

        for (edge, from, to, dep) in self.graph.edges() {
            let mut all_must = true;
            for &sub in &dep.sub_edges {
                let endpoints = self.pdg.graph().edge_endpoints(sub);
                let placed = endpoints.is_some_and(|(u, v)| {
                    owner.get(&u) == Some(&from) && owner.get(&v) == Some(&to)
                });
                if !placed {
                    return Err(InvariantViolation::MisplacedSubEdge {
                        edge: edge.index(),
                        sub_edge: sub.index(),
                        from: from.index(),
                        to: to.index(),
                    });
                }
                all_must &= self.pdg.dependence(sub).is_some_and(|d| d.is_must());
            }
            if dep.is_must() != all_must {
                return Err(InvariantViolation::CertaintyMismatch {
                    edge: edge.index(),
                    found: dep.certainty.as_str(),
                });
            }
        }

        Ok(())
    }

    pub fn verify_or_abort(&self) {
        enforce(self.verify());
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn pdg(&self) -> &'g ProgramDependenceGraph {
        self.pdg
    }

    pub fn graph(&self) -> &DependenceGraph<Scc> {
        &self.graph
    }

    pub fn scc(&self, id: SccId) -> Option<&Scc> {
        self.graph.node(id)
    }

    pub fn scc_ids(&self) -> Vec<SccId> {
        self.graph.node_ids()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, id: SccId) -> bool {
        self.graph.contains_node(id)
    }

    pub fn scc_of_node(&self, node: NodeId) -> Option<SccId> {
        self.scc_of.get(&node).copied()
    }

    pub fn scc_of_inst(&self, id: InstId) -> Option<SccId> {
        self.pdg.node_of(id).and_then(|n| self.scc_of_node(n))
    }

    pub fn parents(&self, id: SccId) -> Vec<SccId> {
        self.graph.predecessors(id)
    }

    pub fn children(&self, id: SccId) -> Vec<SccId> {
        self.graph.successors(id)
    }

    /// The DAG edge from `from` to `to`, if any
    pub fn edge_between(&self, from: SccId, to: SccId) -> Option<EdgeId> {
        self.graph.edges_between(from, to).into_iter().next()
    }

    pub fn dependence(&self, edge: EdgeId) -> Option<&Dependence> {
        self.graph.edge(edge)
    }

    pub fn descendants(&self, id: SccId) -> BTreeSet<SccId> {
        self.graph.descendants(id)
    }

    pub fn ancestors(&self, id: SccId) -> BTreeSet<SccId> {
        self.graph.ancestors(id)
    }

    /// Components in dependence order, ties by id
    pub fn topological_order(&self) -> Vec<SccId> {
        enforce(self.graph.topological_order().ok_or_else(|| {
            InvariantViolation::CyclicSccDag {
                components: self.scc_ids().iter().map(|id| id.index()).collect(),
            }
        }))
    }

    /// PDG edges with both endpoints inside the component
    pub fn internal_edges(&self, id: SccId) -> Vec<EdgeId> {
        match self.graph.node(id) {
            Some(scc) => self
                .pdg
                .graph()
                .subgraph(scc.internal.iter().copied())
                .internal_edges(),
            None => Vec::new(),
        }
    }

    /// Internal PDG edges that cross iterations
    pub fn internal_loop_carried_edges(&self, id: SccId) -> Vec<EdgeId> {
        self.internal_edges(id)
            .into_iter()
            .filter(|&e| self.pdg.dependence(e).is_some_and(|d| d.loop_carried))
            .collect()
    }

    /// Member instructions in program order
    pub fn instructions(&self, id: SccId) -> Vec<&'g Instruction> {
        let Some(scc) = self.graph.node(id) else {
            return Vec::new();
        };
        let pdg = self.pdg;
        let mut nodes: Vec<NodeId> = scc.internal.iter().copied().collect();
        nodes.sort_by_key(|&n| (pdg.position(n), n));
        nodes.into_iter().filter_map(|n| pdg.instruction(n)).collect()
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Get statistics
    pub fn get_stats(&self) -> SccDagStats {
        let mut stats = SccDagStats {
            scc_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            ..SccDagStats::default()
        };
        for (_, scc) in self.graph.nodes() {
            if scc.has_cycle {
                stats.cyclic_sccs += 1;
            }
            stats.largest_scc = stats.largest_scc.max(scc.len());
        }
        for (_, _, _, dep) in self.graph.edges() {
            stats.sub_edges += dep.sub_edges.len();
            if dep.is_must() {
                stats.must_edges += 1;
            } else {
                stats.may_edges += 1;
            }
        }
        stats
    }

    pub fn to_dto(&self) -> SccDagDto {
        let sccs = self
            .graph
            .nodes()
            .map(|(id, scc)| SccDto {
                id: id.index(),
                instructions: self.instructions(id).iter().map(|i| i.id).collect(),
                has_cycle: scc.has_cycle,
            })
            .collect();

        let pdg = self.pdg;
        let edges = self
            .graph
            .edges()
            .map(|(_, from, to, dep)| SccEdgeDto {
                from: from.index(),
                to: to.index(),
                kinds: dep.kinds,
                certainty: dep.certainty,
                loop_carried: dep.loop_carried,
                sub_edges: dep
                    .sub_edges
                    .iter()
                    .filter_map(|&e| {
                        let (u, v) = pdg.graph().edge_endpoints(e)?;
                        Some((pdg.inst_id(u)?, pdg.inst_id(v)?))
                    })
                    .collect(),
            })
            .collect();

        SccDagDto {
            region: pdg.region.clone(),
            sccs,
            edges,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_dto())
    }

    /// Graphviz rendering; cyclic components filled, may edges dashed
    pub fn to_dot(&self) -> String {
        let dot = Dot::with_attr_getters(
            self.graph.inner(),
            &[],
            &|_, edge| {
                if edge.weight().is_must() {
                    String::new()
                } else {
                    "style=dashed".to_string()
                }
            },
            &|_, (_, scc)| {
                if scc.has_cycle {
                    "shape=box, style=filled".to_string()
                } else {
                    "shape=box".to_string()
                }
            },
        );
        format!("{}", dot)
    }
}
