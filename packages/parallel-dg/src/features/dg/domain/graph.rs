/*
 * DependenceGraph<T> - arena-backed directed graph
 *
 * - petgraph StableDiGraph: indices survive node/edge removal
 * - Edges carry a Dependence tag (kinds, certainty, hazard, sub-edges)
 * - Parallel edges are allowed; duplicates are detected by (endpoints, tag)
 * - Every listing is sorted by index so traversals are deterministic
 */

use super::dependence::Dependence;
use super::view::SubGraph;
use petgraph::algo;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use rustc_hash::FxHashSet;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Node handle
pub type NodeId = NodeIndex<u32>;

/// Edge handle
pub type EdgeId = EdgeIndex<u32>;

/// Directed graph of `T` payloads connected by [`Dependence`] edges
#[derive(Debug, Clone)]
pub struct DependenceGraph<T> {
    graph: StableDiGraph<T, Dependence>,
}

impl<T> Default for DependenceGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DependenceGraph<T> {
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::default(),
        }
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    pub fn add_node(&mut self, payload: T) -> NodeId {
        self.graph.add_node(payload)
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, node: NodeId) -> Option<T> {
        self.graph.remove_node(node)
    }

    pub fn node(&self, node: NodeId) -> Option<&T> {
        self.graph.node_weight(node)
    }

    pub fn node_mut(&mut self, node: NodeId) -> Option<&mut T> {
        self.graph.node_weight_mut(node)
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.graph.contains_node(node)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// All live nodes in index order
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.graph.node_indices().collect();
        ids.sort_unstable();
        ids
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &T)> {
        self.node_ids()
            .into_iter()
            .filter_map(move |id| self.graph.node_weight(id).map(|payload| (id, payload)))
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    /// Add an edge, reusing an existing edge with the same endpoints and tag
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, dependence: Dependence) -> EdgeId {
        if let Some(existing) = self
            .graph
            .edges_directed(from, Direction::Outgoing)
            .find(|e| e.target() == to && e.weight().same_tag(&dependence))
            .map(|e| e.id())
        {
            return existing;
        }
        self.graph.add_edge(from, to, dependence)
    }

    pub fn remove_edge(&mut self, edge: EdgeId) -> Option<Dependence> {
        self.graph.remove_edge(edge)
    }

    pub fn edge(&self, edge: EdgeId) -> Option<&Dependence> {
        self.graph.edge_weight(edge)
    }

    pub fn edge_mut(&mut self, edge: EdgeId) -> Option<&mut Dependence> {
        self.graph.edge_weight_mut(edge)
    }

    pub fn edge_endpoints(&self, edge: EdgeId) -> Option<(NodeId, NodeId)> {
        self.graph.edge_endpoints(edge)
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All live edges in index order
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        let mut ids: Vec<EdgeId> = self.graph.edge_indices().collect();
        ids.sort_unstable();
        ids
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, NodeId, NodeId, &Dependence)> {
        self.edge_ids().into_iter().filter_map(move |id| {
            let (from, to) = self.graph.edge_endpoints(id)?;
            Some((id, from, to, self.graph.edge_weight(id)?))
        })
    }

    pub fn outgoing(&self, node: NodeId) -> Vec<EdgeId> {
        self.directed_edges(node, Direction::Outgoing)
    }

    pub fn incoming(&self, node: NodeId) -> Vec<EdgeId> {
        self.directed_edges(node, Direction::Incoming)
    }

    fn directed_edges(&self, node: NodeId, dir: Direction) -> Vec<EdgeId> {
        if !self.graph.contains_node(node) {
            return Vec::new();
        }
        let mut ids: Vec<EdgeId> = self.graph.edges_directed(node, dir).map(|e| e.id()).collect();
        ids.sort_unstable();
        ids
    }

    /// Edges from `from` to `to`, in index order
    pub fn edges_between(&self, from: NodeId, to: NodeId) -> Vec<EdgeId> {
        self.outgoing(from)
            .into_iter()
            .filter(|&e| self.graph.edge_endpoints(e).map(|(_, t)| t) == Some(to))
            .collect()
    }

    /// Distinct successors in index order
    pub fn successors(&self, node: NodeId) -> Vec<NodeId> {
        self.neighbors(node, Direction::Outgoing)
    }

    /// Distinct predecessors in index order
    pub fn predecessors(&self, node: NodeId) -> Vec<NodeId> {
        self.neighbors(node, Direction::Incoming)
    }

    fn neighbors(&self, node: NodeId, dir: Direction) -> Vec<NodeId> {
        if !self.graph.contains_node(node) {
            return Vec::new();
        }
        let set: BTreeSet<NodeId> = self.graph.neighbors_directed(node, dir).collect();
        set.into_iter().collect()
    }

    /// Nodes without incoming edges from other nodes
    pub fn roots(&self) -> Vec<NodeId> {
        self.node_ids()
            .into_iter()
            .filter(|&n| self.predecessors(n).iter().all(|&p| p == n))
            .collect()
    }

    pub fn clear_edges(&mut self) {
        self.graph.clear_edges();
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    /// Nodes reachable from `start` through at least one edge
    pub fn descendants(&self, start: NodeId) -> BTreeSet<NodeId> {
        self.reach(start, Direction::Outgoing)
    }

    /// Nodes that reach `start` through at least one edge
    pub fn ancestors(&self, start: NodeId) -> BTreeSet<NodeId> {
        self.reach(start, Direction::Incoming)
    }

    fn reach(&self, start: NodeId, dir: Direction) -> BTreeSet<NodeId> {
        let mut seen = BTreeSet::new();
        let mut visited = FxHashSet::default();
        let mut worklist: VecDeque<NodeId> = VecDeque::new();
        worklist.push_back(start);

        while let Some(current) = worklist.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            for next in self.neighbors(current, dir) {
                seen.insert(next);
                if !visited.contains(&next) {
                    worklist.push_back(next);
                }
            }
        }
        seen
    }

    pub fn is_acyclic(&self) -> bool {
        !algo::is_cyclic_directed(&self.graph)
    }

    /// Topological order, ties broken by index; `None` if cyclic
    pub fn topological_order(&self) -> Option<Vec<NodeId>> {
        let mut indegree: BTreeMap<NodeId, usize> = self
            .node_ids()
            .into_iter()
            .map(|n| (n, self.predecessors(n).len()))
            .collect();
        let mut ready: BTreeSet<NodeId> = indegree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(n, _)| *n)
            .collect();
        let mut order = Vec::with_capacity(indegree.len());

        while let Some(node) = ready.pop_first() {
            order.push(node);
            for succ in self.successors(node) {
                if let Some(d) = indegree.get_mut(&succ) {
                    *d -= 1;
                    if *d == 0 {
                        ready.insert(succ);
                    }
                }
            }
        }

        (order.len() == self.node_count()).then_some(order)
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// View restricted to `nodes`; shares node identity with this graph
    pub fn subgraph<I>(&self, nodes: I) -> SubGraph<'_, T>
    where
        I: IntoIterator<Item = NodeId>,
    {
        SubGraph::new(self, nodes)
    }

    /// Underlying petgraph arena (read-only)
    pub fn inner(&self) -> &StableDiGraph<T, Dependence> {
        &self.graph
    }
}
