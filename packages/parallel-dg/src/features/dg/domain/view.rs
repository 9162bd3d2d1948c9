//! Subgraph views
//!
//! A [`SubGraph`] restricts traversal to a node set of its parent graph. It
//! owns nothing: node and edge handles are the parent's.

use super::graph::{DependenceGraph, EdgeId, NodeId};
use std::collections::BTreeSet;

/// Read-only traversal surface shared by a graph and its subgraph views
pub trait GraphView<T> {
    /// Graph owning the nodes and edges
    fn base(&self) -> &DependenceGraph<T>;

    fn contains(&self, node: NodeId) -> bool;

    /// Member nodes in index order
    fn members(&self) -> Vec<NodeId>;

    /// Outgoing edges whose target is in the view
    fn out_edges(&self, node: NodeId) -> Vec<EdgeId> {
        if !self.contains(node) {
            return Vec::new();
        }
        let base = self.base();
        base.outgoing(node)
            .into_iter()
            .filter(|&e| base.edge_endpoints(e).is_some_and(|(_, to)| self.contains(to)))
            .collect()
    }

    /// Incoming edges whose source is in the view
    fn in_edges(&self, node: NodeId) -> Vec<EdgeId> {
        if !self.contains(node) {
            return Vec::new();
        }
        let base = self.base();
        base.incoming(node)
            .into_iter()
            .filter(|&e| base.edge_endpoints(e).is_some_and(|(from, _)| self.contains(from)))
            .collect()
    }

    /// Distinct in-view successors in index order
    fn successors_in_view(&self, node: NodeId) -> Vec<NodeId> {
        let base = self.base();
        let set: BTreeSet<NodeId> = self
            .out_edges(node)
            .into_iter()
            .filter_map(|e| base.edge_endpoints(e).map(|(_, to)| to))
            .collect();
        set.into_iter().collect()
    }

    /// Every edge with both endpoints in the view, in index order
    fn internal_edges(&self) -> Vec<EdgeId> {
        let mut edges: Vec<EdgeId> = self
            .members()
            .into_iter()
            .flat_map(|n| self.out_edges(n))
            .collect();
        edges.sort_unstable();
        edges
    }
}

impl<T> GraphView<T> for DependenceGraph<T> {
    fn base(&self) -> &DependenceGraph<T> {
        self
    }

    fn contains(&self, node: NodeId) -> bool {
        self.contains_node(node)
    }

    fn members(&self) -> Vec<NodeId> {
        self.node_ids()
    }
}

/// Node-restricted view into a [`DependenceGraph`]
#[derive(Debug, Clone)]
pub struct SubGraph<'g, T> {
    graph: &'g DependenceGraph<T>,
    nodes: BTreeSet<NodeId>,
}

impl<'g, T> SubGraph<'g, T> {
    /// Nodes that are not part of `graph` are dropped
    pub fn new<I>(graph: &'g DependenceGraph<T>, nodes: I) -> Self
    where
        I: IntoIterator<Item = NodeId>,
    {
        let nodes = nodes
            .into_iter()
            .filter(|&n| graph.contains_node(n))
            .collect();
        Self { graph, nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_set(&self) -> &BTreeSet<NodeId> {
        &self.nodes
    }
}

impl<'g, T> GraphView<T> for SubGraph<'g, T> {
    fn base(&self) -> &DependenceGraph<T> {
        self.graph
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    fn members(&self) -> Vec<NodeId> {
        self.nodes.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::dg::Dependence;

    #[test]
    fn test_subgraph_restricts_traversal() {
        let mut g = DependenceGraph::new();
        let a = g.add_node('a');
        let b = g.add_node('b');
        let c = g.add_node('c');
        let ab = g.add_edge(a, b, Dependence::data());
        g.add_edge(b, c, Dependence::data());
        g.add_edge(c, a, Dependence::control());

        let view = g.subgraph([a, b]);
        assert_eq!(view.len(), 2);
        assert!(!view.contains(c));
        assert_eq!(view.internal_edges(), vec![ab]);
        assert_eq!(view.successors_in_view(b), Vec::<NodeId>::new());
        assert!(view.in_edges(a).is_empty());

        // The full graph sees all three edges
        assert_eq!(g.internal_edges().len(), 3);
        assert_eq!(g.successors_in_view(b), vec![c]);
    }

    #[test]
    fn test_subgraph_drops_foreign_nodes() {
        let mut g: DependenceGraph<u8> = DependenceGraph::new();
        let a = g.add_node(0);
        let b = g.add_node(1);
        g.remove_node(b);
        let view = g.subgraph([a, b]);
        assert_eq!(view.members(), vec![a]);
    }
}
