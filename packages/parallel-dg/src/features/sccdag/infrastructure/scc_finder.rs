//! Strongly Connected Component Detection
//!
//! Tarjan's algorithm, iterative so deep dependence chains cannot overflow
//! the call stack.
//!
//! # References
//! - Tarjan, R. "Depth-First Search and Linear Graph Algorithms" (1972)

use crate::features::dg::{GraphView, NodeId};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use std::hash::Hash;

struct Frame<N> {
    node: N,
    successors: Vec<N>,
    next: usize,
}

struct TarjanState<N> {
    index: FxHashMap<N, usize>,
    lowlink: FxHashMap<N, usize>,
    on_stack: FxHashSet<N>,
    stack: Vec<N>,
    current_index: usize,
    components: Vec<Vec<N>>,
}

impl<N: Copy + Eq + Hash + Ord> TarjanState<N> {
    fn new() -> Self {
        Self {
            index: FxHashMap::default(),
            lowlink: FxHashMap::default(),
            on_stack: FxHashSet::default(),
            stack: Vec::new(),
            current_index: 0,
            components: Vec::new(),
        }
    }

    fn enter(&mut self, node: N) {
        self.index.insert(node, self.current_index);
        self.lowlink.insert(node, self.current_index);
        self.current_index += 1;
        self.stack.push(node);
        self.on_stack.insert(node);
    }

    fn lower(&mut self, node: N, candidate: usize) {
        if let Some(low) = self.lowlink.get_mut(&node) {
            *low = (*low).min(candidate);
        }
    }

    /// Pop the component rooted at `root` off the SCC stack
    fn emit(&mut self, root: N) {
        let mut component = Vec::new();
        while let Some(w) = self.stack.pop() {
            self.on_stack.remove(&w);
            component.push(w);
            if w == root {
                break;
            }
        }
        component.sort_unstable();
        self.components.push(component);
    }
}

/// Tarjan's SCC algorithm over an implicit graph
///
/// Every node yielded by `nodes` lands in exactly one component; successors
/// outside `nodes` are still explored. Components come out in reverse
/// topological order with members sorted.
///
/// Time: O(V + E)
/// Space: O(V)
pub fn strongly_connected_components<N, I, F, S>(nodes: I, successors: F) -> Vec<Vec<N>>
where
    N: Copy + Eq + Hash + Ord,
    I: IntoIterator<Item = N>,
    F: Fn(N) -> S,
    S: IntoIterator<Item = N>,
{
    let mut state = TarjanState::new();
    let mut dfs: Vec<Frame<N>> = Vec::new();

    for root in nodes {
        if state.index.contains_key(&root) {
            continue;
        }
        state.enter(root);
        dfs.push(Frame {
            node: root,
            successors: successors(root).into_iter().collect(),
            next: 0,
        });

        while let Some(frame) = dfs.last_mut() {
            if frame.next < frame.successors.len() {
                let v = frame.node;
                let w = frame.successors[frame.next];
                frame.next += 1;

                match state.index.get(&w).copied() {
                    None => {
                        state.enter(w);
                        dfs.push(Frame {
                            node: w,
                            successors: successors(w).into_iter().collect(),
                            next: 0,
                        });
                    }
                    Some(w_index) if state.on_stack.contains(&w) => state.lower(v, w_index),
                    Some(_) => {}
                }
                continue;
            }

            let v = frame.node;
            dfs.pop();
            let v_low = state.lowlink[&v];
            if v_low == state.index[&v] {
                state.emit(v);
            }
            if let Some(parent) = dfs.last() {
                let parent = parent.node;
                state.lower(parent, v_low);
            }
        }
    }

    state.components
}

/// Node set of one component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentNodes {
    pub nodes: BTreeSet<NodeId>,
    /// More than one node, or a single node with a self-edge
    pub has_cycle: bool,
}

/// SCC decomposition of a dependence graph or subgraph view
pub struct SccFinder;

impl SccFinder {
    /// Components of `view`, ordered by their smallest node
    pub fn find<T, V: GraphView<T>>(view: &V) -> Vec<ComponentNodes> {
        let members = view.members();
        let raw = strongly_connected_components(members, |n| view.successors_in_view(n));

        let mut components: Vec<ComponentNodes> = raw
            .into_iter()
            .map(|nodes| {
                let has_cycle = nodes.len() > 1
                    || nodes
                        .first()
                        .is_some_and(|&n| view.successors_in_view(n).contains(&n));
                ComponentNodes {
                    nodes: nodes.into_iter().collect(),
                    has_cycle,
                }
            })
            .collect();

        components.sort_by_key(|c| c.nodes.iter().next().copied());
        components
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::dg::{Dependence, DependenceGraph};

    fn edges_graph(n: usize, edges: &[(usize, usize)]) -> (DependenceGraph<usize>, Vec<NodeId>) {
        let mut g = DependenceGraph::new();
        let ids: Vec<NodeId> = (0..n).map(|i| g.add_node(i)).collect();
        for &(a, b) in edges {
            g.add_edge(ids[a], ids[b], Dependence::data());
        }
        (g, ids)
    }

    #[test]
    fn test_tarjan_simple_cycle() {
        let adj: Vec<Vec<u32>> = vec![vec![1], vec![2], vec![0, 3], vec![]];
        let sccs = strongly_connected_components(0..4u32, |n| adj[n as usize].clone());
        assert_eq!(sccs.len(), 2);
        // Reverse topological: the tail comes first
        assert_eq!(sccs[0], vec![3]);
        assert_eq!(sccs[1], vec![0, 1, 2]);
    }

    #[test]
    fn test_tarjan_deep_chain_does_not_recurse() {
        let n = 200_000u32;
        let sccs = strongly_connected_components(0..n, |v| {
            if v + 1 < n {
                vec![v + 1]
            } else {
                vec![0]
            }
        });
        assert_eq!(sccs.len(), 1);
        assert_eq!(sccs[0].len(), n as usize);
    }

    #[test]
    fn test_tarjan_two_cycles_linked() {
        // 0<->1 -> 2<->3
        let adj: Vec<Vec<u32>> = vec![vec![1], vec![0, 2], vec![3], vec![2]];
        let mut sccs = strongly_connected_components(0..4u32, |n| adj[n as usize].clone());
        sccs.sort();
        assert_eq!(sccs, vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn test_finder_self_loop_and_isolated() {
        let (g, ids) = edges_graph(3, &[(0, 0), (1, 2)]);
        let comps = SccFinder::find(&g);
        assert_eq!(comps.len(), 3);

        assert_eq!(comps[0].nodes, [ids[0]].into_iter().collect());
        assert!(comps[0].has_cycle);
        assert!(!comps[1].has_cycle);
        assert!(!comps[2].has_cycle);
    }

    #[test]
    fn test_finder_on_subgraph_ignores_outside_edges() {
        // 0 -> 1 -> 2 -> 0, but the view drops 2
        let (g, ids) = edges_graph(3, &[(0, 1), (1, 2), (2, 0)]);
        assert_eq!(SccFinder::find(&g).len(), 1);

        let view = g.subgraph([ids[0], ids[1]]);
        let comps = SccFinder::find(&view);
        assert_eq!(comps.len(), 2);
        assert!(comps.iter().all(|c| !c.has_cycle));
    }

    #[test]
    fn test_finder_is_deterministic() {
        let (g, _) = edges_graph(6, &[(0, 1), (1, 0), (2, 3), (3, 4), (4, 2), (5, 5), (1, 2)]);
        assert_eq!(SccFinder::find(&g), SccFinder::find(&g));
    }
}
