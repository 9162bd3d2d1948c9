//! Partition graph
//!
//! Nodes are partitions; `p → c` when some SCC of `c` has a parent via clones
//! in `p`. Rebuilt after every merge, it is small enough that no incremental
//! maintenance is worth it.

use crate::features::partition::domain::PartitionId;
use crate::features::scc_attrs::SccDagAttrs;
use crate::features::sccdag::SccId;
use crate::shared::invariants::InvariantViolation;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionGraph {
    successors: BTreeMap<PartitionId, BTreeSet<PartitionId>>,
    predecessors: BTreeMap<PartitionId, BTreeSet<PartitionId>>,
}

impl PartitionGraph {
    pub fn build(attrs: &SccDagAttrs, partitions: &BTreeMap<PartitionId, BTreeSet<SccId>>) -> Self {
        let owner: BTreeMap<SccId, PartitionId> = partitions
            .iter()
            .flat_map(|(&p, sccs)| sccs.iter().map(move |&s| (s, p)))
            .collect();

        let mut graph = Self::default();
        for &p in partitions.keys() {
            graph.successors.insert(p, BTreeSet::new());
            graph.predecessors.insert(p, BTreeSet::new());
        }

        for (&child, sccs) in partitions {
            for &scc in sccs {
                for parent_scc in attrs.parents_via_clones(scc) {
                    let Some(&parent) = owner.get(&parent_scc) else {
                        continue;
                    };
                    if parent != child {
                        graph.add_edge(parent, child);
                    }
                }
            }
        }
        graph
    }

    fn add_edge(&mut self, from: PartitionId, to: PartitionId) {
        self.successors.entry(from).or_default().insert(to);
        self.predecessors.entry(to).or_default().insert(from);
    }

    pub fn len(&self) -> usize {
        self.successors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }

    /// Parent → child pairs in id order
    pub fn edges(&self) -> Vec<(PartitionId, PartitionId)> {
        self.successors
            .iter()
            .flat_map(|(&p, cs)| cs.iter().map(move |&c| (p, c)))
            .collect()
    }

    pub fn successors(&self, p: PartitionId) -> impl Iterator<Item = PartitionId> + '_ {
        self.successors.get(&p).into_iter().flatten().copied()
    }

    pub fn predecessors(&self, p: PartitionId) -> impl Iterator<Item = PartitionId> + '_ {
        self.predecessors.get(&p).into_iter().flatten().copied()
    }

    fn reach(
        start: PartitionId,
        next: &BTreeMap<PartitionId, BTreeSet<PartitionId>>,
    ) -> BTreeSet<PartitionId> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<PartitionId> = VecDeque::from([start]);
        while let Some(p) = queue.pop_front() {
            for &n in next.get(&p).into_iter().flatten() {
                if seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }
        seen
    }

    /// Partitions reachable from `p`, `p` excluded unless on a cycle
    pub fn descendants(&self, p: PartitionId) -> BTreeSet<PartitionId> {
        Self::reach(p, &self.successors)
    }

    pub fn ancestors(&self, p: PartitionId) -> BTreeSet<PartitionId> {
        Self::reach(p, &self.predecessors)
    }

    /// Smallest set containing `a` and `b` whose merge keeps the graph acyclic
    pub fn closure(&self, a: PartitionId, b: PartitionId) -> BTreeSet<PartitionId> {
        let (desc_a, anc_a) = (self.descendants(a), self.ancestors(a));
        let (desc_b, anc_b) = (self.descendants(b), self.ancestors(b));

        let mut closure = BTreeSet::from([a, b]);
        closure.extend(desc_a.intersection(&anc_b).copied());
        closure.extend(desc_b.intersection(&anc_a).copied());
        closure
    }

    /// Kahn order, smallest id first among ready nodes
    pub fn topological_order(&self) -> Option<Vec<PartitionId>> {
        let mut indegree: BTreeMap<PartitionId, usize> = self
            .predecessors
            .iter()
            .map(|(&p, preds)| (p, preds.len()))
            .collect();
        let mut ready: BTreeSet<PartitionId> = indegree
            .iter()
            .filter(|(_, &d)| d == 0)
            .map(|(&p, _)| p)
            .collect();

        let mut order = Vec::with_capacity(indegree.len());
        while let Some(p) = ready.pop_first() {
            order.push(p);
            for c in self.successors(p) {
                if let Some(d) = indegree.get_mut(&c) {
                    *d -= 1;
                    if *d == 0 {
                        ready.insert(c);
                    }
                }
            }
        }

        (order.len() == self.len()).then_some(order)
    }

    pub fn verify_acyclic(&self) -> Result<(), InvariantViolation> {
        match self.topological_order() {
            Some(_) => Ok(()),
            None => {
                let partitions = self
                    .successors
                    .keys()
                    .copied()
                    .filter(|&p| self.descendants(p).contains(&p))
                    .collect();
                Err(InvariantViolation::CyclicPartitionGraph { partitions })
            }
        }
    }
}
