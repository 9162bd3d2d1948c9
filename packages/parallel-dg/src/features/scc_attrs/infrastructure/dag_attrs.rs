/*
 * SccDagAttrs - classification of every SCC of one SCCDAG
 *
 * Besides per-SCC attributes it precomputes "parents via clones": clonable
 * SCCs are replicated into their consumers, so for dependence purposes they
 * are transparent. An SCC's parents via clones are the nearest non-clonable
 * ancestors reached through chains of clonable SCCs.
 *
 * The result is a snapshot: it does not borrow the SCCDAG, and it is stale
 * after any merge_components call.
 */

use crate::features::dg::EdgeId;
use crate::features::scc_attrs::domain::{ClassificationStats, SccAttrs, SccKind};
use crate::features::sccdag::{SccDag, SccId};
use std::collections::{BTreeMap, BTreeSet};

/// Per-SCC classification plus clone-transparent parent links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SccDagAttrs {
    attrs: BTreeMap<SccId, SccAttrs>,
    /// SCC → non-clonable parent → DAG edges leaving that parent on the way
    parents_via_clones: BTreeMap<SccId, BTreeMap<SccId, BTreeSet<EdgeId>>>,
    /// SCC → clonable SCCs replicated into it
    clonable_ancestors: BTreeMap<SccId, BTreeSet<SccId>>,
}

impl SccDagAttrs {
    pub fn new(dag: &SccDag<'_>, attrs: BTreeMap<SccId, SccAttrs>) -> Self {
        let mut result = Self {
            attrs,
            parents_via_clones: BTreeMap::new(),
            clonable_ancestors: BTreeMap::new(),
        };

        for id in dag.scc_ids() {
            let (parents, clones) = result.walk_clones(dag, id);
            result.parents_via_clones.insert(id, parents);
            result.clonable_ancestors.insert(id, clones);
        }

        result
    }

    fn walk_clones(
        &self,
        dag: &SccDag<'_>,
        id: SccId,
    ) -> (BTreeMap<SccId, BTreeSet<EdgeId>>, BTreeSet<SccId>) {
        let mut parents: BTreeMap<SccId, BTreeSet<EdgeId>> = BTreeMap::new();
        let mut clones = BTreeSet::new();
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            for parent in dag.parents(current) {
                if self.is_clonable(parent) {
                    if clones.insert(parent) {
                        stack.push(parent);
                    }
                } else {
                    parents
                        .entry(parent)
                        .or_default()
                        .extend(dag.graph().edges_between(parent, current));
                }
            }
        }

        (parents, clones)
    }

    pub fn get(&self, id: SccId) -> Option<&SccAttrs> {
        self.attrs.get(&id)
    }

    pub fn kind(&self, id: SccId) -> Option<SccKind> {
        self.attrs.get(&id).map(|a| a.kind)
    }

    pub fn is_clonable(&self, id: SccId) -> bool {
        self.attrs.get(&id).is_some_and(|a| a.clonable)
    }

    pub fn contains(&self, id: SccId) -> bool {
        self.attrs.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SccId, &SccAttrs)> {
        self.attrs.iter().map(|(id, a)| (*id, a))
    }

    pub fn sccs_where<P>(&self, predicate: P) -> Vec<SccId>
    where
        P: Fn(&SccAttrs) -> bool,
    {
        self.attrs
            .iter()
            .filter(|(_, a)| predicate(a))
            .map(|(id, _)| *id)
            .collect()
    }

    /// SCCs that get their own partition
    pub fn partitionable_sccs(&self) -> Vec<SccId> {
        self.sccs_where(|a| !a.clonable)
    }

    pub fn clonable_sccs(&self) -> Vec<SccId> {
        self.sccs_where(|a| a.clonable)
    }

    /// Nearest non-clonable ancestors, looking through clonable SCCs
    pub fn parents_via_clones(&self, id: SccId) -> Vec<SccId> {
        self.parents_via_clones
            .get(&id)
            .map(|p| p.keys().copied().collect())
            .unwrap_or_default()
    }

    /// DAG edges leaving `parent` on the way to `id`
    pub fn edges_via_clones(&self, id: SccId, parent: SccId) -> Vec<EdgeId> {
        self.parents_via_clones
            .get(&id)
            .and_then(|p| p.get(&parent))
            .map(|edges| edges.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Clonable SCCs reached backwards from `id` through clonable SCCs only
    pub fn clonable_ancestors(&self, id: SccId) -> Vec<SccId> {
        self.clonable_ancestors
            .get(&id)
            .map(|c| c.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn get_stats(&self) -> ClassificationStats {
        let mut stats = ClassificationStats::default();
        for attrs in self.attrs.values() {
            match attrs.kind {
                SccKind::Independent => stats.independent += 1,
                SccKind::Reducible { .. } => stats.reducible += 1,
                SccKind::Clonable => stats.clonable += 1,
                SccKind::Sequential => stats.sequential += 1,
            }
            if attrs.clonable {
                stats.replicated += 1;
            }
        }
        stats
    }
}
