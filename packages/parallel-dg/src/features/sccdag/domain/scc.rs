//! Strongly connected component payload

use crate::features::dg::NodeId;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Which way dependences cross the component boundary at an external node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Boundary {
    /// The external node feeds the component
    pub incoming: bool,
    /// The component feeds the external node
    pub outgoing: bool,
}

/// One strongly connected component of a PDG
///
/// `internal` holds PDG nodes of the component; `external` maps every PDG
/// node outside it that shares an edge with it to the crossing direction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scc {
    pub internal: BTreeSet<NodeId>,
    pub external: BTreeMap<NodeId, Boundary>,
    pub has_cycle: bool,
}

impl Scc {
    pub fn new(internal: BTreeSet<NodeId>, has_cycle: bool) -> Self {
        Self {
            internal,
            external: BTreeMap::new(),
            has_cycle,
        }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.internal.contains(&node)
    }

    pub fn len(&self) -> usize {
        self.internal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.internal.is_empty()
    }

    /// Smallest internal node (stable identity across recomputation)
    pub fn leader(&self) -> Option<NodeId> {
        self.internal.iter().next().copied()
    }

    /// External nodes feeding this component
    pub fn producers(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.external
            .iter()
            .filter(|(_, b)| b.incoming)
            .map(|(n, _)| *n)
    }

    /// External nodes fed by this component
    pub fn consumers(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.external
            .iter()
            .filter(|(_, b)| b.outgoing)
            .map(|(n, _)| *n)
    }

    pub(crate) fn mark_external(&mut self, node: NodeId, incoming: bool) {
        let boundary = self.external.entry(node).or_default();
        if incoming {
            boundary.incoming = true;
        } else {
            boundary.outgoing = true;
        }
    }
}

impl fmt::Display for Scc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<String> = self.internal.iter().map(|n| n.index().to_string()).collect();
        write!(f, "{{{}}}", members.join(","))?;
        if self.has_cycle {
            write!(f, " ↺")?;
        }
        Ok(())
    }
}
