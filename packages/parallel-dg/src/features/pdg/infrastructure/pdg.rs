/*
 * PDG (Program Dependence Graph) Module
 *
 * One node per instruction, one edge per dependence:
 * - data:    use-def, RAW, must
 * - control: branch → guarded instruction
 * - memory:  alias-derived, must/may × RAW/WAR/WAW
 *
 * Backed by DependenceGraph<Instruction> (petgraph StableDiGraph).
 */

use crate::features::dg::{
    Certainty, DataHazard, Dependence, DependenceGraph, DependenceKinds, EdgeId, NodeId,
};
use crate::features::pdg::domain::PdgStats;
use crate::shared::models::{InstId, Instruction, RegionKind};
use petgraph::dot::Dot;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Serializable node of a PDG
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdgNodeDto {
    pub position: usize,
    pub instruction: Instruction,
}

/// Serializable edge of a PDG (endpoints by instruction id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdgEdgeDto {
    pub from: InstId,
    pub to: InstId,
    pub kinds: DependenceKinds,
    pub certainty: Certainty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hazard: Option<DataHazard>,
    #[serde(default)]
    pub loop_carried: bool,
}

/// Serializable DTO for ProgramDependenceGraph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdgDto {
    pub region: String,
    pub kind: RegionKind,
    pub nodes: Vec<PdgNodeDto>,
    pub edges: Vec<PdgEdgeDto>,
}

/// Program Dependence Graph of one region
#[derive(Debug, Clone)]
pub struct ProgramDependenceGraph {
    graph: DependenceGraph<Instruction>,
    node_map: FxHashMap<InstId, NodeId>,
    positions: FxHashMap<NodeId, usize>,
    /// Region this PDG was built from
    pub region: String,
    pub kind: RegionKind,
}

// Custom serde implementation via DTO
impl Serialize for ProgramDependenceGraph {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_dto().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ProgramDependenceGraph {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let dto = PdgDto::deserialize(deserializer)?;
        let mut pdg = ProgramDependenceGraph::new(dto.region, dto.kind);

        for node in dto.nodes {
            pdg.add_instruction(node.instruction, node.position);
        }

        for edge in dto.edges {
            let dependence = Dependence {
                kinds: edge.kinds,
                certainty: edge.certainty,
                hazard: edge.hazard,
                loop_carried: edge.loop_carried,
                sub_edges: Vec::new(),
            };
            if pdg.add_dependence(edge.from, edge.to, dependence).is_none() {
                return Err(serde::de::Error::custom(format!(
                    "edge {} -> {} references an unknown instruction",
                    edge.from, edge.to
                )));
            }
        }

        Ok(pdg)
    }
}

impl ProgramDependenceGraph {
    /// Create new empty PDG
    pub fn new(region: impl Into<String>, kind: RegionKind) -> Self {
        Self {
            graph: DependenceGraph::new(),
            node_map: FxHashMap::default(),
            positions: FxHashMap::default(),
            region: region.into(),
            kind,
        }
    }

    /// Add an instruction node at its program-order position
    pub fn add_instruction(&mut self, instruction: Instruction, position: usize) -> NodeId {
        let id = instruction.id;
        if let Some(&existing) = self.node_map.get(&id) {
            return existing;
        }
        let node = self.graph.add_node(instruction);
        self.node_map.insert(id, node);
        self.positions.insert(node, position);
        node
    }

    /// Add a dependence between two instructions; `None` if either has no node
    pub fn add_dependence(&mut self, from: InstId, to: InstId, dependence: Dependence) -> Option<EdgeId> {
        let from = *self.node_map.get(&from)?;
        let to = *self.node_map.get(&to)?;
        Some(self.graph.add_edge(from, to, dependence))
    }

    pub fn graph(&self) -> &DependenceGraph<Instruction> {
        &self.graph
    }

    pub fn node_of(&self, id: InstId) -> Option<NodeId> {
        self.node_map.get(&id).copied()
    }

    pub fn instruction(&self, node: NodeId) -> Option<&Instruction> {
        self.graph.node(node)
    }

    /// Instruction id of a node
    pub fn inst_id(&self, node: NodeId) -> Option<InstId> {
        self.graph.node(node).map(|i| i.id)
    }

    pub fn position(&self, node: NodeId) -> Option<usize> {
        self.positions.get(&node).copied()
    }

    pub fn dependence(&self, edge: EdgeId) -> Option<&Dependence> {
        self.graph.edge(edge)
    }

    pub fn contains_instruction(&self, id: InstId) -> bool {
        self.node_map.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_loop(&self) -> bool {
        self.kind == RegionKind::Loop
    }

    /// Nodes in program order
    pub fn nodes_in_program_order(&self) -> Vec<NodeId> {
        let mut nodes = self.graph.node_ids();
        nodes.sort_by_key(|n| (self.positions.get(n).copied().unwrap_or(usize::MAX), *n));
        nodes
    }

    /// Incoming edges (what `id` depends on)
    pub fn dependences_of(&self, id: InstId) -> Vec<EdgeId> {
        self.node_of(id)
            .map(|n| self.graph.incoming(n))
            .unwrap_or_default()
    }

    /// Outgoing edges (what depends on `id`)
    pub fn dependents_of(&self, id: InstId) -> Vec<EdgeId> {
        self.node_of(id)
            .map(|n| self.graph.outgoing(n))
            .unwrap_or_default()
    }

    /// Edges between two instructions, in index order
    pub fn edges_between(&self, from: InstId, to: InstId) -> Vec<EdgeId> {
        match (self.node_of(from), self.node_of(to)) {
            (Some(f), Some(t)) => self.graph.edges_between(f, t),
            _ => Vec::new(),
        }
    }

    pub fn loop_carried_edges(&self) -> Vec<EdgeId> {
        self.graph
            .edges()
            .filter(|(_, _, _, dep)| dep.loop_carried)
            .map(|(id, _, _, _)| id)
            .collect()
    }

    /// Get statistics
    pub fn get_stats(&self) -> PdgStats {
        let mut stats = PdgStats {
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            ..PdgStats::default()
        };

        for (_, _, _, dep) in self.graph.edges() {
            if dep.is_control() {
                stats.control_edges += 1;
            }
            if dep.is_data() {
                stats.data_edges += 1;
            }
            if dep.is_memory() {
                stats.memory_edges += 1;
                if dep.is_must() {
                    stats.must_memory_edges += 1;
                } else {
                    stats.may_memory_edges += 1;
                }
            }
            if dep.loop_carried {
                stats.loop_carried_edges += 1;
            }
        }

        stats
    }

    pub fn to_dto(&self) -> PdgDto {
        let nodes = self
            .nodes_in_program_order()
            .into_iter()
            .filter_map(|n| {
                Some(PdgNodeDto {
                    position: self.position(n)?,
                    instruction: self.graph.node(n)?.clone(),
                })
            })
            .collect();

        let edges = self
            .graph
            .edges()
            .filter_map(|(_, from, to, dep)| {
                Some(PdgEdgeDto {
                    from: self.inst_id(from)?,
                    to: self.inst_id(to)?,
                    kinds: dep.kinds,
                    certainty: dep.certainty,
                    hazard: dep.hazard,
                    loop_carried: dep.loop_carried,
                })
            })
            .collect();

        PdgDto {
            region: self.region.clone(),
            kind: self.kind,
            nodes,
            edges,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Graphviz rendering; may edges dashed, loop-carried edges red
    pub fn to_dot(&self) -> String {
        let graph = self.graph.inner();
        let dot = Dot::with_attr_getters(
            graph,
            &[],
            &|_, edge| {
                let dep = edge.weight();
                let mut attrs = Vec::new();
                if !dep.is_must() {
                    attrs.push("style=dashed");
                }
                if dep.loop_carried {
                    attrs.push("color=red");
                }
                attrs.join(", ")
            },
            &|_, _| "shape=box".to_string(),
        );
        format!("{}", dot)
    }
}
