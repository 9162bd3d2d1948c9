//! PDG builder
//!
//! Walks a region in program order and asks the injected oracles for every
//! dependence. Edge direction is source → sink; an edge whose source does not
//! precede its sink in program order flows across iterations and is tagged
//! loop-carried.

use crate::config::{PdgConfig, Validatable};
use crate::errors::{EngineError, Result};
use crate::features::dg::{Certainty, DataHazard, Dependence};
use crate::features::pdg::application::PdgOracles;
use crate::features::pdg::infrastructure::ProgramDependenceGraph;
use crate::features::pdg::ports::{
    AliasOracle, AliasResult, ControlDependenceOracle, ModRefInfo, UseDefOracle,
};
use crate::shared::models::{InstId, Instruction, Opcode, Operand, Region};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info};

/// Read/write behavior of one side of a memory pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Access {
    reads: bool,
    writes: bool,
}

impl Access {
    fn of(inst: &Instruction) -> Self {
        Self {
            reads: inst.reads_memory(),
            writes: inst.writes_memory(),
        }
    }

    fn from_mod_ref(info: ModRefInfo) -> Self {
        Self {
            reads: info.reads(),
            writes: info.writes(),
        }
    }
}

/// Hazards of a dependence from `src` to a later-executing `dst`
fn hazards(src: Access, dst: Access) -> Vec<DataHazard> {
    let mut out = Vec::new();
    if src.writes && dst.reads {
        out.push(DataHazard::RAW);
    }
    if src.reads && dst.writes {
        out.push(DataHazard::WAR);
    }
    if src.writes && dst.writes {
        out.push(DataHazard::WAW);
    }
    out
}

/// Builds a [`ProgramDependenceGraph`] from a region and its oracles
#[derive(Debug, Clone)]
pub struct PdgBuilder<'o> {
    config: PdgConfig,
    oracles: PdgOracles<'o>,
}

impl<'o> PdgBuilder<'o> {
    pub fn new(config: PdgConfig) -> Self {
        Self {
            config,
            oracles: PdgOracles::new(),
        }
    }

    pub fn with_oracles(mut self, oracles: PdgOracles<'o>) -> Self {
        self.oracles = oracles;
        self
    }

    pub fn with_use_def(mut self, oracle: &'o dyn UseDefOracle) -> Self {
        self.oracles.use_def = Some(oracle);
        self
    }

    pub fn with_alias(mut self, oracle: &'o dyn AliasOracle) -> Self {
        self.oracles.alias = Some(oracle);
        self
    }

    pub fn with_control(mut self, oracle: &'o dyn ControlDependenceOracle) -> Self {
        self.oracles.control = Some(oracle);
        self
    }

    /// Build the PDG of `region`
    ///
    /// # Errors
    /// - `Config` if the PDG configuration is invalid
    /// - `MissingOracle` if an enabled dependence kind has no oracle
    /// - `RegionTooLarge` if the region exceeds `max_nodes`
    pub fn build(&self, region: &Region) -> Result<ProgramDependenceGraph> {
        self.config.validate()?;

        let use_def = match (self.config.include_data, self.oracles.use_def) {
            (true, None) => return Err(EngineError::missing_oracle("use-def")),
            (_, oracle) => oracle,
        };
        let alias = match (self.config.include_memory, self.oracles.alias) {
            (true, None) => return Err(EngineError::missing_oracle("alias")),
            (_, oracle) => oracle,
        };
        let control = match (self.config.include_control, self.oracles.control) {
            (true, None) => return Err(EngineError::missing_oracle("control-dependence")),
            (_, oracle) => oracle,
        };

        let mut pdg = ProgramDependenceGraph::new(region.name.clone(), region.kind);
        let members = self.node_candidates(region);
        if members.len() > self.config.max_nodes {
            return Err(EngineError::RegionTooLarge {
                region: region.name.clone(),
                nodes: members.len(),
                limit: self.config.max_nodes,
            });
        }

        let mut positions: FxHashMap<InstId, usize> = FxHashMap::default();
        for (position, inst) in region.iter().enumerate() {
            if members.contains(&inst.id) {
                pdg.add_instruction(inst.clone(), position);
                positions.insert(inst.id, position);
            }
        }

        if let Some(use_def) = use_def.filter(|_| self.config.include_data) {
            self.add_data_edges(&mut pdg, region, &positions, use_def);
        }
        if let Some(control) = control.filter(|_| self.config.include_control) {
            self.add_control_edges(&mut pdg, region, &positions, control);
        }
        if let Some(alias) = alias.filter(|_| self.config.include_memory) {
            self.add_memory_edges(&mut pdg, region, &positions, alias);
        }

        let stats = pdg.get_stats();
        info!(
            region = %region.name,
            nodes = stats.node_count,
            edges = stats.edge_count,
            loop_carried = stats.loop_carried_edges,
            "PDG built"
        );
        debug!(
            control = stats.control_edges,
            data = stats.data_edges,
            memory_must = stats.must_memory_edges,
            memory_may = stats.may_memory_edges,
            "PDG edge breakdown"
        );

        Ok(pdg)
    }

    /// Instructions with a def, a use, or a side effect
    fn node_candidates(&self, region: &Region) -> FxHashSet<InstId> {
        let used: FxHashSet<InstId> = region.iter().flat_map(|i| i.inst_operands()).collect();
        region
            .iter()
            .filter(|i| {
                !i.operands.is_empty()
                    || used.contains(&i.id)
                    || i.has_side_effects()
                    || i.touches_memory()
            })
            .map(|i| i.id)
            .collect()
    }

    fn add_data_edges(
        &self,
        pdg: &mut ProgramDependenceGraph,
        region: &Region,
        positions: &FxHashMap<InstId, usize>,
        use_def: &dyn UseDefOracle,
    ) {
        for inst in region.iter() {
            let Some(&def_pos) = positions.get(&inst.id) else {
                continue;
            };
            for user in use_def.users_of(inst.id) {
                let Some(&use_pos) = positions.get(&user) else {
                    continue;
                };
                let carried = def_pos >= use_pos;
                pdg.add_dependence(inst.id, user, Dependence::data().carried(carried));
                #[cfg(feature = "trace")]
                tracing::trace!(from = %inst.id, to = %user, carried, "data edge");
            }
        }
    }

    fn add_control_edges(
        &self,
        pdg: &mut ProgramDependenceGraph,
        region: &Region,
        positions: &FxHashMap<InstId, usize>,
        control: &dyn ControlDependenceOracle,
    ) {
        for branch in region.iter().filter(|i| matches!(i.opcode, Opcode::Branch)) {
            let Some(&branch_pos) = positions.get(&branch.id) else {
                continue;
            };
            for dependent in control.control_dependents_of(branch.id) {
                let Some(&dep_pos) = positions.get(&dependent) else {
                    continue;
                };
                let carried = branch_pos >= dep_pos;
                pdg.add_dependence(branch.id, dependent, Dependence::control().carried(carried));
                #[cfg(feature = "trace")]
                tracing::trace!(from = %branch.id, to = %dependent, carried, "control edge");
            }
        }
    }

    fn add_memory_edges(
        &self,
        pdg: &mut ProgramDependenceGraph,
        region: &Region,
        positions: &FxHashMap<InstId, usize>,
        alias: &dyn AliasOracle,
    ) {
        let accesses: Vec<&Instruction> = region
            .iter()
            .filter(|i| i.touches_memory() && positions.contains_key(&i.id))
            .collect();
        let carried_edges = region.is_loop() && self.config.loop_carried_memory;

        for (idx, earlier) in accesses.iter().enumerate() {
            for later in &accesses[idx + 1..] {
                let Some((early_access, late_access, certainty)) =
                    memory_relation(earlier, later, alias)
                else {
                    continue;
                };

                for hazard in hazards(early_access, late_access) {
                    pdg.add_dependence(earlier.id, later.id, Dependence::memory(hazard, certainty));
                }
                if carried_edges {
                    for hazard in hazards(late_access, early_access) {
                        pdg.add_dependence(
                            later.id,
                            earlier.id,
                            Dependence::memory(hazard, certainty).carried(true),
                        );
                    }
                }
            }
        }

        if carried_edges {
            // A writer conflicts with its own instance in the next iteration
            for writer in accesses.iter().filter(|i| i.writes_memory()) {
                let certainty = match writer.pointer_operand() {
                    Some(Operand::Inst(_)) | None => Certainty::May,
                    Some(_) => Certainty::Must,
                };
                pdg.add_dependence(
                    writer.id,
                    writer.id,
                    Dependence::memory(DataHazard::WAW, certainty).carried(true),
                );
            }
        }
    }
}

/// Access modes of both sides and the certainty of their overlap;
/// `None` when they cannot touch the same memory
fn memory_relation(
    a: &Instruction,
    b: &Instruction,
    alias: &dyn AliasOracle,
) -> Option<(Access, Access, Certainty)> {
    match (a.is_call(), b.is_call()) {
        (false, false) => {
            let result = alias.alias(a.pointer_operand()?, b.pointer_operand()?);
            let certainty = match result {
                AliasResult::NoAlias => return None,
                AliasResult::MustAlias => Certainty::Must,
                AliasResult::MayAlias | AliasResult::PartialAlias => Certainty::May,
            };
            Some((Access::of(a), Access::of(b), certainty))
        }
        (true, false) => {
            let info = alias.mod_ref(a, b.pointer_operand()?);
            (info != ModRefInfo::NoModRef)
                .then(|| (Access::from_mod_ref(info), Access::of(b), Certainty::May))
        }
        (false, true) => {
            let info = alias.mod_ref(b, a.pointer_operand()?);
            (info != ModRefInfo::NoModRef)
                .then(|| (Access::of(a), Access::from_mod_ref(info), Certainty::May))
        }
        (true, true) => {
            let ea = alias.call_effect(a);
            let eb = alias.call_effect(b);
            (ea != ModRefInfo::NoModRef && eb != ModRefInfo::NoModRef)
                .then(|| (Access::from_mod_ref(ea), Access::from_mod_ref(eb), Certainty::May))
        }
    }
}
