//! Test data builders

use parallel_dg::features::pdg::infrastructure::RegionOracles;
use parallel_dg::shared::models::BinaryOp;
use parallel_dg::{
    build_pdg, Certainty, DataHazard, Dependence, EngineConfig, InstId, Instruction, Operand,
    ProgramDependenceGraph, Region, RegionKind,
};

/// Build the PDG of `region` with the region-local oracles
pub fn pdg_of(region: &Region) -> ProgramDependenceGraph {
    pdg_with(region, &EngineConfig::default())
}

pub fn pdg_with(region: &Region, config: &EngineConfig) -> ProgramDependenceGraph {
    let oracles = RegionOracles::for_region(region);
    build_pdg(region, oracles.oracles(), config).unwrap()
}

/// `%id` operand
pub fn v(id: u32) -> Operand {
    Operand::Inst(InstId(id))
}

/// PDG wired edge by edge, bypassing the oracles
///
/// Instructions are placed in insertion order; edges are loop-carried only
/// when requested.
#[derive(Debug)]
pub struct PdgSketch {
    pdg: ProgramDependenceGraph,
    next_position: usize,
}

impl PdgSketch {
    pub fn new(name: &str, kind: RegionKind) -> Self {
        Self {
            pdg: ProgramDependenceGraph::new(name, kind),
            next_position: 0,
        }
    }

    pub fn function(name: &str) -> Self {
        Self::new(name, RegionKind::Function)
    }

    pub fn loop_body(name: &str) -> Self {
        Self::new(name, RegionKind::Loop)
    }

    pub fn inst(mut self, inst: Instruction) -> Self {
        self.pdg.add_instruction(inst, self.next_position);
        self.next_position += 1;
        self
    }

    /// Plain arithmetic instruction `%id`
    pub fn op(self, id: u32) -> Self {
        self.inst(Instruction::binary(id, BinaryOp::Add, Operand::Argument(0), Operand::Constant(1)))
    }

    pub fn data(mut self, from: u32, to: u32) -> Self {
        self.pdg.add_dependence(InstId(from), InstId(to), Dependence::data());
        self
    }

    pub fn carried_data(mut self, from: u32, to: u32) -> Self {
        self.pdg
            .add_dependence(InstId(from), InstId(to), Dependence::data().carried(true));
        self
    }

    pub fn memory(mut self, from: u32, to: u32, hazard: DataHazard, certainty: Certainty) -> Self {
        self.pdg
            .add_dependence(InstId(from), InstId(to), Dependence::memory(hazard, certainty));
        self
    }

    pub fn build(self) -> ProgramDependenceGraph {
        self.pdg
    }
}
