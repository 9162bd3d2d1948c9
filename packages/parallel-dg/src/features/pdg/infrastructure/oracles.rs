//! Built-in oracle adapters
//!
//! Self-contained implementations of the PDG ports that answer from the
//! region alone. Hosts with real analyses plug in their own adapters instead.

use crate::features::pdg::application::PdgOracles;
use crate::features::pdg::ports::{
    AliasOracle, AliasResult, ControlDependenceOracle, ModRefInfo, UseDefOracle,
};
use crate::shared::models::{InstId, Instruction, Opcode, Operand, Region};
use rustc_hash::FxHashMap;

// ═══════════════════════════════════════════════════════════════════════════
// Use-def
// ═══════════════════════════════════════════════════════════════════════════

/// Users derived from instruction operands, in program order
#[derive(Debug, Clone, Default)]
pub struct RegionUseDef {
    users: FxHashMap<InstId, Vec<InstId>>,
}

impl RegionUseDef {
    pub fn new(region: &Region) -> Self {
        let mut users: FxHashMap<InstId, Vec<InstId>> = FxHashMap::default();
        for inst in region.iter() {
            for used in inst.inst_operands() {
                let list = users.entry(used).or_default();
                if !list.contains(&inst.id) {
                    list.push(inst.id);
                }
            }
        }
        Self { users }
    }
}

impl UseDefOracle for RegionUseDef {
    fn users_of(&self, value: InstId) -> Vec<InstId> {
        self.users.get(&value).cloned().unwrap_or_default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Alias analysis
// ═══════════════════════════════════════════════════════════════════════════

/// Underlying object a pointer is derived from
#[derive(Debug, Clone, PartialEq, Eq)]
enum Root {
    Alloca(InstId),
    Global(String),
    Argument(u32),
    Opaque(Operand),
}

impl Root {
    /// Distinct identified objects never overlap
    fn is_identified(&self) -> bool {
        matches!(self, Root::Alloca(_) | Root::Global(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Location {
    root: Root,
    offsets: Vec<Operand>,
}

const MAX_GEP_DEPTH: usize = 64;

/// Alias analysis by base object and address-computation offsets
///
/// - same pointer, or same base and offsets ⇒ must
/// - same base, different offsets ⇒ partial
/// - two distinct allocas / globals ⇒ no alias
/// - anything else ⇒ may
///
/// Calls are classified from their declared [`crate::shared::models::CallEffect`].
#[derive(Debug, Clone, Default)]
pub struct BasePointerAliasAnalysis {
    address_defs: FxHashMap<InstId, Instruction>,
}

impl BasePointerAliasAnalysis {
    pub fn new(region: &Region) -> Self {
        let address_defs = region
            .iter()
            .filter(|i| {
                matches!(
                    i.opcode,
                    Opcode::GetElementPtr | Opcode::Cast | Opcode::Alloca
                )
            })
            .map(|i| (i.id, i.clone()))
            .collect();
        Self { address_defs }
    }

    fn resolve(&self, pointer: &Operand) -> Location {
        let mut offsets: Vec<Vec<Operand>> = Vec::new();
        let mut current = pointer.clone();

        let root = loop {
            if offsets.len() > MAX_GEP_DEPTH {
                break Root::Opaque(current);
            }
            let id = match &current {
                Operand::Inst(id) => *id,
                Operand::Global(name) => break Root::Global(name.clone()),
                Operand::Argument(index) => break Root::Argument(*index),
                Operand::Constant(_) => break Root::Opaque(current.clone()),
            };
            let Some(inst) = self.address_defs.get(&id) else {
                break Root::Opaque(current);
            };
            match inst.opcode {
                Opcode::Alloca => break Root::Alloca(id),
                Opcode::GetElementPtr | Opcode::Cast => {
                    let Some(base) = inst.operands.first() else {
                        break Root::Opaque(current);
                    };
                    offsets.push(inst.operands[1..].to_vec());
                    current = base.clone();
                }
                _ => break Root::Opaque(current),
            }
        };

        // Offsets were collected outermost-first
        offsets.reverse();
        Location {
            root,
            offsets: offsets.into_iter().flatten().collect(),
        }
    }
}

impl AliasOracle for BasePointerAliasAnalysis {
    fn alias(&self, a: &Operand, b: &Operand) -> AliasResult {
        if a == b {
            return AliasResult::MustAlias;
        }

        let la = self.resolve(a);
        let lb = self.resolve(b);

        if la.root == lb.root {
            if la.offsets == lb.offsets {
                AliasResult::MustAlias
            } else {
                AliasResult::PartialAlias
            }
        } else if la.root.is_identified() && lb.root.is_identified() {
            AliasResult::NoAlias
        } else {
            AliasResult::MayAlias
        }
    }

    fn mod_ref(&self, call: &Instruction, _location: &Operand) -> ModRefInfo {
        self.call_effect(call)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Control dependence
// ═══════════════════════════════════════════════════════════════════════════

/// Explicit branch → dependents table
#[derive(Debug, Clone, Default)]
pub struct StaticControlDependences {
    dependents: FxHashMap<InstId, Vec<InstId>>,
}

impl StaticControlDependences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: `branch` guards `dependents`
    pub fn with(mut self, branch: u32, dependents: impl IntoIterator<Item = u32>) -> Self {
        for dependent in dependents {
            self.add(InstId(branch), InstId(dependent));
        }
        self
    }

    pub fn add(&mut self, branch: InstId, dependent: InstId) {
        let list = self.dependents.entry(branch).or_default();
        if !list.contains(&dependent) {
            list.push(dependent);
        }
    }

    /// The region's terminating branch guards every other instruction
    pub fn loop_exit(region: &Region) -> Self {
        let mut deps = Self::new();
        let exit = region
            .iter()
            .rev()
            .find(|i| matches!(i.opcode, Opcode::Branch) && !i.operands.is_empty());
        if let Some(exit) = exit {
            for inst in region.iter().filter(|i| i.id != exit.id) {
                deps.add(exit.id, inst.id);
            }
        }
        deps
    }

    pub fn is_empty(&self) -> bool {
        self.dependents.is_empty()
    }
}

impl ControlDependenceOracle for StaticControlDependences {
    fn control_dependents_of(&self, branch: InstId) -> Vec<InstId> {
        self.dependents.get(&branch).cloned().unwrap_or_default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Bundle
// ═══════════════════════════════════════════════════════════════════════════

/// All three PDG oracles derived from one region
#[derive(Debug, Clone)]
pub struct RegionOracles {
    pub use_def: RegionUseDef,
    pub alias: BasePointerAliasAnalysis,
    pub control: StaticControlDependences,
}

impl RegionOracles {
    /// Loop regions get loop-exit control dependences, functions none
    pub fn for_region(region: &Region) -> Self {
        let control = if region.is_loop() {
            StaticControlDependences::loop_exit(region)
        } else {
            StaticControlDependences::new()
        };
        Self {
            use_def: RegionUseDef::new(region),
            alias: BasePointerAliasAnalysis::new(region),
            control,
        }
    }

    pub fn with_control(mut self, control: StaticControlDependences) -> Self {
        self.control = control;
        self
    }

    pub fn oracles(&self) -> PdgOracles<'_> {
        PdgOracles::new()
            .with_use_def(&self.use_def)
            .with_alias(&self.alias)
            .with_control(&self.control)
    }
}
