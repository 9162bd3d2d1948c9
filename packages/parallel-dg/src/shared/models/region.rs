//! Regions and modules
//!
//! A [`Region`] is the unit of analysis: an ordered instruction list whose
//! position order is program order. A [`Module`] groups regions by name so
//! call instructions can be resolved to their callee bodies.

use super::ir::{InstId, Instruction};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of region being analyzed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    /// Straight-line function body (no back edge)
    #[default]
    Function,
    /// Loop body, executed once per iteration
    Loop,
}

/// Ordered instruction list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    #[serde(default)]
    pub kind: RegionKind,
    pub instructions: Vec<Instruction>,
}

impl Region {
    pub fn new(name: impl Into<String>, kind: RegionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            instructions: Vec::new(),
        }
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::new(name, RegionKind::Function)
    }

    pub fn loop_body(name: impl Into<String>) -> Self {
        Self::new(name, RegionKind::Loop)
    }

    /// Builder: append an instruction
    pub fn with(mut self, inst: Instruction) -> Self {
        self.instructions.push(inst);
        self
    }

    pub fn push(&mut self, inst: Instruction) {
        self.instructions.push(inst);
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn is_loop(&self) -> bool {
        self.kind == RegionKind::Loop
    }

    /// Program-order position of an instruction
    pub fn position(&self, id: InstId) -> Option<usize> {
        self.instructions.iter().position(|i| i.id == id)
    }

    pub fn get(&self, id: InstId) -> Option<&Instruction> {
        self.instructions.iter().find(|i| i.id == id)
    }

    pub fn contains(&self, id: InstId) -> bool {
        self.get(id).is_some()
    }

    /// Id → position index, built once per analysis
    pub fn position_index(&self) -> FxHashMap<InstId, usize> {
        self.instructions
            .iter()
            .enumerate()
            .map(|(pos, inst)| (inst.id, pos))
            .collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }
}

/// Named collection of regions (one compilation unit)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub regions: BTreeMap<String, Region>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.insert(region);
        self
    }

    pub fn insert(&mut self, region: Region) {
        self.regions.insert(region.name.clone(), region);
    }

    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.get(name)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Load a module from its JSON form
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::Operand;

    fn counter_loop() -> Region {
        Region::loop_body("count")
            .with(Instruction::phi(1, vec![Operand::Constant(0), Operand::Inst(InstId(2))]))
            .with(Instruction::binary(
                2,
                crate::shared::models::BinaryOp::Add,
                Operand::Inst(InstId(1)),
                Operand::Constant(1),
            ))
    }

    #[test]
    fn test_region_positions() {
        let region = counter_loop();
        assert!(region.is_loop());
        assert_eq!(region.len(), 2);
        assert_eq!(region.position(InstId(2)), Some(1));
        assert_eq!(region.position(InstId(9)), None);
        assert_eq!(region.position_index()[&InstId(1)], 0);
    }

    #[test]
    fn test_module_json_roundtrip() {
        let module = Module::new().with_region(counter_loop());
        let json = module.to_json().unwrap();
        assert!(json.contains("\"count\""));

        let loaded = Module::from_json(&json).unwrap();
        assert_eq!(loaded, module);
        assert_eq!(loaded.region("count").map(Region::len), Some(2));
    }
}
