//! Built-in profile and callee adapters

use crate::features::partition::ports::{CalleeResolver, ProfileOracle};
use crate::shared::models::{InstId, Instruction, Module, Region};
use rustc_hash::FxHashMap;

/// No profiling data
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProfile;

impl ProfileOracle for NoProfile {
    fn is_available(&self) -> bool {
        false
    }

    fn instruction_count(&self, _instruction: &Instruction) -> u64 {
        0
    }
}

/// Fixed per-instruction counts; instructions without a count cost nothing
#[derive(Debug, Clone, Default)]
pub struct StaticProfile {
    counts: FxHashMap<InstId, u64>,
}

impl StaticProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, inst: u32, count: u64) -> Self {
        self.counts.insert(InstId(inst), count);
        self
    }

    pub fn insert(&mut self, inst: InstId, count: u64) {
        self.counts.insert(inst, count);
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl ProfileOracle for StaticProfile {
    fn is_available(&self) -> bool {
        !self.counts.is_empty()
    }

    fn instruction_count(&self, instruction: &Instruction) -> u64 {
        self.counts.get(&instruction.id).copied().unwrap_or(0)
    }
}

impl CalleeResolver for Module {
    fn callee_body(&self, name: &str) -> Option<&Region> {
        self.region(name)
    }
}
