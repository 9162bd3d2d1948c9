//! PDG Ports - oracle interfaces consumed while building the PDG
//!
//! The builder never analyzes the IR itself: use-def chains, aliasing and
//! control dependence all come from these traits. Built-in adapters live in
//! `infrastructure/oracles.rs`.

use crate::shared::models::{CallEffect, InstId, Instruction, Opcode, Operand};

/// Result of an alias query between two memory locations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AliasResult {
    NoAlias,
    MayAlias,
    PartialAlias,
    MustAlias,
}

/// Mod/ref behavior of a call with respect to one location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModRefInfo {
    NoModRef,
    Ref,
    Mod,
    ModRef,
}

impl ModRefInfo {
    pub fn reads(self) -> bool {
        matches!(self, ModRefInfo::Ref | ModRefInfo::ModRef)
    }

    pub fn writes(self) -> bool {
        matches!(self, ModRefInfo::Mod | ModRefInfo::ModRef)
    }

    pub fn from_effect(effect: CallEffect) -> Self {
        match effect {
            CallEffect::ReadNone => ModRefInfo::NoModRef,
            CallEffect::ReadOnly => ModRefInfo::Ref,
            CallEffect::WriteOnly => ModRefInfo::Mod,
            CallEffect::ReadWrite => ModRefInfo::ModRef,
        }
    }
}

/// Use-def chains
pub trait UseDefOracle {
    /// Instructions reading the value defined by `value`
    fn users_of(&self, value: InstId) -> Vec<InstId>;
}

/// Alias and mod/ref queries
pub trait AliasOracle {
    /// Relation between the locations addressed by two pointers
    fn alias(&self, a: &Operand, b: &Operand) -> AliasResult;

    /// How `call` may touch the location addressed by `location`
    fn mod_ref(&self, call: &Instruction, location: &Operand) -> ModRefInfo;

    /// Overall memory behavior of a call, used for call/call pairs
    fn call_effect(&self, call: &Instruction) -> ModRefInfo {
        match &call.opcode {
            Opcode::Call { effect, .. } => ModRefInfo::from_effect(*effect),
            _ => ModRefInfo::NoModRef,
        }
    }
}

/// Control dependences
pub trait ControlDependenceOracle {
    /// Instructions whose execution `branch` conditionally guards
    fn control_dependents_of(&self, branch: InstId) -> Vec<InstId>;
}
