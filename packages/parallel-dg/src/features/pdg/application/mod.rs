//! PDG Application Layer
//!
//! Oracle wiring for PDG construction. The builder itself lives in
//! `infrastructure/builder.rs`; entry point is [`crate::api::build_pdg`].

use crate::features::pdg::ports::{AliasOracle, ControlDependenceOracle, UseDefOracle};

/// Oracles injected into the PDG builder
///
/// Each slot is optional so a missing oracle surfaces as a configuration
/// error at build time instead of a compile-time requirement.
#[derive(Clone, Copy, Default)]
pub struct PdgOracles<'o> {
    pub use_def: Option<&'o dyn UseDefOracle>,
    pub alias: Option<&'o dyn AliasOracle>,
    pub control: Option<&'o dyn ControlDependenceOracle>,
}

impl<'o> PdgOracles<'o> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_use_def(mut self, oracle: &'o dyn UseDefOracle) -> Self {
        self.use_def = Some(oracle);
        self
    }

    pub fn with_alias(mut self, oracle: &'o dyn AliasOracle) -> Self {
        self.alias = Some(oracle);
        self
    }

    pub fn with_control(mut self, oracle: &'o dyn ControlDependenceOracle) -> Self {
        self.control = Some(oracle);
        self
    }
}

impl std::fmt::Debug for PdgOracles<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdgOracles")
            .field("use_def", &self.use_def.is_some())
            .field("alias", &self.alias.is_some())
            .field("control", &self.control.is_some())
            .finish()
    }
}
