//! PDG infrastructure: graph storage, builder and built-in oracles

pub mod builder;
pub mod oracles;
pub mod pdg;

pub use builder::PdgBuilder;
pub use oracles::{BasePointerAliasAnalysis, RegionOracles, RegionUseDef, StaticControlDependences};
pub use pdg::{PdgDto, PdgEdgeDto, PdgNodeDto, ProgramDependenceGraph};
