//! SCC classification
//!
//! Labels every SCCDAG node Independent, Reducible, Clonable or Sequential,
//! in that order of preference.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::SccClassifier;
pub use domain::{
    ClassificationStats, InductionVariable, ReductionInfo, ReductionOp, SccAttrs, SccKind,
};
pub use infrastructure::{DisjointAccesses, NoIterationDomain, SccDagAttrs};
pub use ports::IterationDomainOracle;
