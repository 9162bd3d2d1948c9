//! Dependence graph domain models

mod dependence;
mod graph;
mod view;

pub use dependence::{Certainty, DataHazard, Dependence, DependenceKinds};
pub use graph::{DependenceGraph, EdgeId, NodeId};
pub use view::{GraphView, SubGraph};
