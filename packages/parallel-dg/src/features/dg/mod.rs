//! Generic directed dependence graph
//!
//! `DependenceGraph<T>` is an arena of payload nodes and tagged edges. Node and
//! edge handles are dense indices that stay valid across removals, so SCCDAG
//! sub-edges can keep pointing at instruction-level edges.

pub mod domain;

pub use domain::{
    Certainty, DataHazard, Dependence, DependenceGraph, DependenceKinds, EdgeId, GraphView,
    NodeId, SubGraph,
};
