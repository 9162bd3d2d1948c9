//! Partition infrastructure

pub mod adapters;
pub mod cost_model;
pub mod partition_graph;

pub use adapters::{NoProfile, StaticProfile};
pub use cost_model::CostModel;
pub use partition_graph::PartitionGraph;
