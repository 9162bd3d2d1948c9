//! Partitioning
//!
//! Turns a classified SCCDAG into the partitions a code generator schedules
//! as workers or pipeline stages.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::Partitioner;
pub use domain::{Partition, PartitionId, PartitionPlan, PartitionSummary};
pub use infrastructure::{CostModel, NoProfile, PartitionGraph, StaticProfile};
pub use ports::{CalleeResolver, ProfileOracle};
