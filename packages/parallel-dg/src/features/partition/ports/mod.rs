//! Partitioner ports
//!
//! The cost model asks a profile for execution counts and a resolver for
//! callee bodies. Both are optional: without them it falls back to fixed
//! latencies.

use crate::shared::models::{Instruction, Region};

/// Execution counts gathered by a profiling run
pub trait ProfileOracle {
    /// False when no profile was collected for this region
    fn is_available(&self) -> bool;

    /// Dynamic instruction count attributed to one instruction per invocation
    fn instruction_count(&self, instruction: &Instruction) -> u64;

    /// Dynamic instruction count of a whole component
    fn component_count(&self, members: &[&Instruction]) -> u64 {
        members
            .iter()
            .map(|inst| self.instruction_count(inst))
            .fold(0u64, u64::saturating_add)
    }
}

/// Finds the body of a called function
pub trait CalleeResolver {
    fn callee_body(&self, name: &str) -> Option<&Region>;
}
