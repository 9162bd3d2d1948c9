//! Common test utilities for parallel-dg
//!
//! Region fixtures, a hand-wired PDG builder, and structural assertions
//! shared by the integration tests.

#![allow(dead_code)]

mod assertions;
mod builders;
mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
