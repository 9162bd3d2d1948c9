//! Shared IR models
//!
//! The engine consumes an already-built IR. These types are the minimal
//! surface it needs: instructions in program order, their operands, and the
//! enclosing region.

pub mod ir;
pub mod region;

pub use ir::{BinaryOp, CallEffect, InstId, Instruction, Opcode, Operand, ValueType};
pub use region::{Module, Region, RegionKind};
