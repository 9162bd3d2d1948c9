//! Instruction-level IR model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense instruction identifier, unique within a [`super::Module`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstId(pub u32);

impl fmt::Display for InstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Instruction operand
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    /// Result of another instruction
    Inst(InstId),
    /// Integer constant (floating-point constants are carried by their bit pattern)
    Constant(i64),
    /// Function argument by position
    Argument(u32),
    /// Named global
    Global(String),
}

impl Operand {
    pub fn as_inst(&self) -> Option<InstId> {
        match self {
            Operand::Inst(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Operand::Constant(_))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Inst(id) => write!(f, "{}", id),
            Operand::Constant(c) => write!(f, "{}", c),
            Operand::Argument(i) => write!(f, "arg{}", i),
            Operand::Global(name) => write!(f, "@{}", name),
        }
    }
}

/// Result type of an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ValueType {
    #[default]
    Void,
    Int(u16),
    Float,
    Double,
    Pointer,
}

impl ValueType {
    pub fn is_floating_point(&self) -> bool {
        matches!(self, ValueType::Float | ValueType::Double)
    }
}

/// Binary arithmetic / logic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    FAdd,
    Sub,
    FSub,
    Mul,
    FMul,
    SDiv,
    UDiv,
    And,
    Or,
    Xor,
    Shl,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::FAdd => "fadd",
            BinaryOp::Sub => "sub",
            BinaryOp::FSub => "fsub",
            BinaryOp::Mul => "mul",
            BinaryOp::FMul => "fmul",
            BinaryOp::SDiv => "sdiv",
            BinaryOp::UDiv => "udiv",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::Shl => "shl",
        }
    }
}

/// Declared memory behavior of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CallEffect {
    ReadNone,
    ReadOnly,
    WriteOnly,
    #[default]
    ReadWrite,
}

/// Instruction opcode
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    Phi,
    Binary(BinaryOp),
    Cast,
    GetElementPtr,
    Alloca,
    Load,
    Store,
    Call {
        callee: Option<String>,
        effect: CallEffect,
    },
    Compare,
    Branch,
    Return,
    Select,
    Other(String),
}

impl Opcode {
    pub fn mnemonic(&self) -> &str {
        match self {
            Opcode::Phi => "phi",
            Opcode::Binary(op) => op.as_str(),
            Opcode::Cast => "cast",
            Opcode::GetElementPtr => "getelementptr",
            Opcode::Alloca => "alloca",
            Opcode::Load => "load",
            Opcode::Store => "store",
            Opcode::Call { .. } => "call",
            Opcode::Compare => "icmp",
            Opcode::Branch => "br",
            Opcode::Return => "ret",
            Opcode::Select => "select",
            Opcode::Other(name) => name,
        }
    }
}

/// One IR instruction
///
/// Operand conventions: `Load [ptr]`, `Store [value, ptr]`,
/// `GetElementPtr [base, idx..]`, `Phi [incoming..]`, `Branch [cond?]`,
/// `Call [args..]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub id: InstId,
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
    #[serde(default)]
    pub ty: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Instruction {
    pub fn new(id: u32, opcode: Opcode, operands: Vec<Operand>) -> Self {
        Instruction {
            id: InstId(id),
            opcode,
            operands,
            ty: ValueType::Void,
            name: None,
        }
    }

    pub fn with_type(mut self, ty: ValueType) -> Self {
        self.ty = ty;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    // ------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------

    pub fn phi(id: u32, incoming: Vec<Operand>) -> Self {
        Self::new(id, Opcode::Phi, incoming).with_type(ValueType::Int(64))
    }

    pub fn binary(id: u32, op: BinaryOp, lhs: Operand, rhs: Operand) -> Self {
        let ty = match op {
            BinaryOp::FAdd | BinaryOp::FSub | BinaryOp::FMul => ValueType::Double,
            _ => ValueType::Int(64),
        };
        Self::new(id, Opcode::Binary(op), vec![lhs, rhs]).with_type(ty)
    }

    pub fn load(id: u32, ptr: Operand) -> Self {
        Self::new(id, Opcode::Load, vec![ptr]).with_type(ValueType::Int(64))
    }

    pub fn store(id: u32, value: Operand, ptr: Operand) -> Self {
        Self::new(id, Opcode::Store, vec![value, ptr])
    }

    pub fn gep(id: u32, base: Operand, index: Operand) -> Self {
        Self::new(id, Opcode::GetElementPtr, vec![base, index]).with_type(ValueType::Pointer)
    }

    pub fn cast(id: u32, value: Operand) -> Self {
        Self::new(id, Opcode::Cast, vec![value]).with_type(ValueType::Int(64))
    }

    pub fn alloca(id: u32) -> Self {
        Self::new(id, Opcode::Alloca, Vec::new()).with_type(ValueType::Pointer)
    }

    pub fn call(id: u32, callee: Option<&str>, effect: CallEffect, args: Vec<Operand>) -> Self {
        Self::new(
            id,
            Opcode::Call {
                callee: callee.map(str::to_string),
                effect,
            },
            args,
        )
    }

    pub fn compare(id: u32, lhs: Operand, rhs: Operand) -> Self {
        Self::new(id, Opcode::Compare, vec![lhs, rhs]).with_type(ValueType::Int(1))
    }

    pub fn branch(id: u32, cond: Option<Operand>) -> Self {
        Self::new(id, Opcode::Branch, cond.into_iter().collect())
    }

    pub fn ret(id: u32, value: Option<Operand>) -> Self {
        Self::new(id, Opcode::Return, value.into_iter().collect())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn is_phi(&self) -> bool {
        matches!(self.opcode, Opcode::Phi)
    }

    pub fn is_call(&self) -> bool {
        matches!(self.opcode, Opcode::Call { .. })
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self.opcode, Opcode::Branch | Opcode::Return)
    }

    pub fn is_compare(&self) -> bool {
        matches!(self.opcode, Opcode::Compare)
    }

    pub fn binary_op(&self) -> Option<BinaryOp> {
        match self.opcode {
            Opcode::Binary(op) => Some(op),
            _ => None,
        }
    }

    /// Phis, address computations and casts: they only produce metadata
    pub fn is_syntactic_sugar(&self) -> bool {
        matches!(self.opcode, Opcode::Phi | Opcode::GetElementPtr | Opcode::Cast)
    }

    pub fn reads_memory(&self) -> bool {
        match &self.opcode {
            Opcode::Load => true,
            Opcode::Call { effect, .. } => {
                matches!(effect, CallEffect::ReadOnly | CallEffect::ReadWrite)
            }
            _ => false,
        }
    }

    pub fn writes_memory(&self) -> bool {
        match &self.opcode {
            Opcode::Store => true,
            Opcode::Call { effect, .. } => {
                matches!(effect, CallEffect::WriteOnly | CallEffect::ReadWrite)
            }
            _ => false,
        }
    }

    pub fn touches_memory(&self) -> bool {
        self.reads_memory() || self.writes_memory()
    }

    pub fn has_side_effects(&self) -> bool {
        self.writes_memory() || self.is_terminator() || self.is_call()
    }

    /// Pointer a load or store accesses
    pub fn pointer_operand(&self) -> Option<&Operand> {
        match self.opcode {
            Opcode::Load => self.operands.first(),
            Opcode::Store => self.operands.get(1),
            _ => None,
        }
    }

    /// Instructions this instruction reads as operands
    pub fn inst_operands(&self) -> impl Iterator<Item = InstId> + '_ {
        self.operands.iter().filter_map(Operand::as_inst)
    }

    pub fn callee(&self) -> Option<&str> {
        match &self.opcode {
            Opcode::Call { callee, .. } => callee.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operands: Vec<String> = self.operands.iter().map(|o| o.to_string()).collect();
        match &self.name {
            Some(name) => write!(f, "{} ({}) = {} {}", self.id, name, self.opcode.mnemonic(), operands.join(", ")),
            None => write!(f, "{} = {} {}", self.id, self.opcode.mnemonic(), operands.join(", ")),
        }
    }
}
