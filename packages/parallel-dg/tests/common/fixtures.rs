//! Region fixtures

use super::builders::v;
use parallel_dg::shared::models::{BinaryOp, CallEffect};
use parallel_dg::{Instruction, Module, Operand, Region};

/// `sum += a[i]` with `i` counting to `%arg0`
///
/// ```text
/// %0 = phi [0, %6]        ; i
/// %1 = phi [0, %4]        ; sum
/// %2 = gep @a, %0
/// %3 = load %2
/// %4 = add %1, %3
/// %6 = add %0, 1
/// %7 = icmp %6, %arg0
/// br %7
/// ```
pub fn sum_loop() -> Region {
    Region::loop_body("sum")
        .with(Instruction::phi(0, vec![Operand::Constant(0), v(6)]))
        .with(Instruction::phi(1, vec![Operand::Constant(0), v(4)]))
        .with(Instruction::gep(2, Operand::Global("a".into()), v(0)))
        .with(Instruction::load(3, v(2)))
        .with(Instruction::binary(4, BinaryOp::Add, v(1), v(3)))
        .with(Instruction::binary(6, BinaryOp::Add, v(0), Operand::Constant(1)))
        .with(Instruction::compare(7, v(6), Operand::Argument(0)))
        .with(Instruction::branch(8, Some(v(7))))
}

/// `prod *= a[i]` with the running product left inside the loop
pub fn product_loop() -> Region {
    Region::loop_body("product")
        .with(Instruction::phi(0, vec![Operand::Constant(0), v(5)]))
        .with(Instruction::phi(1, vec![Operand::Constant(1), v(4)]))
        .with(Instruction::gep(2, Operand::Global("a".into()), v(0)))
        .with(Instruction::load(3, v(2)))
        .with(Instruction::binary(4, BinaryOp::Mul, v(1), v(3)))
        .with(Instruction::binary(5, BinaryOp::Add, v(0), Operand::Constant(1)))
        .with(Instruction::compare(6, v(5), Operand::Argument(0)))
        .with(Instruction::branch(7, Some(v(6))))
}

/// `*@total = f(*@total)`: a call and a fixed-address store every iteration
pub fn logging_loop() -> Region {
    Region::loop_body("logging")
        .with(Instruction::phi(0, vec![Operand::Constant(0), v(4)]))
        .with(Instruction::load(1, Operand::Global("total".into())))
        .with(Instruction::call(2, Some("step"), CallEffect::ReadNone, vec![v(1)]))
        .with(Instruction::store(3, v(2), Operand::Global("total".into())))
        .with(Instruction::binary(4, BinaryOp::Add, v(0), Operand::Constant(1)))
        .with(Instruction::compare(5, v(4), Operand::Argument(0)))
        .with(Instruction::branch(6, Some(v(5))))
}

/// Two stores to the same global in straight-line code
pub fn must_alias_stores() -> Region {
    Region::function("init")
        .with(Instruction::store(0, Operand::Constant(1), Operand::Global("x".into())))
        .with(Instruction::store(1, Operand::Constant(2), Operand::Global("x".into())))
}

/// Module holding the `step` callee of [`logging_loop`]
pub fn step_module() -> Module {
    let step = Region::function("step")
        .with(Instruction::binary(0, BinaryOp::Mul, Operand::Argument(0), Operand::Constant(3)))
        .with(Instruction::binary(1, BinaryOp::Add, v(0), Operand::Constant(7)))
        .with(Instruction::ret(2, Some(v(1))));
    Module::new().with_region(step)
}
