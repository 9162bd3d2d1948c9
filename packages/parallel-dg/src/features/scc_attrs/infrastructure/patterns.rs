//! Structural patterns recognized inside one SCC
//!
//! Every matcher takes the SCC's member instructions in program order and
//! answers from their shape alone; dependence facts are the classifier's job.

use crate::features::scc_attrs::domain::{InductionVariable, ReductionInfo, ReductionOp};
use crate::shared::models::{BinaryOp, InstId, Instruction, Opcode, Operand, ValueType};
use rustc_hash::FxHashSet;

fn member_ids(members: &[&Instruction]) -> FxHashSet<InstId> {
    members.iter().map(|i| i.id).collect()
}

fn is_member(ids: &FxHashSet<InstId>, operand: &Operand) -> bool {
    operand.as_inst().is_some_and(|id| ids.contains(&id))
}

fn single_phi<'a>(members: &[&'a Instruction]) -> Option<&'a Instruction> {
    let mut phis = members.iter().filter(|i| i.is_phi());
    let phi = phis.next()?;
    match phis.next() {
        Some(_) => None,
        None => Some(*phi),
    }
}

/// Only address computations, casts and phis
pub fn is_syntactic_sugar_only(members: &[&Instruction]) -> bool {
    !members.is_empty() && members.iter().all(|i| i.is_syntactic_sugar())
}

/// Only compares and branches
pub fn is_control_only(members: &[&Instruction]) -> bool {
    !members.is_empty()
        && members
            .iter()
            .all(|i| i.is_compare() || matches!(i.opcode, Opcode::Branch))
}

/// Only loads and stores
pub fn is_memory_access_only(members: &[&Instruction]) -> bool {
    !members.is_empty()
        && members
            .iter()
            .all(|i| matches!(i.opcode, Opcode::Load | Opcode::Store))
}

/// Accumulator chain `phi → acc₁ → … → accₙ → phi` sharing one reducing operator
///
/// Each accumulator combines the running value with exactly one value from
/// outside the SCC. Subtractions must keep the running value on the left.
/// Floating-point chains need `float_as_real`, since reassociating them
/// changes rounding.
pub fn detect_reduction(members: &[&Instruction], float_as_real: bool) -> Option<ReductionInfo> {
    let ids = member_ids(members);
    let phi = single_phi(members)?;
    let accumulators: Vec<&Instruction> = members.iter().filter(|i| !i.is_phi()).copied().collect();
    if accumulators.is_empty() {
        return None;
    }

    let mut chain: Vec<InstId> = Vec::with_capacity(accumulators.len());
    let mut running = phi.id;
    let mut op: Option<ReductionOp> = None;
    let mut floating_point = false;

    while chain.len() < accumulators.len() {
        let mut users = accumulators
            .iter()
            .filter(|a| !chain.contains(&a.id) && a.inst_operands().any(|u| u == running));
        let next = *users.next()?;
        if users.next().is_some() {
            return None;
        }

        let binary = next.binary_op()?;
        let this_op = ReductionOp::from_binary(binary)?;
        if *op.get_or_insert(this_op) != this_op {
            return None;
        }

        let [lhs, rhs] = next.operands.as_slice() else {
            return None;
        };
        let lhs_running = lhs.as_inst() == Some(running);
        let rhs_running = rhs.as_inst() == Some(running);
        if lhs_running == rhs_running {
            return None;
        }
        let contribution = if lhs_running { rhs } else { lhs };
        if is_member(&ids, contribution) {
            return None;
        }
        if matches!(binary, BinaryOp::Sub | BinaryOp::FSub) && !lhs_running {
            return None;
        }
        if this_op == ReductionOp::And && next.ty != ValueType::Int(1) {
            return None;
        }

        let fp = matches!(binary, BinaryOp::FAdd | BinaryOp::FSub | BinaryOp::FMul)
            || next.ty.is_floating_point();
        if fp && !float_as_real {
            return None;
        }
        floating_point |= fp;

        chain.push(next.id);
        running = next.id;
    }

    // The last accumulator is the phi's only in-SCC input
    let mut back = phi.operands.iter().filter(|o| is_member(&ids, o));
    if back.next()?.as_inst() != Some(running) || back.next().is_some() {
        return None;
    }
    let initial = phi.operands.iter().find(|o| !is_member(&ids, o)).cloned();

    let op = op?;
    Some(ReductionInfo {
        phi: phi.id,
        accumulators: chain,
        initial,
        op,
        identity: op.identity(),
        floating_point,
    })
}

/// `phi → add/sub by a loop-invariant step → phi`, plus the compare and
/// branch deciding the exit
pub fn detect_induction_variable<F>(members: &[&Instruction], is_invariant: F) -> Option<InductionVariable>
where
    F: Fn(&Operand) -> bool,
{
    let ids = member_ids(members);
    let phi = single_phi(members)?;

    let mut update: Option<&Instruction> = None;
    let mut compares: Vec<InstId> = Vec::new();
    for inst in members.iter().filter(|i| i.id != phi.id) {
        match &inst.opcode {
            Opcode::Binary(BinaryOp::Add | BinaryOp::Sub) if update.is_none() => update = Some(*inst),
            Opcode::Compare => compares.push(inst.id),
            Opcode::Branch => {}
            _ => return None,
        }
    }
    let update = update?;

    let [lhs, rhs] = update.operands.as_slice() else {
        return None;
    };
    let step = match (lhs.as_inst() == Some(phi.id), rhs.as_inst() == Some(phi.id)) {
        (true, false) => rhs,
        (false, true) if matches!(update.opcode, Opcode::Binary(BinaryOp::Add)) => lhs,
        _ => return None,
    };
    if is_member(&ids, step) || !is_invariant(step) {
        return None;
    }

    let mut back = phi.operands.iter().filter(|o| is_member(&ids, o));
    if back.next()?.as_inst() != Some(update.id) || back.next().is_some() {
        return None;
    }

    // Exit test reads the variable; the branch reads the test
    for inst in members {
        let feeds_on = |allowed: &[InstId]| {
            inst.inst_operands()
                .filter(|u| ids.contains(u))
                .all(|u| allowed.contains(&u))
        };
        let ok = match inst.opcode {
            Opcode::Compare => feeds_on([phi.id, update.id].as_slice()),
            Opcode::Branch => feeds_on(compares.as_slice()),
            _ => true,
        };
        if !ok {
            return None;
        }
    }

    Some(InductionVariable {
        phi: phi.id,
        update: update.id,
        step: step.clone(),
        start: phi.operands.iter().find(|o| !is_member(&ids, o)).cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inst(id: u32) -> Operand {
        Operand::Inst(InstId(id))
    }

    fn sum_loop() -> Vec<Instruction> {
        // %0 = phi [0, %2]; %2 = add %0, %9
        vec![
            Instruction::phi(0, vec![Operand::Constant(0), inst(2)]),
            Instruction::binary(2, BinaryOp::Add, inst(0), inst(9)),
        ]
    }

    #[test]
    fn test_sum_is_reduction() {
        let insts = sum_loop();
        let members: Vec<&Instruction> = insts.iter().collect();
        let info = detect_reduction(&members, false).unwrap();
        assert_eq!(info.op, ReductionOp::Add);
        assert_eq!(info.identity, 0);
        assert_eq!(info.accumulators, vec![InstId(2)]);
        assert_eq!(info.initial, Some(Operand::Constant(0)));
    }

    #[test]
    fn test_accumulator_chain_with_subtraction() {
        // s = phi; t = s + x; u = t - y; s' = u
        let insts = vec![
            Instruction::phi(0, vec![Operand::Argument(0), inst(3)]),
            Instruction::binary(2, BinaryOp::Add, inst(0), inst(7)),
            Instruction::binary(3, BinaryOp::Sub, inst(2), inst(8)),
        ];
        let members: Vec<&Instruction> = insts.iter().collect();
        let info = detect_reduction(&members, false).unwrap();
        assert_eq!(info.accumulators, vec![InstId(2), InstId(3)]);
        assert_eq!(info.initial, Some(Operand::Argument(0)));
    }

    #[test]
    fn test_rejected_reductions() {
        // Running value on the right of a subtraction
        let insts = vec![
            Instruction::phi(0, vec![Operand::Constant(0), inst(2)]),
            Instruction::binary(2, BinaryOp::Sub, inst(9), inst(0)),
        ];
        let members: Vec<&Instruction> = insts.iter().collect();
        assert!(detect_reduction(&members, false).is_none());

        // Mixed operators
        let insts = vec![
            Instruction::phi(0, vec![Operand::Constant(0), inst(3)]),
            Instruction::binary(2, BinaryOp::Add, inst(0), inst(9)),
            Instruction::binary(3, BinaryOp::Mul, inst(2), inst(9)),
        ];
        let members: Vec<&Instruction> = insts.iter().collect();
        assert!(detect_reduction(&members, false).is_none());

        // s + s
        let insts = vec![
            Instruction::phi(0, vec![Operand::Constant(1), inst(2)]),
            Instruction::binary(2, BinaryOp::Add, inst(0), inst(0)),
        ];
        let members: Vec<&Instruction> = insts.iter().collect();
        assert!(detect_reduction(&members, false).is_none());
    }

    #[test]
    fn test_float_reduction_needs_real_semantics() {
        let insts = vec![
            Instruction::phi(0, vec![Operand::Constant(0), inst(2)]),
            Instruction::binary(2, BinaryOp::FAdd, inst(0), inst(9)),
        ];
        let members: Vec<&Instruction> = insts.iter().collect();
        assert!(detect_reduction(&members, false).is_none());
        assert!(detect_reduction(&members, true).unwrap().floating_point);
    }

    #[test]
    fn test_induction_variable_with_exit_test() {
        // i = phi [0, i']; i' = add i, 1; c = cmp i', %n; br c
        let insts = vec![
            Instruction::phi(0, vec![Operand::Constant(0), inst(1)]),
            Instruction::binary(1, BinaryOp::Add, inst(0), Operand::Constant(1)),
            Instruction::compare(2, inst(1), Operand::Argument(0)),
            Instruction::branch(3, Some(inst(2))),
        ];
        let members: Vec<&Instruction> = insts.iter().collect();
        let iv = detect_induction_variable(&members, |op| op.as_inst().is_none()).unwrap();
        assert_eq!(iv.phi, InstId(0));
        assert_eq!(iv.update, InstId(1));
        assert_eq!(iv.step, Operand::Constant(1));
        assert_eq!(iv.start, Some(Operand::Constant(0)));
        assert!(is_control_only(&members[2..]));
    }

    #[test]
    fn test_variant_step_is_not_induction() {
        let insts = sum_loop();
        let members: Vec<&Instruction> = insts.iter().collect();
        assert!(detect_induction_variable(&members, |op| op.as_inst().is_none()).is_none());
        assert!(detect_induction_variable(&members, |_| true).is_some());
    }

    #[test]
    fn test_shape_predicates() {
        let gep = Instruction::gep(0, Operand::Global("a".into()), Operand::Constant(0));
        let cast = Instruction::cast(1, inst(0));
        let load = Instruction::load(2, inst(1));
        assert!(is_syntactic_sugar_only(&[&gep, &cast]));
        assert!(!is_syntactic_sugar_only(&[&gep, &load]));
        assert!(is_memory_access_only(&[&load]));
        assert!(!is_control_only(&[]));
    }
}
