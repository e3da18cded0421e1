//! Shifts, logical ops and bitwise ops, all operating on `Int`.
//! Grounded on `sam_do_shift`/`sam_bitshift`/`sam_bitshiftind`/
//! `sam_integer_arithmetic`/`sam_unary_arithmetic` in
//! `examples/original_source/src/libsam/opcode.c`.

use sam_types::{Ml, OperandValue, SamError};

use crate::execution_state::ExecutionState;
use crate::instruction::ExecOutcome;

fn fail(err: SamError) -> ExecOutcome {
    ExecOutcome::Fail(err)
}

fn pop_int(es: &mut ExecutionState, which: &'static str) -> Result<i64, SamError> {
    match es.stack_pop()? {
        Ml::Int(i) => Ok(i),
        other => Err(SamError::StackInput {
            which,
            found: other.type_name(),
            expected: "int",
        }),
    }
}

fn do_shift(value: i64, amount: i64, kind: ShiftKind) -> i64 {
    match kind {
        ShiftKind::Left => value.wrapping_shl(amount as u32),
        ShiftKind::Right => value.wrapping_shr(amount as u32),
        ShiftKind::LogicalRight => ((value as u64).wrapping_shr(amount as u32)) as i64,
    }
}

#[derive(Clone, Copy)]
enum ShiftKind {
    Left,
    Right,
    LogicalRight,
}

/// Immediate-operand shifts (`LSHIFT`/`RSHIFT`/`LRSHIFT`): the operand
/// is the shift amount and a negative one fails (`sam_bitshift`).
fn bitshift(es: &mut ExecutionState, operand: &OperandValue, kind: ShiftKind) -> ExecOutcome {
    let amount = match operand {
        OperandValue::Int(i) => *i,
        _ => return fail(SamError::OpType),
    };
    if amount < 0 {
        return fail(SamError::Shift(amount));
    }
    let value = match pop_int(es, "first") {
        Ok(v) => v,
        Err(e) => return fail(e),
    };
    match es.stack_push(Ml::Int(do_shift(value, amount, kind))) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

pub fn lshift(es: &mut ExecutionState, operand: &OperandValue) -> ExecOutcome {
    bitshift(es, operand, ShiftKind::Left)
}

pub fn rshift(es: &mut ExecutionState, operand: &OperandValue) -> ExecOutcome {
    bitshift(es, operand, ShiftKind::Right)
}

pub fn lrshift(es: &mut ExecutionState, operand: &OperandValue) -> ExecOutcome {
    bitshift(es, operand, ShiftKind::LogicalRight)
}

/// Indirect shifts (`LSHIFTIND`/`RSHIFTIND`/`LRSHIFTIND`): both the
/// amount and the value come off the stack. `sam_bitshiftind` has no
/// negative-amount guard at all, unlike the immediate form; preserved
/// here rather than normalized, since nothing names this a defect.
fn bitshiftind(es: &mut ExecutionState, kind: ShiftKind) -> ExecOutcome {
    let amount = match pop_int(es, "second") {
        Ok(v) => v,
        Err(e) => return fail(e),
    };
    let value = match pop_int(es, "first") {
        Ok(v) => v,
        Err(e) => return fail(e),
    };
    match es.stack_push(Ml::Int(do_shift(value, amount, kind))) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

pub fn lshiftind(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    bitshiftind(es, ShiftKind::Left)
}

pub fn rshiftind(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    bitshiftind(es, ShiftKind::Right)
}

pub fn lrshiftind(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    bitshiftind(es, ShiftKind::LogicalRight)
}

fn int_binop(
    es: &mut ExecutionState,
    f: impl FnOnce(i64, i64) -> i64,
) -> ExecOutcome {
    let b = match pop_int(es, "second") {
        Ok(v) => v,
        Err(e) => return fail(e),
    };
    let a = match pop_int(es, "first") {
        Ok(v) => v,
        Err(e) => return fail(e),
    };
    match es.stack_push(Ml::Int(f(a, b))) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

fn to_bool(i: i64) -> i64 {
    if i != 0 {
        1
    } else {
        0
    }
}

/// Correct logical OR — the original's `SAM_OP_OR` mistakenly uses
/// `&&`, which isn't called out anywhere as a documented behavior worth
/// preserving, so it's fixed here.
pub fn or(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    int_binop(es, |a, b| to_bool((a != 0 || b != 0) as i64))
}

pub fn and(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    int_binop(es, |a, b| to_bool((a != 0 && b != 0) as i64))
}

pub fn nand(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    int_binop(es, |a, b| to_bool(!(a != 0 && b != 0) as i64))
}

pub fn nor(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    int_binop(es, |a, b| to_bool(!(a != 0 || b != 0) as i64))
}

pub fn xor(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    int_binop(es, |a, b| to_bool(((a != 0) ^ (b != 0)) as i64))
}

pub fn bitand(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    int_binop(es, |a, b| a & b)
}

pub fn bitor(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    int_binop(es, |a, b| a | b)
}

pub fn bitnand(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    int_binop(es, |a, b| !(a & b))
}

pub fn bitnor(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    int_binop(es, |a, b| !(a | b))
}

pub fn bitxor(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    int_binop(es, |a, b| a ^ b)
}

fn unary(es: &mut ExecutionState, f: impl FnOnce(i64) -> i64) -> ExecOutcome {
    let a = match pop_int(es, "first") {
        Ok(v) => v,
        Err(e) => return fail(e),
    };
    match es.stack_push(Ml::Int(f(a))) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

/// `NOT` and `ISNIL` are the same operation in the original
/// (`sam_unary_arithmetic`'s fallthrough case): logical negation.
pub fn not(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    unary(es, |a| to_bool((a == 0) as i64))
}

pub fn bitnot(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    unary(es, |a| !a)
}
