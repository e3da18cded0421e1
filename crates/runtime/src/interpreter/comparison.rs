//! Ordering, equality and sign-test opcodes. Grounded on
//! `sam_integer_arithmetic`'s `CMP`/`GREATER`/`LESS` cases,
//! `sam_op_equal`, `sam_float_arithmetic`'s `CMPF` case, and
//! `sam_unary_arithmetic`'s `ISNIL`/`ISPOS`/`ISNEG` cases in
//! `examples/original_source/src/libsam/opcode.c`.

use sam_types::{float_eq, Ml, OperandValue, SamError};

use crate::execution_state::ExecutionState;
use crate::instruction::ExecOutcome;

fn fail(err: SamError) -> ExecOutcome {
    ExecOutcome::Fail(err)
}

fn to_bool(b: bool) -> i64 {
    if b {
        1
    } else {
        0
    }
}

/// A representative `i64` for ordering comparisons. `CMP`/`LESS`/
/// `GREATER` require both operands share a tag (`m1->type == m2->type`
/// in the original) but don't require that tag be `Int` — addresses
/// compare by their natural ordering.
fn orderable(m: Ml) -> Option<i64> {
    match m {
        Ml::Int(i) => Some(i),
        Ml::Pa(pa) => Some(pa.line as i64),
        Ml::Sa(sa) => Some(sa.0 as i64),
        Ml::Ha(ha) => Some(((ha.alloc_id as i64) << 32) | ha.offset as i64),
        Ml::Float(_) | Ml::None => None,
    }
}

fn same_tag(a: Ml, b: Ml) -> bool {
    std::mem::discriminant(&a) == std::mem::discriminant(&b)
}

fn ordering_binop(es: &mut ExecutionState, f: impl FnOnce(i64, i64) -> i64) -> ExecOutcome {
    let m2 = match es.stack_pop() {
        Ok(v) => v,
        Err(e) => return fail(e),
    };
    let m1 = match es.stack_pop() {
        Ok(v) => v,
        Err(e) => return fail(e),
    };
    if !same_tag(m1, m2) {
        return fail(SamError::StackInput {
            which: "second",
            found: m2.type_name(),
            expected: m1.type_name(),
        });
    }
    let (a, b) = match (orderable(m1), orderable(m2)) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return fail(SamError::StackInput {
                which: "first",
                found: m1.type_name(),
                expected: "orderable",
            })
        }
    };
    match es.stack_push(Ml::Int(f(a, b))) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

pub fn cmp(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    ordering_binop(es, |a, b| match a.cmp(&b) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    })
}

pub fn less(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    ordering_binop(es, |a, b| to_bool(a < b))
}

pub fn greater(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    ordering_binop(es, |a, b| to_bool(a > b))
}

/// `CMPF`: unlike `CMP`, the result stays a `Float` (`sam_op_cmpf`
/// stores its result back into `m1->value.f`, leaving the type tag
/// `SAM_ML_TYPE_FLOAT`).
pub fn cmpf(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    let m2 = match es.stack_pop() {
        Ok(Ml::Float(f)) => f,
        Ok(other) => {
            return fail(SamError::StackInput {
                which: "first",
                found: other.type_name(),
                expected: "float",
            })
        }
        Err(e) => return fail(e),
    };
    let m1 = match es.stack_pop() {
        Ok(Ml::Float(f)) => f,
        Ok(other) => {
            return fail(SamError::StackInput {
                which: "second",
                found: other.type_name(),
                expected: "float",
            })
        }
        Err(e) => return fail(e),
    };
    let result = if float_eq(m1, m2) {
        0.0
    } else if m1 < m2 {
        -1.0
    } else {
        1.0
    };
    match es.stack_push(Ml::Float(result)) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

/// `EQUAL`: its own dedicated per-tag comparison, not routed through
/// `CMP`. Mismatched tags (or an uninitialized operand) are simply
/// unequal rather than an error (`sam_op_equal`).
pub fn equal(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    let m2 = match es.stack_pop() {
        Ok(v) => v,
        Err(e) => return fail(e),
    };
    let m1 = match es.stack_pop() {
        Ok(v) => v,
        Err(e) => return fail(e),
    };
    let eq = match (m1, m2) {
        (Ml::Float(a), Ml::Float(b)) => float_eq(a, b),
        (Ml::Int(a), Ml::Int(b)) => a == b,
        (Ml::Pa(a), Ml::Pa(b)) => a == b,
        (Ml::Ha(a), Ml::Ha(b)) => a == b,
        (Ml::Sa(a), Ml::Sa(b)) => a == b,
        _ => false,
    };
    match es.stack_push(Ml::Int(to_bool(eq))) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

fn unary_int(es: &mut ExecutionState, f: impl FnOnce(i64) -> i64) -> ExecOutcome {
    let a = match es.stack_pop() {
        Ok(Ml::Int(i)) => i,
        Ok(other) => {
            return fail(SamError::StackInput {
                which: "first",
                found: other.type_name(),
                expected: "int",
            })
        }
        Err(e) => return fail(e),
    };
    match es.stack_push(Ml::Int(f(a))) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

/// `ISNIL` is the same logical-negation operation as `NOT`
/// (`sam_unary_arithmetic`'s shared fallthrough case).
pub fn isnil(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    unary_int(es, |a| to_bool(a == 0))
}

pub fn ispos(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    unary_int(es, |a| to_bool(a > 0))
}

pub fn isneg(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    unary_int(es, |a| to_bool(a < 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::IoVTable;
    use crate::options::Options;

    fn state() -> ExecutionState {
        let program = sam_parser::parse("STOP\n").unwrap();
        ExecutionState::new(program, Options::default(), IoVTable::new()).unwrap()
    }

    #[test]
    fn cmp_orders_ints() {
        let mut es = state();
        es.stack_push(Ml::Int(2)).unwrap();
        es.stack_push(Ml::Int(5)).unwrap();
        cmp(&mut es, &OperandValue::None);
        assert_eq!(es.stack_pop().unwrap(), Ml::Int(-1));
    }

    #[test]
    fn cmp_mismatched_tags_fails() {
        let mut es = state();
        es.stack_push(Ml::Int(2)).unwrap();
        es.stack_push(Ml::Float(1.0)).unwrap();
        assert!(matches!(
            cmp(&mut es, &OperandValue::None),
            ExecOutcome::Fail(SamError::StackInput { .. })
        ));
    }

    #[test]
    fn equal_false_on_tag_mismatch() {
        let mut es = state();
        es.stack_push(Ml::Int(0)).unwrap();
        es.stack_push(Ml::Float(0.0)).unwrap();
        equal(&mut es, &OperandValue::None);
        assert_eq!(es.stack_pop().unwrap(), Ml::Int(0));
    }

    #[test]
    fn equal_true_for_matching_floats_within_epsilon() {
        let mut es = state();
        es.stack_push(Ml::Float(1.0)).unwrap();
        es.stack_push(Ml::Float(1.0)).unwrap();
        equal(&mut es, &OperandValue::None);
        assert_eq!(es.stack_pop().unwrap(), Ml::Int(1));
    }

    #[test]
    fn ispos_isneg_agree_on_zero() {
        let mut es = state();
        es.stack_push(Ml::Int(0)).unwrap();
        assert_eq!(ispos(&mut es, &OperandValue::None), ExecOutcome::Continue);
        assert_eq!(es.stack_pop().unwrap(), Ml::Int(0));
    }
}
