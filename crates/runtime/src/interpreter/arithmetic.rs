//! `ADD`/`SUB` (address-polymorphic pointer arithmetic) and the plain
//! integer/float four-function ops. Grounded on `sam_addition` and
//! `sam_float_arithmetic` in
//! `examples/original_source/src/libsam/opcode.c`.

use sam_types::{Ml, OperandValue, SamError};

use crate::execution_state::ExecutionState;
use crate::instruction::ExecOutcome;

fn fail(err: SamError) -> ExecOutcome {
    ExecOutcome::Fail(err)
}

fn pop_pair(es: &mut ExecutionState) -> Result<(Ml, Ml), SamError> {
    let m2 = es.stack_pop()?;
    let m1 = es.stack_pop()?;
    Ok((m1, m2))
}

/// Uninitialized operands read as `Int(0)` with a warning, matching
/// spec.md §9's mandated arithmetic coercion.
fn coerce_none(es: &ExecutionState, m: Ml) -> Ml {
    if m.is_none() {
        es.warn_uninitialized();
        Ml::Int(0)
    } else {
        m
    }
}

/// `Ha - Ha` within the same allocation is the offset delta; across
/// allocations it's implementation-defined (spec.md §9's Open
/// Question) — we return the allocation-id delta rather than panic.
fn ha_sub(a: sam_types::Ha, b: sam_types::Ha) -> i64 {
    if a.alloc_id == b.alloc_id {
        a.offset as i64 - b.offset as i64
    } else {
        a.alloc_id as i64 - b.alloc_id as i64
    }
}

/// `ADD`/`SUB`: address-polymorphic. `sign` is `1` for add, `-1` for
/// sub.
fn addition(es: &mut ExecutionState, sign: i64) -> ExecOutcome {
    let (m1, m2) = match pop_pair(es) {
        Ok(pair) => pair,
        Err(e) => return fail(e),
    };
    let m1 = coerce_none(es, m1);
    let m2 = coerce_none(es, m2);

    let result = match (m1, m2) {
        (Ml::Pa(pa), Ml::Int(i)) | (Ml::Int(i), Ml::Pa(pa)) => {
            Some(Ml::Pa(pa.offset(sign * i).unwrap_or(pa)))
        }
        (Ml::Ha(ha), Ml::Int(i)) | (Ml::Int(i), Ml::Ha(ha)) => Some(Ml::Ha(
            ha.with_offset((ha.offset as i64 + sign * i).max(0) as usize),
        )),
        (Ml::Ha(a), Ml::Ha(b)) if sign == -1 => Some(Ml::Int(ha_sub(a, b))),
        (Ml::Sa(sa), Ml::Int(i)) | (Ml::Int(i), Ml::Sa(sa)) => Some(Ml::Sa(sam_types::Sa(
            (sa.0 as i64 + sign * i).max(0) as usize,
        ))),
        (Ml::Sa(a), Ml::Sa(b)) if sign == -1 => Some(Ml::Int(a.0 as i64 - b.0 as i64)),
        (Ml::Int(a), Ml::Int(b)) => Some(Ml::Int(a + sign * b)),
        _ => None,
    };

    match result {
        Some(value) => match es.stack_push(value) {
            Ok(()) => ExecOutcome::Continue,
            Err(e) => fail(e),
        },
        None => fail(SamError::StackInput {
            which: "second",
            found: m2.type_name(),
            expected: "int",
        }),
    }
}

pub fn add(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    addition(es, 1)
}

pub fn sub(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    addition(es, -1)
}

fn int_binop(
    es: &mut ExecutionState,
    f: impl FnOnce(i64, i64) -> Result<i64, SamError>,
) -> ExecOutcome {
    let (m1, m2) = match pop_pair(es) {
        Ok(pair) => pair,
        Err(e) => return fail(e),
    };
    let m1 = coerce_none(es, m1);
    let m2 = coerce_none(es, m2);
    let a = match m1 {
        Ml::Int(a) => a,
        other => {
            return fail(SamError::StackInput {
                which: "first",
                found: other.type_name(),
                expected: "int",
            })
        }
    };
    let b = match m2 {
        Ml::Int(b) => b,
        other => {
            return fail(SamError::StackInput {
                which: "second",
                found: other.type_name(),
                expected: "int",
            })
        }
    };
    match f(a, b) {
        Ok(result) => match es.stack_push(Ml::Int(result)) {
            Ok(()) => ExecOutcome::Continue,
            Err(e) => fail(e),
        },
        Err(e) => fail(e),
    }
}

pub fn times(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    int_binop(es, |a, b| Ok(a.wrapping_mul(b)))
}

pub fn div(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    int_binop(es, |a, b| {
        if b == 0 {
            Err(SamError::Division)
        } else {
            Ok(a / b)
        }
    })
}

pub fn modulo(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    int_binop(es, |a, b| {
        if b == 0 {
            Err(SamError::Division)
        } else {
            Ok(a % b)
        }
    })
}

fn float_binop(es: &mut ExecutionState, f: impl FnOnce(f64, f64) -> f64) -> ExecOutcome {
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
    match es.stack_push(Ml::Float(f(m1, m2))) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

pub fn addf(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    float_binop(es, |a, b| a + b)
}

pub fn subf(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    float_binop(es, |a, b| a - b)
}

pub fn timesf(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    float_binop(es, |a, b| a * b)
}

pub fn divf(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    float_binop(es, |a, b| a / b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::IoVTable;
    use crate::options::Options;
    use sam_types::{Ha, Pa};

    fn state() -> ExecutionState {
        let program = sam_parser::parse("STOP\n").unwrap();
        ExecutionState::new(program, Options::default(), IoVTable::new()).unwrap()
    }

    #[test]
    fn add_two_ints() {
        let mut es = state();
        es.stack_push(Ml::Int(2)).unwrap();
        es.stack_push(Ml::Int(3)).unwrap();
        add(&mut es, &OperandValue::None);
        assert_eq!(es.stack_pop().unwrap(), Ml::Int(5));
    }

    #[test]
    fn sub_two_heap_addresses_in_same_allocation_gives_offset_delta() {
        let mut es = state();
        es.stack_push(Ml::Ha(Ha::new(1, 5))).unwrap();
        es.stack_push(Ml::Ha(Ha::new(1, 2))).unwrap();
        sub(&mut es, &OperandValue::None);
        assert_eq!(es.stack_pop().unwrap(), Ml::Int(3));
    }

    #[test]
    fn add_pa_and_int_offsets_program_address() {
        let mut es = state();
        es.stack_push(Ml::Pa(Pa::new(4))).unwrap();
        es.stack_push(Ml::Int(2)).unwrap();
        add(&mut es, &OperandValue::None);
        assert_eq!(es.stack_pop().unwrap(), Ml::Pa(Pa::new(6)));
    }

    #[test]
    fn div_by_zero_fails() {
        let mut es = state();
        es.stack_push(Ml::Int(4)).unwrap();
        es.stack_push(Ml::Int(0)).unwrap();
        assert_eq!(
            div(&mut es, &OperandValue::None),
            ExecOutcome::Fail(SamError::Division)
        );
    }

    #[test]
    fn uninitialized_operand_is_treated_as_zero() {
        let mut es = state();
        es.stack_push(Ml::None).unwrap();
        es.stack_push(Ml::Int(5)).unwrap();
        add(&mut es, &OperandValue::None);
        assert_eq!(es.stack_pop().unwrap(), Ml::Int(5));
    }
}
