//! Heap allocation and absolute/offset memory access. Grounded on
//! `sam_op_malloc`/`free`/`pushind`/`storeind`/`pushabs`/`storeabs`/
//! `pushoff`/`storeoff` and their shared `sam_pushabs`/`sam_storeabs`
//! helpers in `examples/original_source/src/libsam/opcode.c`.

use sam_types::{Ma, Ml, OperandValue, Sa, SamError};

use crate::execution_state::ExecutionState;
use crate::instruction::ExecOutcome;

fn fail(err: SamError) -> ExecOutcome {
    ExecOutcome::Fail(err)
}

fn push_abs(es: &mut ExecutionState, ma: Ma) -> ExecOutcome {
    let value = match ma {
        Ma::Stack(sa) => es.stack_get(sa),
        Ma::Heap(ha) => es.heap_get(ha),
    };
    match value {
        Ok(v) => match es.stack_push(v) {
            Ok(()) => ExecOutcome::Continue,
            Err(e) => fail(e),
        },
        Err(e) => fail(e),
    }
}

fn store_abs(es: &mut ExecutionState, ma: Ma, value: Ml) -> ExecOutcome {
    let result = match ma {
        Ma::Stack(sa) => es.stack_set(sa, value),
        Ma::Heap(ha) => es.heap_set(ha, value),
    };
    match result {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

/// `MALLOC`: pop a size (0 coerces to 1), allocate that many `None`
/// cells, push the new `Ha`.
pub fn malloc(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    let size = match es.stack_pop() {
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
    let ha = match es.heap_alloc(size.max(0) as usize) {
        Ok(ha) => ha,
        Err(e) => return fail(e),
    };
    match es.stack_push(Ml::Ha(ha)) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

/// `FREE`: pop an `Ha`; only the start of a live allocation is valid.
pub fn free(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    match es.stack_pop() {
        Ok(Ml::Ha(ha)) => match es.heap_dealloc(ha) {
            Ok(()) => ExecOutcome::Continue,
            Err(e) => fail(e),
        },
        Ok(other) => fail(SamError::StackInput {
            which: "first",
            found: other.type_name(),
            expected: "ha",
        }),
        Err(e) => fail(e),
    }
}

/// `PUSHIND`: pop an `Sa` or `Ha` and push the cell it addresses
/// (`sam_op_pushind`).
pub fn pushind(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    match es.stack_pop() {
        Ok(Ml::Ha(ha)) => push_abs(es, Ma::Heap(ha)),
        Ok(Ml::Sa(sa)) => push_abs(es, Ma::Stack(sa)),
        Ok(other) => fail(SamError::StackInput {
            which: "first",
            found: other.type_name(),
            expected: "sa",
        }),
        Err(e) => fail(e),
    }
}

/// `STOREIND`: pop a value then an `Sa`/`Ha`, store the value there
/// (`sam_op_storeind`).
pub fn storeind(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    let value = match es.stack_pop() {
        Ok(v) => v,
        Err(e) => return fail(e),
    };
    match es.stack_pop() {
        Ok(Ml::Ha(ha)) => store_abs(es, Ma::Heap(ha), value),
        Ok(Ml::Sa(sa)) => store_abs(es, Ma::Stack(sa), value),
        Ok(other) => fail(SamError::StackInput {
            which: "first",
            found: other.type_name(),
            expected: "sa",
        }),
        Err(e) => fail(e),
    }
}

/// `PUSHABS n`: push the stack cell at absolute index `n` (stack only,
/// `sam_op_pushabs`).
pub fn pushabs(es: &mut ExecutionState, operand: &OperandValue) -> ExecOutcome {
    match operand {
        OperandValue::Int(i) => push_abs(es, Ma::Stack(Sa(*i as usize))),
        _ => fail(SamError::OpType),
    }
}

/// `STOREABS n`: pop a value, store it at absolute stack index `n`
/// (`sam_op_storeabs`).
pub fn storeabs(es: &mut ExecutionState, operand: &OperandValue) -> ExecOutcome {
    let i = match operand {
        OperandValue::Int(i) => *i,
        _ => return fail(SamError::OpType),
    };
    let value = match es.stack_pop() {
        Ok(v) => v,
        Err(e) => return fail(e),
    };
    store_abs(es, Ma::Stack(Sa(i as usize)), value)
}

/// `PUSHOFF n`: push the stack cell at `fbr + n` (`sam_op_pushoff`).
pub fn pushoff(es: &mut ExecutionState, operand: &OperandValue) -> ExecOutcome {
    let i = match operand {
        OperandValue::Int(i) => *i,
        _ => return fail(SamError::OpType),
    };
    let sa = Sa((es.fbr().0 as i64 + i) as usize);
    push_abs(es, Ma::Stack(sa))
}

/// `STOREOFF n`: pop a value, store it at `fbr + n`
/// (`sam_op_storeoff`).
pub fn storeoff(es: &mut ExecutionState, operand: &OperandValue) -> ExecOutcome {
    let i = match operand {
        OperandValue::Int(i) => *i,
        _ => return fail(SamError::OpType),
    };
    let value = match es.stack_pop() {
        Ok(v) => v,
        Err(e) => return fail(e),
    };
    let sa = Sa((es.fbr().0 as i64 + i) as usize);
    store_abs(es, Ma::Stack(sa), value)
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
    fn malloc_zero_is_dereferenceable() {
        let mut es = state();
        es.stack_push(Ml::Int(0)).unwrap();
        malloc(&mut es, &OperandValue::None);
        let ha = match es.stack_pop().unwrap() {
            Ml::Ha(ha) => ha,
            other => panic!("expected Ha, got {other:?}"),
        };
        assert_eq!(es.heap_get(ha).unwrap(), Ml::None);
    }

    #[test]
    fn malloc_then_free_leaves_no_leak() {
        let mut es = state();
        es.stack_push(Ml::Int(3)).unwrap();
        malloc(&mut es, &OperandValue::None);
        let ha_value = es.stack_pop().unwrap();
        es.stack_push(ha_value).unwrap();
        free(&mut es, &OperandValue::None);
        assert!(es.live_heap_allocations().is_empty());
    }

    #[test]
    fn free_of_offset_address_fails() {
        let mut es = state();
        es.stack_push(Ml::Int(3)).unwrap();
        malloc(&mut es, &OperandValue::None);
        let ha = match es.stack_pop().unwrap() {
            Ml::Ha(ha) => ha,
            other => panic!("expected Ha, got {other:?}"),
        };
        es.stack_push(Ml::Ha(ha.with_offset(1))).unwrap();
        let outcome = free(&mut es, &OperandValue::None);
        assert!(matches!(outcome, ExecOutcome::Fail(SamError::Free(_))));
    }

    #[test]
    fn pushoff_reads_relative_to_fbr() {
        let mut es = state();
        es.stack_push(Ml::Int(10)).unwrap();
        es.stack_push(Ml::Int(20)).unwrap();
        es.set_fbr(Sa(2));
        pushoff(&mut es, &OperandValue::Int(-1));
        assert_eq!(es.stack_pop().unwrap(), Ml::Int(20));
    }
}
