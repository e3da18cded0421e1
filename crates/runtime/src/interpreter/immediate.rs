//! Opcodes that push a literal from their own operand onto the stack.
//! Grounded on `sam_op_pushimm*` in
//! `examples/original_source/src/libsam/opcode.c`.

use sam_types::{Ml, OperandValue, Pa, Sa, SamError};

use crate::execution_state::ExecutionState;
use crate::instruction::ExecOutcome;

fn push(es: &mut ExecutionState, value: Ml) -> ExecOutcome {
    match es.stack_push(value) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => ExecOutcome::Fail(e),
    }
}

pub fn pushimm(es: &mut ExecutionState, operand: &OperandValue) -> ExecOutcome {
    match operand {
        OperandValue::Int(i) => push(es, Ml::Int(*i)),
        _ => ExecOutcome::Fail(SamError::OpType),
    }
}

pub fn pushimmf(es: &mut ExecutionState, operand: &OperandValue) -> ExecOutcome {
    match operand {
        OperandValue::Float(f) => push(es, Ml::Float(*f)),
        _ => ExecOutcome::Fail(SamError::OpType),
    }
}

/// Like the original, a char literal is widened to a plain `Int` the
/// moment it lands on the stack (spec.md §3).
pub fn pushimmch(es: &mut ExecutionState, operand: &OperandValue) -> ExecOutcome {
    match operand {
        OperandValue::Char(c) => push(es, Ml::Int(*c as i64)),
        _ => ExecOutcome::Fail(SamError::OpType),
    }
}

/// `PUSHIMMMA` pushes its integer operand tagged as a stack address
/// (`sam_op_pushimmma`'s "weird things happen on a negative operand"
/// is preserved literally: a negative `i64` truncates into `usize`).
pub fn pushimmma(es: &mut ExecutionState, operand: &OperandValue) -> ExecOutcome {
    match operand {
        OperandValue::Int(i) => push(es, Ml::Sa(Sa(*i as usize))),
        _ => ExecOutcome::Fail(SamError::OpType),
    }
}

pub fn pushimmpa(es: &mut ExecutionState, operand: &OperandValue) -> ExecOutcome {
    match operand {
        OperandValue::Int(i) => push(es, Ml::Pa(Pa::new(*i as u32))),
        OperandValue::Label(name) => match es.label_lookup(name) {
            Some(pa) => push(es, Ml::Pa(pa)),
            None => ExecOutcome::Fail(SamError::UnknownIdent(name.clone())),
        },
        _ => ExecOutcome::Fail(SamError::OpType),
    }
}

/// Allocates the string (plus NUL terminator) on the heap and pushes
/// its starting address (`sam_op_pushimmstr`).
pub fn pushimmstr(es: &mut ExecutionState, operand: &OperandValue) -> ExecOutcome {
    let bytes = match operand {
        OperandValue::Str(bytes) => bytes,
        _ => return ExecOutcome::Fail(SamError::OpType),
    };
    let ha = match es.heap_alloc(bytes.len() + 1) {
        Ok(ha) => ha,
        Err(e) => return ExecOutcome::Fail(e),
    };
    for (i, &byte) in bytes.iter().enumerate() {
        if let Err(e) = es.heap_set(ha.with_offset(i), Ml::Int(byte as i64)) {
            return ExecOutcome::Fail(e);
        }
    }
    if let Err(e) = es.heap_set(ha.with_offset(bytes.len()), Ml::Int(0)) {
        return ExecOutcome::Fail(e);
    }
    push(es, Ml::Ha(ha))
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
    fn pushimm_wrong_operand_type_is_optype_error() {
        let mut es = state();
        assert_eq!(
            pushimm(&mut es, &OperandValue::Float(1.0)),
            ExecOutcome::Fail(SamError::OpType)
        );
    }

    #[test]
    fn pushimmch_widens_to_int() {
        let mut es = state();
        pushimmch(&mut es, &OperandValue::Char('A'));
        assert_eq!(es.stack_pop().unwrap(), Ml::Int(65));
    }

    #[test]
    fn pushimmstr_allocates_nul_terminated_bytes() {
        let mut es = state();
        pushimmstr(&mut es, &OperandValue::Str(b"hi".to_vec()));
        let ha = match es.stack_pop().unwrap() {
            Ml::Ha(ha) => ha,
            other => panic!("expected Ha, got {other:?}"),
        };
        assert_eq!(es.heap_get(ha).unwrap(), Ml::Int(b'h' as i64));
        assert_eq!(es.heap_get(ha.with_offset(2)).unwrap(), Ml::Int(0));
    }

    #[test]
    fn pushimmpa_resolves_label() {
        let program = sam_parser::parse("top:\nSTOP\n").unwrap();
        let mut es = ExecutionState::new(program, Options::default(), IoVTable::new()).unwrap();
        pushimmpa(&mut es, &OperandValue::Label("top".to_string()));
        assert_eq!(es.stack_pop().unwrap(), Ml::Pa(Pa::new(0)));
    }
}
