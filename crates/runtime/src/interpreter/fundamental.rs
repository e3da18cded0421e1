//! Stack-shape opcodes with no operand: register pushes, pop-to-
//! register, dup/swap, frame-size adjustment, frame link/unlink, and
//! `STOP`. Grounded on `sam_op_pushsp`/`pushfbr`/`popsp`/`popfbr`/
//! `dup`/`swap`/`addsp`/`link`/`unlink`/`stop` in
//! `examples/original_source/src/libsam/opcode.c`.

use sam_types::{Ml, OperandValue, Sa, SamError};

use crate::execution_state::ExecutionState;
use crate::instruction::ExecOutcome;

fn fail(err: SamError) -> ExecOutcome {
    ExecOutcome::Fail(err)
}

pub fn pushsp(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    match es.stack_push(Ml::Sa(Sa(es.stack_len()))) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

pub fn pushfbr(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    let fbr = es.fbr();
    match es.stack_push(Ml::Sa(fbr)) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

pub fn popsp(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    match es.stack_pop() {
        Ok(Ml::Sa(sa)) => match es.stack_resize_to(sa.0) {
            Ok(()) => ExecOutcome::Continue,
            Err(e) => fail(e),
        },
        Ok(other) => fail(SamError::StackInput {
            which: "first",
            found: other.type_name(),
            expected: "sa",
        }),
        Err(e) => fail(e),
    }
}

pub fn popfbr(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    match es.stack_pop() {
        Ok(Ml::Sa(sa)) => {
            es.set_fbr(sa);
            ExecOutcome::Continue
        }
        Ok(other) => fail(SamError::StackInput {
            which: "first",
            found: other.type_name(),
            expected: "sa",
        }),
        Err(e) => fail(e),
    }
}

pub fn dup(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    match es.stack_pop() {
        Ok(value) => {
            if let Err(e) = es.stack_push(value) {
                return fail(e);
            }
            match es.stack_push(value) {
                Ok(()) => ExecOutcome::Continue,
                Err(e) => fail(e),
            }
        }
        Err(e) => fail(e),
    }
}

pub fn swap(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    let top = match es.stack_pop() {
        Ok(v) => v,
        Err(e) => return fail(e),
    };
    let under = match es.stack_pop() {
        Ok(v) => v,
        Err(e) => return fail(e),
    };
    if let Err(e) = es.stack_push(top) {
        return fail(e);
    }
    match es.stack_push(under) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

/// `ADDSP n`: resize the stack to `len + n`, failing underflow if that
/// would go negative (`sam_op_addsp`).
pub fn addsp(es: &mut ExecutionState, operand: &OperandValue) -> ExecOutcome {
    let delta = match operand {
        OperandValue::Int(i) => *i,
        _ => return fail(SamError::OpType),
    };
    let new_len = es.stack_len() as i64 + delta;
    if new_len < 0 {
        return fail(SamError::StackUnderflow);
    }
    match es.stack_resize_to(new_len as usize) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

/// `LINK`: push the current `fbr` and make the new frame base the
/// address of that pushed cell (`sam_op_link`).
pub fn link(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    let fbr = es.fbr();
    if let Err(e) = es.stack_push(Ml::Sa(fbr)) {
        return fail(e);
    }
    es.set_fbr(Sa(es.stack_len() - 1));
    ExecOutcome::Continue
}

/// `UNLINK` restores `fbr` from the stack, same as `POPFBR`
/// (`sam_op_unlink` delegates to `sam_op_popfbr`).
pub fn unlink(es: &mut ExecutionState, operand: &OperandValue) -> ExecOutcome {
    popfbr(es, operand)
}

/// `STOP` requires exactly one value left on the stack.
pub fn stop(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    if es.stack_len() > 1 {
        fail(SamError::FinalStack(es.stack_len()))
    } else {
        ExecOutcome::Stop
    }
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
    fn dup_leaves_two_copies() {
        let mut es = state();
        es.stack_push(Ml::Int(9)).unwrap();
        assert_eq!(dup(&mut es, &OperandValue::None), ExecOutcome::Continue);
        assert_eq!(es.stack_len(), 2);
    }

    #[test]
    fn swap_exchanges_top_two() {
        let mut es = state();
        es.stack_push(Ml::Int(1)).unwrap();
        es.stack_push(Ml::Int(2)).unwrap();
        swap(&mut es, &OperandValue::None);
        assert_eq!(es.stack_pop().unwrap(), Ml::Int(1));
        assert_eq!(es.stack_pop().unwrap(), Ml::Int(2));
    }

    #[test]
    fn addsp_negative_past_bottom_underflows() {
        let mut es = state();
        es.stack_push(Ml::Int(1)).unwrap();
        let outcome = addsp(&mut es, &OperandValue::Int(-2));
        assert_eq!(outcome, ExecOutcome::Fail(SamError::StackUnderflow));
    }

    #[test]
    fn link_then_unlink_restores_fbr() {
        let mut es = state();
        let before = es.fbr();
        link(&mut es, &OperandValue::None);
        assert_ne!(es.fbr(), before);
        unlink(&mut es, &OperandValue::None);
        assert_eq!(es.fbr(), before);
    }

    #[test]
    fn stop_with_more_than_one_value_fails() {
        let mut es = state();
        es.stack_push(Ml::Int(1)).unwrap();
        es.stack_push(Ml::Int(2)).unwrap();
        assert_eq!(stop(&mut es, &OperandValue::None), fail(SamError::FinalStack(2)));
    }
}
