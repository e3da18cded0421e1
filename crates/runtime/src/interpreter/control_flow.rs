//! Jumps and subroutine calls. A handler that wants to redirect the
//! program counter returns `ExecOutcome::Jump(target)`; `crate::execute`
//! sets `pc` to exactly that address instead of auto-incrementing, so
//! handlers here always resolve the *landing* address directly (unlike
//! the original's `sam_get_jump_target`, which pre-decrements by one to
//! offset its loop's unconditional increment).
//!
//! Grounded on `sam_op_jump`/`jumpc`/`jumpind`/`jsr`/`jsrind`/`rst`/
//! `skip` in `examples/original_source/src/libsam/opcode.c`.

use sam_types::{Ml, OperandValue, Pa, SamError};

use crate::execution_state::ExecutionState;
use crate::instruction::ExecOutcome;

fn fail(err: SamError) -> ExecOutcome {
    ExecOutcome::Fail(err)
}

fn resolve_target(es: &ExecutionState, operand: &OperandValue) -> Result<Pa, SamError> {
    match operand {
        OperandValue::Int(i) => Ok(Pa::new(*i as u32)),
        OperandValue::Label(name) => es
            .label_lookup(name)
            .ok_or_else(|| SamError::UnknownIdent(name.clone())),
        _ => Err(SamError::OpType),
    }
}

pub fn jump(es: &mut ExecutionState, operand: &OperandValue) -> ExecOutcome {
    match resolve_target(es, operand) {
        Ok(target) => ExecOutcome::Jump(target),
        Err(e) => fail(e),
    }
}

/// `JUMPC`: pop a condition; a zero value is a no-op, any other value
/// takes the jump.
pub fn jumpc(es: &mut ExecutionState, operand: &OperandValue) -> ExecOutcome {
    let condition = match es.stack_pop() {
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
    if condition == 0 {
        return ExecOutcome::Continue;
    }
    match resolve_target(es, operand) {
        Ok(target) => ExecOutcome::Jump(target),
        Err(e) => fail(e),
    }
}

/// `JUMPIND`: pop a `Pa` and jump to it.
pub fn jumpind(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    match es.stack_pop() {
        Ok(Ml::Pa(pa)) => ExecOutcome::Jump(pa),
        Ok(other) => fail(SamError::StackInput {
            which: "first",
            found: other.type_name(),
            expected: "pa",
        }),
        Err(e) => fail(e),
    }
}

/// `RST` delegates to the same logic as `JUMPIND` (`sam_op_rst` is a
/// direct call to `sam_op_jumpind`).
pub fn rst(es: &mut ExecutionState, operand: &OperandValue) -> ExecOutcome {
    jumpind(es, operand)
}

/// `JSR`: push the return address (the line after this one), then
/// jump.
pub fn jsr(es: &mut ExecutionState, operand: &OperandValue) -> ExecOutcome {
    let return_pa = es.pc().offset(1).unwrap_or(es.pc());
    if let Err(e) = es.stack_push(Ml::Pa(return_pa)) {
        return fail(e);
    }
    match resolve_target(es, operand) {
        Ok(target) => ExecOutcome::Jump(target),
        Err(e) => fail(e),
    }
}

/// `JSRIND`: pop the call target first, then push the return address,
/// then jump (`sam_op_jsrind`'s order: pop, then push, then set pc).
pub fn jsrind(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    let target = match es.stack_pop() {
        Ok(Ml::Pa(pa)) => pa,
        Ok(other) => {
            return fail(SamError::StackInput {
                which: "first",
                found: other.type_name(),
                expected: "pa",
            })
        }
        Err(e) => return fail(e),
    };
    let return_pa = es.pc().offset(1).unwrap_or(es.pc());
    if let Err(e) = es.stack_push(Ml::Pa(return_pa)) {
        return fail(e);
    }
    ExecOutcome::Jump(target)
}

/// `SKIP` is permanently broken in the original: it reads its popped
/// operand's address field regardless of that operand's actual tag
/// (an unsound union read) and then unconditionally fails with
/// `ENOSYS`, so the PC mutation it performs is never observable. Here
/// it just consumes its stack input and reports the same failure.
pub fn skip(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    match es.stack_pop() {
        Ok(_) => fail(SamError::NoSys("SKIP")),
        Err(e) => fail(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::IoVTable;
    use crate::options::Options;

    fn state_for(source: &str) -> ExecutionState {
        let program = sam_parser::parse(source).unwrap();
        ExecutionState::new(program, Options::default(), IoVTable::new()).unwrap()
    }

    #[test]
    fn jump_resolves_label() {
        let mut es = state_for("JUMP top\ntop:\nSTOP\n");
        assert_eq!(jump(&mut es, &OperandValue::Label("top".into())), ExecOutcome::Jump(Pa::new(1)));
    }

    #[test]
    fn jumpc_zero_is_noop() {
        let mut es = state_for("STOP\n");
        es.stack_push(Ml::Int(0)).unwrap();
        assert_eq!(jumpc(&mut es, &OperandValue::Int(5)), ExecOutcome::Continue);
    }

    #[test]
    fn jumpc_nonzero_jumps() {
        let mut es = state_for("STOP\n");
        es.stack_push(Ml::Int(1)).unwrap();
        assert_eq!(jumpc(&mut es, &OperandValue::Int(5)), ExecOutcome::Jump(Pa::new(5)));
    }

    #[test]
    fn jsr_pushes_return_address_then_jumps() {
        let mut es = state_for("JSR sub\nSTOP\nsub:\nSTOP\n");
        let outcome = jsr(&mut es, &OperandValue::Label("sub".into()));
        assert_eq!(outcome, ExecOutcome::Jump(Pa::new(2)));
        assert_eq!(es.stack_pop().unwrap(), Ml::Pa(Pa::new(1)));
    }

    #[test]
    fn skip_always_fails_with_nosys() {
        let mut es = state_for("STOP\n");
        es.stack_push(Ml::Int(3)).unwrap();
        assert_eq!(skip(&mut es, &OperandValue::None), ExecOutcome::Fail(SamError::NoSys("SKIP")));
    }
}
