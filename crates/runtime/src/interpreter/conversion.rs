//! Type-narrowing conversions between `Int`, `Float` and `Pa`.
//! Grounded on `sam_op_ftoi`/`ftoir`/`itof`/`patoi` in
//! `examples/original_source/src/libsam/opcode.c`.

use sam_types::{Ml, OperandValue, SamError};

use crate::execution_state::ExecutionState;
use crate::instruction::ExecOutcome;

fn fail(err: SamError) -> ExecOutcome {
    ExecOutcome::Fail(err)
}

fn convert_float(es: &mut ExecutionState, f: impl FnOnce(f64) -> i64) -> ExecOutcome {
    let value = match es.stack_pop() {
        Ok(Ml::Float(v)) => v,
        Ok(other) => {
            return fail(SamError::TypeConvert {
                found: other.type_name(),
                expected: "float",
            })
        }
        Err(e) => return fail(e),
    };
    match es.stack_push(Ml::Int(f(value))) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

/// `FTOI`: truncate toward negative infinity.
pub fn ftoi(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    convert_float(es, |v| v.floor() as i64)
}

/// `FTOIR`: round to the nearest integer.
pub fn ftoir(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    convert_float(es, |v| v.round() as i64)
}

pub fn itof(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    let value = match es.stack_pop() {
        Ok(Ml::Int(v)) => v,
        Ok(other) => {
            return fail(SamError::TypeConvert {
                found: other.type_name(),
                expected: "int",
            })
        }
        Err(e) => return fail(e),
    };
    match es.stack_push(Ml::Float(value as f64)) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

/// `patoi`: a program address converts to the `Int` of its line
/// number.
pub fn patoi(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    let pa = match es.stack_pop() {
        Ok(Ml::Pa(pa)) => pa,
        Ok(other) => {
            return fail(SamError::TypeConvert {
                found: other.type_name(),
                expected: "pa",
            })
        }
        Err(e) => return fail(e),
    };
    match es.stack_push(Ml::Int(pa.line as i64)) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::IoVTable;
    use crate::options::Options;
    use sam_types::Pa;

    fn state() -> ExecutionState {
        let program = sam_parser::parse("STOP\n").unwrap();
        ExecutionState::new(program, Options::default(), IoVTable::new()).unwrap()
    }

    #[test]
    fn ftoi_truncates_toward_negative_infinity() {
        let mut es = state();
        es.stack_push(Ml::Float(-1.5)).unwrap();
        ftoi(&mut es, &OperandValue::None);
        assert_eq!(es.stack_pop().unwrap(), Ml::Int(-2));
    }

    #[test]
    fn ftoir_rounds() {
        let mut es = state();
        es.stack_push(Ml::Float(2.6)).unwrap();
        ftoir(&mut es, &OperandValue::None);
        assert_eq!(es.stack_pop().unwrap(), Ml::Int(3));
    }

    #[test]
    fn itof_widens() {
        let mut es = state();
        es.stack_push(Ml::Int(4)).unwrap();
        itof(&mut es, &OperandValue::None);
        assert_eq!(es.stack_pop().unwrap(), Ml::Float(4.0));
    }

    #[test]
    fn patoi_reads_the_line_number() {
        let mut es = state();
        es.stack_push(Ml::Pa(Pa::new(7))).unwrap();
        patoi(&mut es, &OperandValue::None);
        assert_eq!(es.stack_pop().unwrap(), Ml::Int(7));
    }

    #[test]
    fn ftoi_wrong_type_fails() {
        let mut es = state();
        es.stack_push(Ml::Int(1)).unwrap();
        assert_eq!(
            ftoi(&mut es, &OperandValue::None),
            ExecOutcome::Fail(SamError::TypeConvert {
                found: "int",
                expected: "float"
            })
        );
    }
}
