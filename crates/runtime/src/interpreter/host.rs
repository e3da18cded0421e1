//! The terminal-I/O opcodes. Grounded on `sam_es_read`/`sam_op_read`/
//! `readf`/`readch`/`readstr`/`write`/`writef`/`writech`/`writestr` in
//! `examples/original_source/src/libsam/opcode.c`.

use sam_types::{Ml, OperandValue, SamError};

use crate::execution_state::ExecutionState;
use crate::instruction::ExecOutcome;
use crate::io::Stream;

fn fail(err: SamError) -> ExecOutcome {
    ExecOutcome::Fail(err)
}

/// `READ`: tokenize the next whitespace-delimited word and parse it as
/// an integer.
pub fn read(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    let token = match es.read_token() {
        Ok(Some(t)) => t,
        Ok(None) => return fail(SamError::Io("end of input".to_string())),
        Err(e) => return fail(e),
    };
    match token.parse::<i64>() {
        Ok(i) => match es.stack_push(Ml::Int(i)) {
            Ok(()) => ExecOutcome::Continue,
            Err(e) => fail(e),
        },
        Err(_) => fail(SamError::Io(format!("'{token}' is not an integer"))),
    }
}

/// `READF`: tokenize the next word and parse it as a float.
pub fn readf(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    let token = match es.read_token() {
        Ok(Some(t)) => t,
        Ok(None) => return fail(SamError::Io("end of input".to_string())),
        Err(e) => return fail(e),
    };
    match token.parse::<f64>() {
        Ok(f) => match es.stack_push(Ml::Float(f)) {
            Ok(()) => ExecOutcome::Continue,
            Err(e) => fail(e),
        },
        Err(_) => fail(SamError::Io(format!("'{token}' is not a float"))),
    }
}

/// `READCH`: one raw character, not whitespace-delimited.
pub fn readch(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    match es.read_char() {
        Ok(Some(c)) => match es.stack_push(Ml::Int(c as i64)) {
            Ok(()) => ExecOutcome::Continue,
            Err(e) => fail(e),
        },
        Ok(None) => fail(SamError::Io("end of input".to_string())),
        Err(e) => fail(e),
    }
}

/// `READSTR`: read a full line, heap-allocate it NUL-terminated, and
/// push its address (`sam_io_afgets` backed).
pub fn readstr(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    let line = match es.read_line_raw() {
        Ok(Some(l)) => l,
        Ok(None) => return fail(SamError::Io("end of input".to_string())),
        Err(e) => return fail(e),
    };
    let bytes = line.into_bytes();
    let ha = match es.heap_alloc(bytes.len() + 1) {
        Ok(ha) => ha,
        Err(e) => return fail(e),
    };
    for (i, &byte) in bytes.iter().enumerate() {
        if let Err(e) = es.heap_set(ha.with_offset(i), Ml::Int(byte as i64)) {
            return fail(e);
        }
    }
    if let Err(e) = es.heap_set(ha.with_offset(bytes.len()), Ml::Int(0)) {
        return fail(e);
    }
    match es.stack_push(Ml::Ha(ha)) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

pub fn write(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    let i = match es.stack_pop() {
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
    match es.write(Stream::Out, &i.to_string()) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

pub fn writef(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    let f = match es.stack_pop() {
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
    match es.write(Stream::Out, &f.to_string()) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

pub fn writech(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    let i = match es.stack_pop() {
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
    let c = char::from_u32(i as u32).unwrap_or('\u{FFFD}');
    match es.write(Stream::Out, &c.to_string()) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}

/// `WRITESTR`: pop a heap address, bounds-check it, and print the
/// NUL-terminated string found there.
pub fn writestr(es: &mut ExecutionState, _operand: &OperandValue) -> ExecOutcome {
    let ha = match es.stack_pop() {
        Ok(Ml::Ha(ha)) => ha,
        Ok(other) => {
            return fail(SamError::StackInput {
                which: "first",
                found: other.type_name(),
                expected: "ha",
            })
        }
        Err(e) => return fail(e),
    };
    if ha.alloc_id >= es.heap_len() {
        return fail(SamError::Segfault {
            stack: false,
            address: ha.to_string(),
        });
    }
    let text = match es.heap_read_cstring(ha) {
        Ok(t) => t,
        Err(e) => return fail(e),
    };
    match es.write(Stream::Out, &text) {
        Ok(()) => ExecOutcome::Continue,
        Err(e) => fail(e),
    }
}
