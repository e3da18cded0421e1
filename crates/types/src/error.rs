//! The execution-error taxonomy (spec.md §7), cross-checked against
//! `examples/original_source/include/libsam/types.h`'s `sam_error` enum.
//! `OK` and `STOP` are not variants here: handlers return
//! `sam_runtime::ExecOutcome`, whose own `Continue`/`Stop` variants play
//! that role, so this type only needs to enumerate actual failures.

use std::fmt;

/// Why a handler aborted. Every variant surfaces uniformly through the
/// execute loop; a handler that can't produce a given variant simply
/// never returns it.
#[derive(Debug, Clone, PartialEq)]
pub enum SamError {
    /// Parsed operand's type isn't in the opcode's allowed mask. This
    /// can only happen if a caller builds an instruction outside the
    /// parser; the parser itself rejects bad operand types at parse
    /// time (see `sam_parser::ParseError::Operand`).
    OpType,
    /// Stack or heap access out of range, or into a freed heap slot.
    Segfault { stack: bool, address: String },
    /// `FREE` of an invalid or already-freed address.
    Free(String),
    /// Pop on an empty stack.
    StackUnderflow,
    /// Push at `STACK_MAX`.
    StackOverflow,
    /// Heap allocation request exceeded the configured ceiling.
    NoMemory,
    /// Explicit conversion (`FTOI`/`FTOIR`/`ITOF`/`patoi`) from the
    /// wrong source tag.
    TypeConvert { found: &'static str, expected: &'static str },
    /// `STOP` reached with more than one element left on the stack.
    FinalStack(usize),
    /// A label reference has no entry in the label table.
    UnknownIdent(String),
    /// The stack input to a handler has the wrong tag.
    StackInput {
        which: &'static str,
        found: &'static str,
        expected: &'static str,
    },
    /// An underlying read or write failed.
    Io(String),
    /// Division or modulo by zero.
    Division,
    /// A shift amount was negative.
    Shift(i64),
    /// The opcode isn't supported in this build (reserved for the
    /// dynamic-library extension opcodes, which this crate doesn't
    /// implement — see spec.md §1's Out of scope list).
    NoSys(&'static str),
}

impl fmt::Display for SamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamError::OpType => write!(f, "unexpected operand type"),
            SamError::Segfault { stack, address } => {
                let segment = if *stack { "stack" } else { "heap" };
                write!(f, "segmentation fault: {segment} address {address}")
            }
            SamError::Free(address) => write!(f, "attempt to free invalid address {address}"),
            SamError::StackUnderflow => write!(f, "stack underflow"),
            SamError::StackOverflow => write!(f, "stack overflow"),
            SamError::NoMemory => write!(f, "out of memory"),
            SamError::TypeConvert { found, expected } => {
                write!(f, "type conversion error: found {found}, expected {expected}")
            }
            SamError::FinalStack(len) => {
                write!(f, "final stack contains {len} elements, expected 1")
            }
            SamError::UnknownIdent(name) => write!(f, "unknown identifier `{name}`"),
            SamError::StackInput {
                which,
                found,
                expected,
            } => write!(
                f,
                "{which} stack input has type {found}, expected {expected}"
            ),
            SamError::Io(message) => write!(f, "I/O error: {message}"),
            SamError::Division => write!(f, "division by zero"),
            SamError::Shift(amount) => write!(f, "attempt to shift by negative amount {amount}"),
            SamError::NoSys(opcode) => write!(f, "{opcode} is not supported in this build"),
        }
    }
}

impl std::error::Error for SamError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_single_line() {
        let err = SamError::Division;
        assert!(!err.to_string().contains('\n'));
    }
}
