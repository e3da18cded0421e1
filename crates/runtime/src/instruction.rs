//! A bound instruction: a parsed instruction plus the handler function
//! resolved from its opcode name, so dispatch at execute time is a
//! direct call rather than a second name lookup — the "dispatcher
//! looks up by name at parse time and stores the handler inside each
//! parsed instruction for O(1) dispatch at runtime" design spec.md §9
//! calls for.

use sam_types::{OperandValue, Pa, SamError};

use crate::execution_state::ExecutionState;

/// What a handler wants the execute loop to do next, playing the role
/// the teacher's `InterpretResult` (`MoveOn`/`Jump`/`End`/`EnvError`)
/// plays for its own fetch-dispatch-advance loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecOutcome {
    /// Fall through to the next program address.
    Continue,
    /// Set the program counter to `target` directly (a taken jump).
    Jump(Pa),
    /// `STOP` was executed; exit cleanly.
    Stop,
    /// Abort with this error; sets the backtrace flag.
    Fail(SamError),
}

pub type Handler = fn(&mut ExecutionState, &OperandValue) -> ExecOutcome;

#[derive(Clone)]
pub struct BoundInstruction {
    pub name: &'static str,
    pub operand: OperandValue,
    pub handler: Handler,
    pub line: u32,
}
