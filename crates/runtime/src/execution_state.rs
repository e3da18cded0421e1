//! `ExecutionState`: owns everything a running program touches — the
//! instruction list, label table, stack, heap, registers, I/O vtable
//! and change journal. Handlers in `crate::interpreter` operate on this
//! type exclusively; `crate::execute` drives it one instruction at a
//! time. Mirrors the original's opaque `sam_es` (`es.h`), expressed as
//! an ordinary owned struct instead of an allocate/free pair.

use std::collections::VecDeque;

use sam_types::{Ha, Ma, Ml, Pa, Sa, SamError};

use crate::handler_table::lookup_handler;
use crate::heap::Heap;
use crate::instruction::BoundInstruction;
use crate::io::{IoVTable, Stream};
use crate::journal::{Change, ChangeJournal};
use crate::options::Options;
use crate::stack::Stack;
use sam_parser::ParsedProgram;

/// What `ExecutionState::step` reports back to its caller, giving an
/// embedder the per-instruction granularity spec.md §6 asks for
/// ("an iterator that advances one instruction per step yielding the
/// error code").
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The program is still running; execution can continue.
    Running,
    /// `STOP` was reached cleanly.
    Stopped,
    /// A handler aborted with this error.
    Failed(SamError),
    /// The program counter ran past the last instruction without an
    /// explicit `STOP` (the "forgot STOP" warning case).
    RanOff,
}

pub struct ExecutionState {
    instructions: Vec<BoundInstruction>,
    labels: std::collections::HashMap<String, u32>,
    stack: Stack,
    heap: Heap,
    pc: Pa,
    fbr: Sa,
    bt_flag: bool,
    options: Options,
    io: IoVTable,
    journal: ChangeJournal,
    input_line: VecDeque<char>,
}

impl ExecutionState {
    pub fn new(program: ParsedProgram, options: Options, io: IoVTable) -> Result<Self, SamError> {
        let mut instructions = Vec::with_capacity(program.instructions.len());
        for parsed in program.instructions {
            let (name, handler) = lookup_handler(&parsed.name)
                .ok_or_else(|| SamError::UnknownIdent(parsed.name.clone()))?;
            instructions.push(BoundInstruction {
                name,
                operand: parsed.operand,
                handler,
                line: parsed.line,
            });
        }
        Ok(ExecutionState {
            instructions,
            labels: program.labels,
            stack: Stack::new(),
            heap: Heap::new(),
            pc: Pa::new(0),
            fbr: Sa(0),
            bt_flag: false,
            options,
            io,
            journal: ChangeJournal::new(),
            input_line: VecDeque::new(),
        })
    }

    // -- registers --

    pub fn pc(&self) -> Pa {
        self.pc
    }

    pub fn set_pc(&mut self, pc: Pa) {
        self.pc = pc;
    }

    pub fn fbr(&self) -> Sa {
        self.fbr
    }

    pub fn set_fbr(&mut self, fbr: Sa) {
        self.fbr = fbr;
    }

    pub fn bt_flag(&self) -> bool {
        self.bt_flag
    }

    pub fn set_bt_flag(&mut self) {
        self.bt_flag = true;
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn instructions_len(&self) -> usize {
        self.instructions.len()
    }

    pub fn instruction_at(&self, pa: Pa) -> Option<&BoundInstruction> {
        self.instructions.get(pa.line as usize)
    }

    pub fn current_instruction(&self) -> Option<&BoundInstruction> {
        self.instruction_at(self.pc)
    }

    pub fn label_lookup(&self, name: &str) -> Option<Pa> {
        self.labels.get(name).map(|&line| Pa::new(line))
    }

    // -- stack --

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub fn stack_push(&mut self, value: Ml) -> Result<(), SamError> {
        let sa = Sa(self.stack.len());
        if self.stack.push(value) {
            self.journal.record(Change::Added {
                at: Ma::Stack(sa),
                value,
                size: None,
            });
            Ok(())
        } else {
            Err(SamError::StackOverflow)
        }
    }

    pub fn stack_pop(&mut self) -> Result<Ml, SamError> {
        match self.stack.pop() {
            Some(value) => {
                let sa = Sa(self.stack.len());
                self.journal.record(Change::Removed {
                    at: Ma::Stack(sa),
                    size: 1,
                });
                Ok(value)
            }
            None => Err(SamError::StackUnderflow),
        }
    }

    pub fn stack_get(&self, sa: Sa) -> Result<Ml, SamError> {
        self.stack.get(sa).ok_or_else(|| SamError::Segfault {
            stack: true,
            address: sa.to_string(),
        })
    }

    pub fn stack_set(&mut self, sa: Sa, value: Ml) -> Result<(), SamError> {
        if self.stack.set(sa, value) {
            self.journal.record(Change::Set {
                at: Ma::Stack(sa),
                value,
            });
            Ok(())
        } else {
            Err(SamError::Segfault {
                stack: true,
                address: sa.to_string(),
            })
        }
    }

    /// `ADDSP`/`POPSP`'s shared resize primitive (`sam_sp_shift`): grow
    /// with `None` cells or shrink by popping to reach `new_len`.
    pub fn stack_resize_to(&mut self, new_len: usize) -> Result<(), SamError> {
        while self.stack.len() > new_len {
            self.stack_pop()?;
        }
        while self.stack.len() < new_len {
            self.stack_push(Ml::None)?;
        }
        Ok(())
    }

    // -- heap --

    pub fn heap_len(&self) -> usize {
        self.heap.len()
    }

    pub fn heap_alloc(&mut self, size: usize) -> Result<Ha, SamError> {
        let size = if size == 0 { 1 } else { size };
        let ha = self.heap.alloc(size).ok_or(SamError::NoMemory)?;
        self.journal.record(Change::Added {
            at: Ma::Heap(ha),
            value: Ml::None,
            size: Some(size),
        });
        Ok(ha)
    }

    pub fn heap_dealloc(&mut self, ha: Ha) -> Result<(), SamError> {
        if ha.alloc_id >= self.heap.len() || !self.heap.dealloc(ha) {
            return Err(SamError::Free(ha.to_string()));
        }
        self.journal.record(Change::Removed {
            at: Ma::Heap(ha),
            size: self.heap.allocation_len(ha.alloc_id).unwrap_or(0),
        });
        Ok(())
    }

    pub fn heap_get(&self, ha: Ha) -> Result<Ml, SamError> {
        self.heap.get(ha).ok_or_else(|| SamError::Segfault {
            stack: false,
            address: ha.to_string(),
        })
    }

    pub fn heap_set(&mut self, ha: Ha, value: Ml) -> Result<(), SamError> {
        if self.heap.set(ha, value) {
            self.journal.record(Change::Set {
                at: Ma::Heap(ha),
                value,
            });
            Ok(())
        } else {
            Err(SamError::Segfault {
                stack: false,
                address: ha.to_string(),
            })
        }
    }

    /// Reads a NUL-terminated string starting at `ha`, for `WRITESTR`.
    pub fn heap_read_cstring(&self, ha: Ha) -> Result<String, SamError> {
        let mut bytes = Vec::new();
        let mut cursor = ha;
        loop {
            match self.heap_get(cursor)? {
                Ml::Int(0) => break,
                Ml::Int(b) => bytes.push(b as u8),
                _ => {
                    return Err(SamError::Segfault {
                        stack: false,
                        address: cursor.to_string(),
                    })
                }
            }
            cursor = cursor.with_offset(cursor.offset + 1);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn drain_journal(&mut self) -> Option<Change> {
        self.journal.take_next()
    }

    /// Allocation ids still live, for the teardown leak report.
    pub fn live_heap_allocations(&self) -> Vec<usize> {
        self.heap.live_allocations()
    }

    // -- I/O --

    pub fn write(&self, stream: Stream, text: &str) -> Result<(), SamError> {
        self.io.write(stream, text)
    }

    pub fn diagnostic(&self, text: &str) {
        if !self.options.contains(Options::QUIET) {
            let message = crate::diagnostics::format_diagnostic(self.pc.line, text);
            let _ = self.io.write(Stream::Err, &format!("{message}\n"));
        }
    }

    /// Non-fatal "uninitialized cell read as 0" notice (spec.md §9's
    /// Open Question: mandated for arithmetic, not for `PUSHIND`).
    pub fn warn_uninitialized(&self) {
        self.diagnostic("warning: read of uninitialized cell, treated as 0");
    }

    fn refill_input_line(&mut self) -> Result<bool, SamError> {
        match self.io.read_line(Stream::In)? {
            Some(line) => {
                self.input_line.extend(line.chars());
                self.input_line.push_back('\n');
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Reads the next whitespace-delimited token, refilling the raw
    /// input buffer from the I/O vtable as needed (the buffered-stream
    /// behavior `sam_es_input_get` backs in the original).
    pub fn read_token(&mut self) -> Result<Option<String>, SamError> {
        loop {
            while matches!(self.input_line.front(), Some(c) if c.is_whitespace()) {
                self.input_line.pop_front();
            }
            if let Some(&c) = self.input_line.front() {
                if !c.is_whitespace() {
                    let mut token = String::new();
                    while matches!(self.input_line.front(), Some(c) if !c.is_whitespace()) {
                        token.push(self.input_line.pop_front().unwrap());
                    }
                    return Ok(Some(token));
                }
            }
            if !self.refill_input_line()? {
                return Ok(None);
            }
        }
    }

    /// Reads exactly one raw character, refilling as needed.
    pub fn read_char(&mut self) -> Result<Option<char>, SamError> {
        if self.input_line.is_empty() && !self.refill_input_line()? {
            return Ok(None);
        }
        Ok(self.input_line.pop_front())
    }

    /// Executes exactly one instruction at the current `pc`, for an
    /// embedder that wants per-instruction granularity (spec.md §6's
    /// "iterator that advances one instruction per step"). Advances
    /// `pc` itself; does not render diagnostics or the backtrace —
    /// that's `crate::execute`'s job for a full run.
    pub fn step(&mut self) -> StepOutcome {
        let pc = self.pc;
        if pc.line as usize >= self.instructions.len() {
            return StepOutcome::RanOff;
        }
        let instr = &self.instructions[pc.line as usize];
        let handler = instr.handler;
        let operand = instr.operand.clone();
        match handler(self, &operand) {
            crate::instruction::ExecOutcome::Continue => {
                self.pc = pc.offset(1).unwrap_or(pc);
                StepOutcome::Running
            }
            crate::instruction::ExecOutcome::Jump(target) => {
                self.pc = target;
                StepOutcome::Running
            }
            crate::instruction::ExecOutcome::Stop => StepOutcome::Stopped,
            crate::instruction::ExecOutcome::Fail(e) => {
                self.bt_flag = true;
                StepOutcome::Failed(e)
            }
        }
    }

    /// Reads a full line (for `READSTR`), draining any buffered
    /// characters up to and including the next newline before
    /// refilling from the I/O vtable.
    pub fn read_line_raw(&mut self) -> Result<Option<String>, SamError> {
        if self.input_line.is_empty() && !self.refill_input_line()? {
            return Ok(None);
        }
        let mut line = String::new();
        while let Some(c) = self.input_line.pop_front() {
            if c == '\n' {
                break;
            }
            line.push(c);
        }
        Ok(Some(line))
    }
}

impl Drop for ExecutionState {
    fn drop(&mut self) {
        let live = self.heap.live_allocations();
        if !live.is_empty() {
            let total: usize = live
                .iter()
                .filter_map(|&id| self.heap.allocation_len(id))
                .sum();
            self.diagnostic(&format!(
                "warning: {} unfreed allocation(s), {} word(s) leaked",
                live.len(),
                total
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_for(source: &str) -> ExecutionState {
        let program = sam_parser::parse(source).unwrap();
        ExecutionState::new(program, Options::default(), IoVTable::new()).unwrap()
    }

    #[test]
    fn new_binds_every_instruction_to_a_handler() {
        let es = state_for("PUSHIMM 1\nSTOP\n");
        assert_eq!(es.instructions_len(), 2);
    }

    #[test]
    fn stack_push_pop_records_journal_entries() {
        let mut es = state_for("STOP\n");
        es.stack_push(Ml::Int(4)).unwrap();
        assert_eq!(es.stack_len(), 1);
        assert!(matches!(es.drain_journal(), Some(Change::Added { .. })));
        es.stack_pop().unwrap();
        assert!(matches!(es.drain_journal(), Some(Change::Removed { .. })));
    }

    #[test]
    fn heap_alloc_of_zero_is_coerced_to_one_cell() {
        let mut es = state_for("STOP\n");
        let ha = es.heap_alloc(0).unwrap();
        assert!(es.heap_get(ha).is_ok());
    }

    #[test]
    fn step_advances_one_instruction_at_a_time() {
        let mut es = state_for("PUSHIMM 1\nSTOP\n");
        assert_eq!(es.step(), StepOutcome::Running);
        assert_eq!(es.stack_len(), 1);
        assert_eq!(es.step(), StepOutcome::Stopped);
    }
}
