//! The fetch-dispatch-advance loop: runs a bound program to completion
//! and narrows the bottom stack slot into a process exit code.
//! Grounded on `sam_execute` in
//! `examples/original_source/src/libsam/execute.c`.

use sam_types::{Ml, Sa, SamError};

use crate::diagnostics::print_backtrace_if_flagged;
use crate::execution_state::ExecutionState;
use crate::instruction::ExecOutcome;

pub const EMPTY_STACK_EXIT_CODE: i64 = -1;

/// Runs every bound instruction starting at the current PC until
/// `STOP`, a handler failure, or the program counter runs past the
/// last instruction. Returns the coerced exit code.
pub fn execute(es: &mut ExecutionState) -> i64 {
    let mut ran_off = false;

    loop {
        let pc = es.pc();
        if pc.line as usize >= es.instructions_len() {
            ran_off = true;
            break;
        }
        let instr = es
            .current_instruction()
            .expect("pc within bounds implies an instruction exists");
        let handler = instr.handler;
        let operand = instr.operand.clone();

        match handler(es, &operand) {
            ExecOutcome::Continue => {
                es.set_pc(pc.offset(1).unwrap_or(pc));
            }
            ExecOutcome::Jump(target) => {
                es.set_pc(target);
            }
            ExecOutcome::Stop => break,
            ExecOutcome::Fail(e) => {
                report_failure(es, &e);
                es.set_bt_flag();
                let code = final_exit_code(es);
                print_backtrace_if_flagged(es);
                return code;
            }
        }
    }

    if ran_off {
        warn_forgot_stop(es);
    }

    let code = final_exit_code(es);
    print_backtrace_if_flagged(es);
    code
}

fn report_failure(es: &ExecutionState, err: &SamError) {
    es.diagnostic(&format!("error: {err}"));
}

fn warn_forgot_stop(es: &mut ExecutionState) {
    es.diagnostic("warning: final instruction must be STOP.");
    es.set_bt_flag();
}

fn warn_empty_stack(es: &mut ExecutionState) -> i64 {
    es.diagnostic("warning: program terminated with an empty stack.");
    es.set_bt_flag();
    EMPTY_STACK_EXIT_CODE
}

fn warn_retval_type(es: &mut ExecutionState, found: &'static str) {
    es.diagnostic(&format!(
        "warning: expected bottom of stack to contain an integer (found: {found})."
    ));
    es.set_bt_flag();
}

fn final_exit_code(es: &mut ExecutionState) -> i64 {
    match es.stack_get(Sa(0)) {
        Ok(value) => {
            if !matches!(value, Ml::Int(_)) {
                warn_retval_type(es, value.type_name());
            }
            value.coerce_to_int()
        }
        Err(_) => warn_empty_stack(es),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::IoVTable;
    use crate::options::Options;

    fn run(source: &str) -> i64 {
        let program = sam_parser::parse(source).unwrap();
        let mut es = ExecutionState::new(program, Options::default(), IoVTable::new()).unwrap();
        execute(&mut es)
    }

    #[test]
    fn simple_program_returns_its_final_stack_value() {
        assert_eq!(run("PUSHIMM 7\nSTOP\n"), 7);
    }

    #[test]
    fn empty_stack_at_stop_is_reported_as_minus_one() {
        assert_eq!(run("STOP\n"), EMPTY_STACK_EXIT_CODE);
    }

    #[test]
    fn a_jump_lands_exactly_on_the_target_line() {
        assert_eq!(
            run("JUMP skip\nPUSHIMM 99\nskip:\nPUSHIMM 1\nSTOP\n"),
            1
        );
    }

    #[test]
    fn division_by_zero_aborts_and_still_reports_an_exit_code() {
        assert_eq!(run("PUSHIMM 1\nPUSHIMM 0\nDIV\nSTOP\n"), EMPTY_STACK_EXIT_CODE);
    }

    #[test]
    fn running_off_the_end_without_stop_still_yields_an_exit_code() {
        assert_eq!(run("PUSHIMM 5\n"), 5);
    }

    #[test]
    fn a_subroutine_call_returns_to_the_instruction_after_jsr() {
        assert_eq!(run("JSR sub\nPUSHIMM 2\nSTOP\nsub:\nRST\n"), 2);
    }
}
