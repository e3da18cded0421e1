//! Black-box scenarios driving the public `sam_parser::parse` +
//! `sam_runtime::execute` pipeline exactly as the `samiam` binary
//! would, one program at a time.

use std::cell::RefCell;
use std::rc::Rc;

use sam_runtime::{execute, ExecutionState, IoVTable, Options};

fn run(source: &str) -> i64 {
    let program = sam_parser::parse(source).expect("program parses");
    let mut es = ExecutionState::new(program, Options::default(), IoVTable::new())
        .expect("execution state builds");
    execute(&mut es)
}

fn run_capturing_stderr(source: &str) -> (i64, String) {
    let captured = Rc::new(RefCell::new(String::new()));
    let sink = captured.clone();
    let io = IoVTable::new().with_write(Box::new(move |stream, text| {
        if stream == sam_runtime::io::Stream::Err {
            sink.borrow_mut().push_str(text);
        }
        Ok(())
    }));
    let program = sam_parser::parse(source).expect("program parses");
    let mut es =
        ExecutionState::new(program, Options::default(), io).expect("execution state builds");
    let code = execute(&mut es);
    let text = captured.borrow().clone();
    (code, text)
}

#[test]
fn pushing_a_literal_and_stopping_returns_it_as_the_exit_code() {
    assert_eq!(run("PUSHIMM 42\nSTOP\n"), 42);
}

#[test]
fn addition_of_two_literals() {
    assert_eq!(run("PUSHIMM 3\nPUSHIMM 4\nADD\nSTOP\n"), 7);
}

#[test]
fn float_addition_truncated_back_to_an_int_exit_code() {
    assert_eq!(
        run("PUSHIMMF 1.5\nPUSHIMMF 2.5\nADDF\nFTOI\nSTOP\n"),
        4
    );
}

#[test]
fn division_by_zero_reports_the_failure_on_stderr() {
    let (code, stderr) = run_capturing_stderr("PUSHIMM 1\nPUSHIMM 0\nDIV\nSTOP\n");
    assert_ne!(code, 0);
    assert!(
        stderr.to_lowercase().contains("division"),
        "expected a division diagnostic, got: {stderr}"
    );
}

#[test]
fn a_heap_round_trip_through_malloc_storeind_pushind() {
    assert_eq!(
        run("PUSHIMM 3\nMALLOC\nDUP\nPUSHIMM 7\nSTOREIND\nPUSHIND\nSTOP\n"),
        7
    );
}

#[test]
fn jumpc_on_zero_falls_through_instead_of_looping() {
    assert_eq!(
        run("loop:\nPUSHIMM 0\nJUMPC loop\nPUSHIMM 5\nSTOP\n"),
        5
    );
}

#[test]
fn draining_the_journal_after_a_run_reconstructs_every_push() {
    use sam_runtime::journal::Change;
    use sam_types::{Ma, Ml, Sa};

    let program = sam_parser::parse("PUSHIMM 1\nPUSHIMM 2\nADD\nSTOP\n").unwrap();
    let mut es = ExecutionState::new(program, Options::default(), IoVTable::new()).unwrap();
    execute(&mut es);

    let mut changes = Vec::new();
    while let Some(change) = es.drain_journal() {
        changes.push(change);
    }

    assert_eq!(
        changes[0],
        Change::Added {
            at: Ma::Stack(Sa(0)),
            value: Ml::Int(1),
            size: None,
        }
    );
    assert_eq!(
        changes[1],
        Change::Added {
            at: Ma::Stack(Sa(1)),
            value: Ml::Int(2),
            size: None,
        }
    );
    // ADD pops both operands (two Removed) then pushes their sum back.
    let removed = changes
        .iter()
        .filter(|c| matches!(c, Change::Removed { .. }))
        .count();
    assert_eq!(removed, 2);
    assert!(changes.iter().any(|c| matches!(
        c,
        Change::Added {
            at: Ma::Stack(Sa(0)),
            value: Ml::Int(3),
            size: None,
        }
    )));
}

#[test]
fn a_heap_allocation_records_its_cell_count_in_the_journal() {
    use sam_runtime::journal::Change;

    let program = sam_parser::parse("PUSHIMM 3\nMALLOC\nSTOP\n").unwrap();
    let mut es = ExecutionState::new(program, Options::default(), IoVTable::new()).unwrap();
    execute(&mut es);

    let mut changes = Vec::new();
    while let Some(change) = es.drain_journal() {
        changes.push(change);
    }

    assert!(changes
        .iter()
        .any(|c| matches!(c, Change::Added { size: Some(3), .. })));
}
