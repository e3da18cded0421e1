//! Diagnostic text formatting: the `samiam: line N: ...` prefix every
//! warning/error carries, and the default backtrace renderer. Grounded
//! on `examples/original_source/src/libsam/error.c`'s per-error
//! `sam_io_fprintf` calls and `src/libsam/io.c`'s `sam_io_bt_default`.

use sam_types::{Ml, Sa};

use crate::execution_state::ExecutionState;
use crate::io::Stream;
use crate::options::Options;

/// Prefixes a message with the current program address, matching
/// spec.md §4.8's `samiam: line <n>: <message>` format.
pub fn format_diagnostic(pc_line: u32, message: &str) -> String {
    format!("samiam: line {pc_line}: {message}")
}

fn render_cell(value: Ml) -> String {
    match value {
        Ml::None => "-: uninitialized".to_string(),
        Ml::Int(i) => format!("i: {i}"),
        Ml::Float(f) => format!("f: {f}"),
        Ml::Pa(pa) => format!("p: {pa}"),
        Ml::Ha(ha) => format!("h: {ha}"),
        Ml::Sa(sa) => format!("s: {sa}"),
    }
}

/// Renders the default backtrace: `"backtrace:"` followed by one line
/// per stack slot from the top down, marking the current `fbr`.
pub fn render_backtrace(es: &ExecutionState) -> String {
    let fbr = es.fbr();
    let mut out = String::from("backtrace:");
    for i in (0..es.stack_len()).rev() {
        if let Ok(value) = es.stack_get(Sa(i)) {
            let marker = if Sa(i) == fbr { "==>" } else { "   " };
            out.push_str(&format!("\n{marker} [{i}] {}", render_cell(value)));
        }
    }
    out
}

/// Prints the backtrace if `es.bt_flag()` is set, respecting quiet
/// mode the same way every other diagnostic does.
pub fn print_backtrace_if_flagged(es: &ExecutionState) {
    if es.bt_flag() && !es.options().contains(Options::QUIET) {
        let _ = es.write(Stream::Err, &format!("{}\n", render_backtrace(es)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_diagnostic_includes_the_line_number() {
        assert_eq!(
            format_diagnostic(4, "stack underflow"),
            "samiam: line 4: stack underflow"
        );
    }

    #[test]
    fn backtrace_marks_the_frame_base() {
        let program = sam_parser::parse("STOP\n").unwrap();
        let mut es = ExecutionState::new(
            program,
            Options::default(),
            crate::io::IoVTable::new(),
        )
        .unwrap();
        es.stack_push(Ml::Int(1)).unwrap();
        es.stack_push(Ml::Int(2)).unwrap();
        es.set_fbr(Sa(1));
        let rendered = render_backtrace(&es);
        assert!(rendered.starts_with("backtrace:"));
        assert!(rendered.contains("==> [1]"));
    }
}
