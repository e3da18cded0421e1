//! The I/O vtable (spec.md §6): three or four optional callbacks an
//! embedder can override, falling back to the process's standard
//! streams when unset. Grounded on
//! `examples/original_source/src/include/libsam/io.h`'s
//! `sam_io_vfprintf_func`/`sam_io_vfscanf_func`/`sam_io_afgets_func`/
//! `sam_io_bt_func` union.

use std::io::{self, BufRead, Write};

use sam_types::SamError;

/// Which standard stream a callback is talking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    In,
    Out,
    Err,
}

/// A boxed line-writer: receives already-formatted text (the handler
/// does the formatting; this type only owns the sink side), matching
/// `vfprintf`'s role without carrying C varargs into Rust.
pub type WriteFn = Box<dyn Fn(Stream, &str) -> io::Result<()>>;
pub type ReadLineFn = Box<dyn Fn(Stream) -> io::Result<Option<String>>>;
pub type BacktraceFn = Box<dyn Fn(&str)>;

/// The callback set. Every field is optional; `IoVTable::default()`
/// wires up plain stdin/stdout/stderr behavior, matching the original's
/// "dispatcher may return null, in which case the builtin is used"
/// contract.
pub struct IoVTable {
    write: Option<WriteFn>,
    read_line: Option<ReadLineFn>,
    backtrace: Option<BacktraceFn>,
}

impl Default for IoVTable {
    fn default() -> Self {
        IoVTable {
            write: None,
            read_line: None,
            backtrace: None,
        }
    }
}

impl IoVTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_write(mut self, f: WriteFn) -> Self {
        self.write = Some(f);
        self
    }

    pub fn with_read_line(mut self, f: ReadLineFn) -> Self {
        self.read_line = Some(f);
        self
    }

    pub fn with_backtrace(mut self, f: BacktraceFn) -> Self {
        self.backtrace = Some(f);
        self
    }

    /// Writes already-formatted text to `stream`, via the custom
    /// callback if one is registered, else the real standard stream.
    pub fn write(&self, stream: Stream, text: &str) -> Result<(), SamError> {
        let result = match &self.write {
            Some(f) => f(stream, text),
            None => match stream {
                Stream::Out => {
                    print!("{text}");
                    io::stdout().flush()
                }
                Stream::Err => {
                    eprint!("{text}");
                    io::stderr().flush()
                }
                Stream::In => Ok(()),
            },
        };
        result.map_err(|e| SamError::Io(e.to_string()))
    }

    /// Reads one line from `stream`, trimming the trailing newline.
    /// `None` means EOF.
    pub fn read_line(&self, stream: Stream) -> Result<Option<String>, SamError> {
        match &self.read_line {
            Some(f) => f(stream).map_err(|e| SamError::Io(e.to_string())),
            None => {
                let mut line = String::new();
                let n = io::stdin()
                    .lock()
                    .read_line(&mut line)
                    .map_err(|e| SamError::Io(e.to_string()))?;
                if n == 0 {
                    Ok(None)
                } else {
                    if line.ends_with('\n') {
                        line.pop();
                        if line.ends_with('\r') {
                            line.pop();
                        }
                    }
                    Ok(Some(line))
                }
            }
        }
    }

    /// Renders a backtrace. `rendered` is the default textual form;
    /// a registered callback may ignore it and produce its own.
    pub fn backtrace(&self, rendered: &str) {
        match &self.backtrace {
            Some(f) => f(rendered),
            None => eprintln!("{rendered}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn custom_write_callback_is_used_over_stdio() {
        let captured = Rc::new(RefCell::new(String::new()));
        let sink = captured.clone();
        let vtable = IoVTable::new().with_write(Box::new(move |_stream, text| {
            sink.borrow_mut().push_str(text);
            Ok(())
        }));
        vtable.write(Stream::Out, "hello").unwrap();
        assert_eq!(*captured.borrow(), "hello");
    }

    #[test]
    fn custom_read_line_feeds_canned_input() {
        let vtable = IoVTable::new().with_read_line(Box::new(|_stream| Ok(Some("42".to_string()))));
        assert_eq!(vtable.read_line(Stream::In).unwrap(), Some("42".to_string()));
    }
}
