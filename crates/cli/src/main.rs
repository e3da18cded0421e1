//! The `samiam` binary: the thin frontend spec.md §6 documents as an
//! external collaborator. Reads a program from a file (memory-mapped,
//! matching the teacher's `ancsr` crate) or from standard input,
//! parses it, and runs it to completion via `sam_runtime::execute`.

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use memmap2::Mmap;

use sam_runtime::{execute, ExecutionState, IoVTable, Options};

const EXIT_PARSE_ERROR: i64 = -2;
const EXIT_USAGE: i64 = -3;

#[derive(Parser)]
#[command(name = "samiam", about = "Runs a SaM assembly program.")]
struct Cli {
    /// Suppresses diagnostic text written to standard error.
    #[arg(short, long)]
    quiet: bool,

    /// The program to run. Reads standard input if omitted.
    file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(exit_code_to_byte(EXIT_USAGE));
        }
    };

    let source = match read_source(cli.file.as_deref()) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("samiam: {err}");
            return ExitCode::from(exit_code_to_byte(EXIT_USAGE));
        }
    };

    let program = match sam_parser::parse(&source) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("samiam: {err}");
            return ExitCode::from(exit_code_to_byte(EXIT_PARSE_ERROR));
        }
    };

    let options = if cli.quiet {
        Options::QUIET
    } else {
        Options::default()
    };

    let mut state = match ExecutionState::new(program, options, IoVTable::new()) {
        Ok(state) => state,
        Err(err) => {
            eprintln!("samiam: {err}");
            return ExitCode::from(exit_code_to_byte(EXIT_PARSE_ERROR));
        }
    };

    ExitCode::from(exit_code_to_byte(execute(&mut state)))
}

/// Reads the program text from `path`, memory-mapping regular files the
/// way the teacher's `ancsr` crate does, or from standard input when no
/// path is given.
fn read_source(path: Option<&std::path::Path>) -> io::Result<String> {
    match path {
        Some(path) => {
            let file = File::open(path)?;
            // SAFETY: the file is opened read-only for the lifetime of
            // this mapping and isn't concurrently truncated by us.
            let mmap = unsafe { Mmap::map(&file)? };
            String::from_utf8(mmap.to_vec())
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
        }
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

/// Exit codes are signed (spec.md §6: -1/-2/-3 carry meaning) but
/// process exit codes are unsigned bytes; we wrap the low byte the way
/// a Unix shell already interprets any process's exit status.
fn exit_code_to_byte(code: i64) -> u8 {
    (code as i32 as u8 as i8) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_exit_codes_wrap_like_a_unix_process_status() {
        assert_eq!(exit_code_to_byte(-1), 255);
        assert_eq!(exit_code_to_byte(-2), 254);
        assert_eq!(exit_code_to_byte(-3), 253);
    }

    #[test]
    fn positive_exit_codes_pass_through() {
        assert_eq!(exit_code_to_byte(0), 0);
        assert_eq!(exit_code_to_byte(7), 7);
    }
}
