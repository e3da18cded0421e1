use std::fmt;

/// A syntax error, carrying the 1-based source line it occurred on so the
/// CLI can format `samiam: line <n>: <message>` the same way an
/// execution-time `SamError` does.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub line: u32,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: u32, kind: ParseErrorKind) -> Self {
        ParseError { line, kind }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Couldn't read an identifier where one was expected.
    Identifier,
    /// The opcode mnemonic isn't in the signature table.
    UnknownOpcode(String),
    /// The opcode's operand couldn't be parsed as any of its allowed
    /// types.
    Operand { opcode: String },
    /// The same label text was bound twice.
    DuplicateLabel(String),
    /// The source file produced no instructions.
    EmptyInput,
    /// An unterminated string or char literal, or an invalid escape.
    Lex(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match &self.kind {
            ParseErrorKind::Identifier => write!(f, "couldn't parse identifier"),
            ParseErrorKind::UnknownOpcode(name) => write!(f, "unknown opcode found: {name}"),
            ParseErrorKind::Operand { opcode } => {
                write!(f, "couldn't parse operand for {opcode}")
            }
            ParseErrorKind::DuplicateLabel(name) => {
                write!(f, "duplicate label \"{name}\" was found")
            }
            ParseErrorKind::EmptyInput => write!(f, "empty source file"),
            ParseErrorKind::Lex(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ParseError {}
