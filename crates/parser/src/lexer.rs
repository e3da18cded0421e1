//! Tokenizes SaM assembly source into a flat token stream, tracking the
//! 1-based source line of every token so the parser's errors can point
//! at a line number (spec.md §4.8's diagnostic format).
//!
//! Unlike a typed operand grammar, a bare number here stays a `Number`
//! token carrying its raw text: whether it resolves to `Int` or `Float`
//! depends on the opcode's operand mask, which only the parser knows
//! (spec.md §4.5).

use crate::error::{ParseError, ParseErrorKind};
use crate::peekable_iterator::PeekableIterator;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Number(String),
    QuotedString(Vec<u8>),
    QuotedChar(char),
    Colon,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocatedToken {
    pub token: Token,
    pub line: u32,
}

pub fn lex(source: &str) -> Result<Vec<LocatedToken>, ParseError> {
    let source = skip_shebang(source);

    let mut chars = source.chars();
    let mut iter = PeekableIterator::new(&mut chars, 1);
    let mut tokens = Vec::new();
    let mut line: u32 = 1;

    while let Some(ch) = iter.next() {
        match ch {
            '\n' => line += 1,
            ' ' | '\t' | '\r' => {}
            '/' if iter.look_ahead(0, &'/') => {
                skip_line_comment(&mut iter);
            }
            '.' => {
                // An inert directive: the original interpreter recognizes
                // the syntax but never acts on it (`roi`/`rof`/`global`/
                // `import`/`export` all no-op). We drop the whole line.
                skip_line_comment(&mut iter);
            }
            ':' => tokens.push(LocatedToken {
                token: Token::Colon,
                line,
            }),
            '"' => {
                let bytes = lex_string(&mut iter, line)?;
                tokens.push(LocatedToken {
                    token: Token::QuotedString(bytes),
                    line,
                });
            }
            '\'' => {
                let c = lex_char(&mut iter, line)?;
                tokens.push(LocatedToken {
                    token: Token::QuotedChar(c),
                    line,
                });
            }
            '-' if matches!(iter.peek(0), Some(c) if c.is_ascii_digit()) => {
                let text = lex_number(ch, &mut iter);
                tokens.push(LocatedToken {
                    token: Token::Number(text),
                    line,
                });
            }
            '0'..='9' => {
                let text = lex_number(ch, &mut iter);
                tokens.push(LocatedToken {
                    token: Token::Number(text),
                    line,
                });
            }
            'A'..='Z' | 'a'..='z' | '_' => {
                let text = lex_ident(ch, &mut iter);
                tokens.push(LocatedToken {
                    token: Token::Ident(text),
                    line,
                });
            }
            other => {
                return Err(ParseError::new(
                    line,
                    ParseErrorKind::Lex(format!("unexpected char: {other}")),
                ))
            }
        }
    }

    Ok(tokens)
}

fn skip_shebang(source: &str) -> &str {
    if let Some(rest) = source.strip_prefix("#!") {
        match rest.find('\n') {
            Some(pos) => &rest[pos..],
            None => "",
        }
    } else {
        source
    }
}

fn skip_line_comment(iter: &mut PeekableIterator<char>) {
    while let Some(c) = iter.peek(0) {
        if *c == '\n' {
            break;
        }
        iter.next();
    }
}

fn lex_ident(first: char, iter: &mut PeekableIterator<char>) -> String {
    let mut s = String::new();
    s.push(first);
    while let Some(c) = iter.peek(0) {
        if c.is_ascii_alphanumeric() || *c == '_' {
            s.push(*c);
            iter.next();
        } else {
            break;
        }
    }
    s
}

fn lex_number(first: char, iter: &mut PeekableIterator<char>) -> String {
    let mut s = String::new();
    s.push(first);
    while let Some(c) = iter.peek(0) {
        match *c {
            '0'..='9' | '.' | 'e' | 'E' | 'x' | 'X' | '+' | '-' | 'a'..='f' | 'A'..='F' => {
                s.push(*c);
                iter.next();
            }
            _ => break,
        }
    }
    s
}

fn lex_string(iter: &mut PeekableIterator<char>, line: u32) -> Result<Vec<u8>, ParseError> {
    let mut bytes = Vec::new();
    loop {
        match iter.next() {
            Some('"') => return Ok(bytes),
            Some('\\') => {
                let c = lex_escape(iter, line)?;
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
            Some(c) => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
            None => {
                return Err(ParseError::new(
                    line,
                    ParseErrorKind::Lex("missing end quote for string".to_string()),
                ))
            }
        }
    }
}

fn lex_char(iter: &mut PeekableIterator<char>, line: u32) -> Result<char, ParseError> {
    let c = match iter.next() {
        Some('\\') => lex_escape(iter, line)?,
        Some(c) => c,
        None => {
            return Err(ParseError::new(
                line,
                ParseErrorKind::Lex("missing char literal".to_string()),
            ))
        }
    };
    match iter.next() {
        Some('\'') => Ok(c),
        _ => Err(ParseError::new(
            line,
            ParseErrorKind::Lex("unterminated char literal".to_string()),
        )),
    }
}

/// The escape set matching `examples/original_source/src/libsam/parse.c`'s
/// `sam_try_parse_escape_sequence`: the standard C single-char escapes,
/// `\xHH...` hex, and `\NNN...` decimal-or-octal (base-0 `strtol` rules:
/// a leading `0` digit selects octal, any other leading digit selects
/// decimal, and the digit run is unbounded either way).
fn lex_escape(iter: &mut PeekableIterator<char>, line: u32) -> Result<char, ParseError> {
    let c = iter.next().ok_or_else(|| {
        ParseError::new(line, ParseErrorKind::Lex("incomplete escape".to_string()))
    })?;
    let value = match c {
        '"' => '"' as u32,
        '\'' => '\'' as u32,
        '\\' => '\\' as u32,
        'a' => 0x07,
        'b' => 0x08,
        'f' => 0x0c,
        'n' => b'\n' as u32,
        'r' => b'\r' as u32,
        't' => b'\t' as u32,
        'v' => 0x0b,
        'x' => {
            let mut digits = String::new();
            while matches!(iter.peek(0), Some(d) if d.is_ascii_hexdigit()) {
                digits.push(iter.next().unwrap());
            }
            u32::from_str_radix(&digits, 16).map_err(|_| {
                ParseError::new(line, ParseErrorKind::Lex("invalid hex escape".to_string()))
            })?
        }
        '0'..='9' => {
            // Mirrors `strtol(prev, &start, 0)`: a leading `0` selects
            // octal and only octal digits continue the run; any other
            // leading digit selects decimal. Either way the run is
            // unbounded, and a non-digit-of-that-base simply ends it
            // (as `strtol` would stop consuming, not error).
            let radix: u32 = if c == '0' { 8 } else { 10 };
            let mut digits = String::new();
            digits.push(c);
            while matches!(iter.peek(0), Some(d) if d.to_digit(radix).is_some()) {
                digits.push(iter.next().unwrap());
            }
            u32::from_str_radix(&digits, radix).map_err(|_| {
                ParseError::new(
                    line,
                    ParseErrorKind::Lex("invalid numeric escape".to_string()),
                )
            })?
        }
        other => {
            return Err(ParseError::new(
                line,
                ParseErrorKind::Lex(format!("unsupported escape char: {other}")),
            ))
        }
    };
    char::from_u32(value).ok_or_else(|| {
        ParseError::new(
            line,
            ParseErrorKind::Lex("escape is not a valid char".to_string()),
        )
    })
}
