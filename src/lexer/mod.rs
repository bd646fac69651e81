//! Hand-written scanner for the C subset.
//!
//! Disambiguation of multi-character operators is maximal munch: for every
//! leading operator character the scanner peeks up to two characters ahead and
//! takes the longest match. Lexical errors are reported to the diagnostics
//! sink and scanning continues past the offending construct, so a broken
//! literal never hides the rest of the file.

mod cursor;
mod token;

use crate::diag::Diagnostics;
use cursor::{Cursor, Mark};
pub use token::{keyword_kind, Token, TokenKind};

pub type Tokens = Vec<Token>;

/// Interpret a character escape (`\n`, `\t`, ..) as the character it denotes.
/// Returns `None` for escapes outside the supported set.
pub fn decode_escape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '0' => Some('\0'),
        '\\' => Some('\\'),
        '\'' => Some('\''),
        '"' => Some('"'),
        'a' => Some('\x07'),
        'b' => Some('\x08'),
        'f' => Some('\x0c'),
        'v' => Some('\x0b'),
        '?' => Some('?'),
        _ => None,
    }
}

fn lex_mcharop3(first: char, second: char, third: char) -> Option<TokenKind> {
    match (first, second, third) {
        ('<', '<', '=') => Some(TokenKind::ShlAssign),
        ('>', '>', '=') => Some(TokenKind::ShrAssign),
        _ => None,
    }
}

fn lex_mcharop2(first: char, second: char) -> Option<TokenKind> {
    match (first, second) {
        ('+', '+') => Some(TokenKind::PlusPlus),
        ('-', '-') => Some(TokenKind::MinusMinus),
        ('-', '>') => Some(TokenKind::Arrow),
        ('&', '&') => Some(TokenKind::AmpAmp),
        ('|', '|') => Some(TokenKind::PipePipe),
        ('=', '=') => Some(TokenKind::EqualEqual),
        ('!', '=') => Some(TokenKind::BangEqual),
        ('<', '=') => Some(TokenKind::LessEqual),
        ('>', '=') => Some(TokenKind::GreaterEqual),
        ('<', '<') => Some(TokenKind::Shl),
        ('>', '>') => Some(TokenKind::Shr),
        ('+', '=') => Some(TokenKind::PlusAssign),
        ('-', '=') => Some(TokenKind::MinusAssign),
        ('*', '=') => Some(TokenKind::StarAssign),
        ('/', '=') => Some(TokenKind::SlashAssign),
        ('%', '=') => Some(TokenKind::PercentAssign),
        ('&', '=') => Some(TokenKind::AmpAssign),
        ('|', '=') => Some(TokenKind::PipeAssign),
        ('^', '=') => Some(TokenKind::CaretAssign),
        _ => None,
    }
}

fn lex_mcharoperator(cursor: &mut Cursor) -> TokenKind {
    let first = cursor.take().expect("caller peeked an operator char");

    if let (Some(second), Some(third)) = (cursor.peek(), cursor.peek_2nd()) {
        if let Some(op) = lex_mcharop3(first, second, third) {
            cursor.take();
            cursor.take();
            return op;
        }
    }

    if let Some(second) = cursor.peek() {
        if let Some(op) = lex_mcharop2(first, second) {
            cursor.take();
            return op;
        }
    }

    TokenKind::try_from(first).expect("single-char operator")
}

/// `.` is an ellipsis when two more dots follow, otherwise member access.
fn lex_dot(cursor: &mut Cursor) -> TokenKind {
    cursor.take();
    if cursor.peek() == Some('.') && cursor.peek_2nd() == Some('.') {
        cursor.take();
        cursor.take();
        TokenKind::Ellipsis
    } else {
        TokenKind::Dot
    }
}

fn lex_identifier(cursor: &mut Cursor, start: Mark) -> TokenKind {
    while cursor.skip_if(|c| c.is_ascii_alphanumeric() || c == '_') {}
    keyword_kind(cursor.slice_from(start)).unwrap_or(TokenKind::Identifier)
}

/// Numeric literal: digits, an optional fraction (only when a digit follows
/// the dot), an optional exponent and the usual suffixes. The token is a
/// float when a dot, an exponent or an `f`/`F` suffix appeared.
fn lex_number(cursor: &mut Cursor, start: Mark, diag: &mut Diagnostics) -> Option<TokenKind> {
    let mut is_float = false;

    while cursor.skip_if(|c| c.is_ascii_digit()) {}

    if cursor.peek() == Some('.') && cursor.peek_2nd().is_some_and(|c| c.is_ascii_digit()) {
        is_float = true;
        cursor.take();
        while cursor.skip_if(|c| c.is_ascii_digit()) {}
    }

    if matches!(cursor.peek(), Some('e' | 'E')) {
        is_float = true;
        cursor.take();
        if matches!(cursor.peek(), Some('+' | '-')) {
            cursor.take();
        }
        if !cursor.peek().is_some_and(|c| c.is_ascii_digit()) {
            diag.error(
                start.line,
                start.column,
                "Invalid floating point number: exponent has no digits",
            );
            return None;
        }
        while cursor.skip_if(|c| c.is_ascii_digit()) {}
    }

    if matches!(cursor.peek(), Some('f' | 'F')) {
        is_float = true;
        cursor.take();
    } else if matches!(cursor.peek(), Some('l' | 'L')) {
        cursor.take();
        if matches!(cursor.peek(), Some('u' | 'U')) {
            cursor.take();
        }
    } else if matches!(cursor.peek(), Some('u' | 'U')) {
        cursor.take();
        if matches!(cursor.peek(), Some('l' | 'L')) {
            cursor.take();
        }
    }

    Some(if is_float {
        TokenKind::FloatLiteral
    } else {
        TokenKind::IntLiteral
    })
}

/// String literal. The lexeme keeps the enclosing quotes; a backslash always
/// consumes the character after it, so an escaped quote never terminates the
/// literal.
fn lex_string(cursor: &mut Cursor, start: Mark, diag: &mut Diagnostics) -> Option<TokenKind> {
    cursor.take();

    loop {
        match cursor.peek() {
            None => {
                diag.error(start.line, start.column, "Unterminated string literal");
                return None;
            }
            Some('"') => {
                cursor.take();
                return Some(TokenKind::StrLiteral);
            }
            Some('\\') => {
                cursor.take();
                if cursor.take().is_none() {
                    diag.error(
                        start.line,
                        start.column,
                        "Unterminated string literal: expected escape sequence",
                    );
                    return None;
                }
            }
            Some(_) => {
                cursor.take();
            }
        }
    }
}

fn lex_character(cursor: &mut Cursor, start: Mark, diag: &mut Diagnostics) -> Option<TokenKind> {
    cursor.take();

    match cursor.peek() {
        Some('\\') => {
            cursor.take();
            let Some(escape) = cursor.take() else {
                diag.error(
                    start.line,
                    start.column,
                    "Unterminated character literal: expected escape sequence",
                );
                return None;
            };
            if decode_escape(escape).is_none() {
                diag.error(
                    start.line,
                    start.column,
                    format!("Unknown escape sequence: \\{escape}"),
                );
            }
        }
        Some('\'') => {
            diag.error(start.line, start.column, "Empty character literal");
            cursor.take();
            return None;
        }
        Some(_) => {
            cursor.take();
        }
        None => {
            diag.error(start.line, start.column, "Unterminated character literal");
            return None;
        }
    }

    if cursor.peek() != Some('\'') {
        diag.error(
            start.line,
            start.column,
            "Multi-character character literal or missing closing quote",
        );
        while !cursor.at_end() && cursor.peek() != Some('\'') {
            cursor.take();
        }
    }

    if cursor.bump_if('\'') {
        Some(TokenKind::CharLiteral)
    } else {
        diag.error(start.line, start.column, "Unterminated character literal");
        None
    }
}

/// Whitespace and comments. `//` runs to the next newline (left unconsumed
/// for line accounting by the outer loop), `/* */` runs to its terminator and
/// is an error when the input ends first.
fn skip_whitespace(cursor: &mut Cursor, diag: &mut Diagnostics) {
    loop {
        match cursor.peek() {
            Some(' ' | '\t' | '\r' | '\n') => {
                cursor.take();
            }
            Some('/') if cursor.peek_2nd() == Some('/') => {
                cursor.take();
                cursor.take();
                while !cursor.at_end() && cursor.peek() != Some('\n') {
                    cursor.take();
                }
            }
            Some('/') if cursor.peek_2nd() == Some('*') => {
                let start = cursor.mark();
                cursor.take();
                cursor.take();
                loop {
                    if cursor.at_end() {
                        diag.error(start.line, start.column, "Unterminated block comment");
                        return;
                    }
                    if cursor.peek() == Some('*') && cursor.peek_2nd() == Some('/') {
                        cursor.take();
                        cursor.take();
                        break;
                    }
                    cursor.take();
                }
            }
            _ => return,
        }
    }
}

/// Scan a whole translation unit. Never fails: errors are reported through
/// the sink and scanning resumes after the bad construct. The result always
/// ends with exactly one `Eof` token.
pub fn lex(source: &str, diag: &mut Diagnostics) -> Tokens {
    let file = diag.file();
    let mut tokens = Tokens::new();
    let mut cursor = Cursor::new(source);

    loop {
        skip_whitespace(&mut cursor, diag);
        let start = cursor.mark();
        let Some(peek) = cursor.peek() else { break };

        let kind = match peek {
            ';' | ':' | ',' | '(' | ')' | '{' | '}' | '[' | ']' | '~' | '?' | '#' => {
                cursor.take();
                Some(TokenKind::try_from(peek).expect("single-char punctuation"))
            }
            '+' | '-' | '*' | '/' | '%' | '&' | '|' | '^' | '=' | '!' | '<' | '>' => {
                Some(lex_mcharoperator(&mut cursor))
            }
            '.' => Some(lex_dot(&mut cursor)),
            '_' | 'a'..='z' | 'A'..='Z' => Some(lex_identifier(&mut cursor, start)),
            '0'..='9' => lex_number(&mut cursor, start, diag),
            '"' => lex_string(&mut cursor, start, diag),
            '\'' => lex_character(&mut cursor, start, diag),
            _ => {
                cursor.take();
                diag.error(
                    start.line,
                    start.column,
                    format!("Unexpected character: {peek}"),
                );
                None
            }
        };

        if let Some(kind) = kind {
            let lexeme = cursor.slice_from(start).to_owned();
            tokens.push(Token::new(
                kind,
                lexeme,
                file.clone(),
                start.line,
                start.column,
            ));
        }
    }

    tokens.push(Token::new(
        TokenKind::Eof,
        String::new(),
        file,
        cursor.line(),
        cursor.column(),
    ));
    tokens
}
