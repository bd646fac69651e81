use crate::lexer::{Token, TokenKind};
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InnerParseError {
    #[error("Expected {expected}, but got {got}")]
    ExpectedButGot { expected: TokenKind, got: String },
    #[error("Expected identifier, but got {got}")]
    ExpectedIdentifier { got: String },
    #[error("Expected type specifier, but got {got}")]
    ExpectedTypeSpecifier { got: String },
    #[error("Expected expression, but got {got}")]
    ExpectedExpression { got: String },
    #[error("Unsupported declaration starting with {got}")]
    UnsupportedDeclaration { got: String },
}

/// A parse error pinned to the source position of the offending token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub inner: InnerParseError,
    pub line: u32,
    pub column: u32,
}

impl InnerParseError {
    pub fn at(self, token: &Token) -> ParseError {
        ParseError {
            inner: self,
            line: token.line,
            column: token.column,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl std::error::Error for ParseError {}
