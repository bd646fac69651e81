//! Shared diagnostics sink.
//!
//! Every stage reports through one [`Diagnostics`] value and keeps going where
//! it can; the driver checks [`has_errors`](Diagnostics::has_errors) between
//! stages. Entries print as `<file>:<line>:<column>: <level>: <message>`, one
//! per line, in insertion order.

use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub file: Rc<str>,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {}",
            self.file, self.line, self.column, self.level, self.message
        )
    }
}

#[derive(Debug)]
pub struct Diagnostics {
    file: Rc<str>,
    entries: Vec<Diagnostic>,
    had_error: bool,
}

impl Diagnostics {
    pub fn new(filename: &str) -> Self {
        Self {
            file: Rc::from(filename),
            entries: Vec::new(),
            had_error: false,
        }
    }

    /// Name of the translation unit this sink reports against. Tokens borrow
    /// it so positions and diagnostics always agree on the file.
    pub fn file(&self) -> Rc<str> {
        Rc::clone(&self.file)
    }

    pub fn info(&mut self, line: u32, column: u32, message: impl Into<String>) {
        self.push(Level::Info, line, column, message.into());
    }

    pub fn warning(&mut self, line: u32, column: u32, message: impl Into<String>) {
        self.push(Level::Warning, line, column, message.into());
    }

    pub fn error(&mut self, line: u32, column: u32, message: impl Into<String>) {
        self.had_error = true;
        self.push(Level::Error, line, column, message.into());
    }

    fn push(&mut self, level: Level, line: u32, column: u32, message: String) {
        self.entries.push(Diagnostic {
            level,
            message,
            file: Rc::clone(&self.file),
            line,
            column,
        });
    }

    /// Sticky: true once any error-level entry has been recorded.
    pub fn has_errors(&self) -> bool {
        self.had_error
    }

    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.level == Level::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.level == Level::Warning)
            .count()
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Print every accumulated diagnostic to stderr, then forget them so a
    /// later gate does not print the same entries twice.
    pub fn flush(&mut self) {
        for entry in self.entries.drain(..) {
            eprintln!("{entry}");
        }
    }
}

#[cfg(test)]
mod diag_tests {
    use super::*;

    #[test]
    fn test_error_is_sticky() {
        let mut diag = Diagnostics::new("t.c");
        diag.warning(1, 1, "w");
        assert!(!diag.has_errors());
        diag.error(2, 3, "e");
        assert!(diag.has_errors());
        assert_eq!(diag.error_count(), 1);
        assert_eq!(diag.warning_count(), 1);
    }

    #[test]
    fn test_display_format() {
        let mut diag = Diagnostics::new("main.c");
        diag.error(4, 7, "Undefined variable 'x'");
        let rendered = diag.entries()[0].to_string();
        assert_eq!(rendered, "main.c:4:7: error: Undefined variable 'x'");
    }
}
