use std::fmt;

/// Error kinds for categorizing parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A line matched none of the lexer rules
    UnknownLine,
    /// `#+end_NAME` without an open `#+begin_NAME`
    UnmatchedEnd,
    /// `#+begin_NAME` without its `#+end_NAME`
    UnclosedDirective,
    /// Table parsing found no row where one was required
    ExpectedTableRow,
}

/// A fatal parse error.
///
/// Every error aborts the parse; there is no partial document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Human-readable error message
    pub message: String,
    /// 1-based source line where the error was detected
    pub line: Option<u32>,
    /// Error categorization
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            message: message.into(),
            line,
            kind,
        }
    }

    /// Create an error for a line no lexer rule accepts.
    pub fn unknown_line(text: &str, line: u32) -> Self {
        Self::new(
            ParseErrorKind::UnknownLine,
            format!("SyntaxError: Unknown line: {}", text),
            Some(line),
        )
    }

    /// Create an error for an end directive without a matching begin.
    pub fn unmatched_end(name: &str, line: u32) -> Self {
        Self::new(
            ParseErrorKind::UnmatchedEnd,
            format!("Unmatched 'end' directive for {}", name),
            Some(line),
        )
    }

    /// Create an error for a begin directive that is never closed.
    pub fn unclosed_directive(name: &str, line: u32) -> Self {
        Self::new(
            ParseErrorKind::UnclosedDirective,
            format!("Unclosed directive {}", name),
            Some(line),
        )
    }

    /// Create an error for a missing table row.
    pub fn expected_table_row(line: u32) -> Self {
        Self::new(
            ParseErrorKind::ExpectedTableRow,
            "Expected table row",
            Some(line),
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(line) = self.line {
            write!(f, " at line {}", line)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}
