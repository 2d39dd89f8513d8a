//! Fatal outcome of [`parse`](crate::parse).

use std::{fmt, slice};

use crate::error::Diagnostic;

/// Why a source text could not be parsed.
#[derive(Debug)]
pub enum ParseError {
    /// Literals the lexer cannot represent.
    ///
    /// Lexing runs to the end of the input, so this holds every problem it
    /// found, warnings included, in source order.
    Lexical(Vec<Diagnostic>),
    /// The first token the grammar could not accept.
    Syntax(Diagnostic),
}

impl ParseError {
    /// Every diagnostic in source order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Lexical(diagnostics) => diagnostics,
            Self::Syntax(diagnostic) => slice::from_ref(diagnostic),
        }
    }

    /// Diagnostics with error severity.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics()
            .iter()
            .filter(|diagnostic| diagnostic.severity().is_error())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut errors = self.errors();
        let Some(first) = errors.next() else {
            return Ok(());
        };
        write!(f, "{first}")?;
        match errors.count() {
            0 => Ok(()),
            1 => write!(f, " (+1 more error)"),
            more => write!(f, " (+{more} more errors)"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::Syntax(diagnostic)
    }
}
