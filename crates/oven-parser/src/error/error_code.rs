//! Error codes for the Oven diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer diagnostics
//! - `E1xx` - Parser errors

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Diagnostics (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A string was opened with a quote but never closed. The quote is
    /// skipped and lexing resumes after it.
    E001,

    /// Illegal character.
    ///
    /// A character that starts no token. It is skipped.
    E002,

    /// Unterminated block comment.
    ///
    /// A `/*` without a matching `*/`. The `/` is skipped.
    E003,

    /// Integer literal out of range.
    ///
    /// The literal does not fit in a signed 64-bit integer.
    E004,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Syntax error.
    ///
    /// The parser encountered a token it did not expect at this position.
    E100,

    /// Unexpected end of input.
    ///
    /// The input ended before a complete definition was parsed.
    E101,
}

impl ErrorCode {
    /// Short description used as the primary label text.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "illegal character",
            ErrorCode::E003 => "unterminated block comment",
            ErrorCode::E004 => "integer literal out of range",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "unexpected end of input",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
