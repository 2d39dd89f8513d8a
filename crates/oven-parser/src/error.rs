//! Error and diagnostic system for the Oven parser.
//!
//! The error system is built around the [`Diagnostic`] type: one error or
//! warning with an optional [`ErrorCode`], labeled source spans and help text.
//! Fatal problems are returned as a [`ParseError`]; recovered lexical
//! problems travel alongside a successful parse as warnings.
//!
//! # Example
//!
//! ```
//! # use oven_parser::error::{Diagnostic, ErrorCode};
//! # use oven_parser::Span;
//!
//! let diag = Diagnostic::error("syntax error at '}' on line 3")
//!     .with_code(ErrorCode::E100)
//!     .with_label(Span::new(40..41), "unexpected token")
//!     .with_help("check for a missing `;`");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
