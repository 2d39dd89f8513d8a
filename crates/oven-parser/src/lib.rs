//! # Oven Parser
//!
//! Parser for the Oven WebIDL dialect. This crate turns description-language
//! source text into the [`oven_core::ast::Ast`] arena consumed by the resolver.
//!
//! ## Usage
//!
//! ```
//! # use oven_parser::{parse, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         module badge {
//!             interface BadgeManager {
//!                 long getBadgeCount(DOMString appId);
//!             };
//!         };
//!     "#;
//!
//!     let parsed = parse(source)?;
//!     assert_eq!(parsed.ast.roots().len(), 1);
//!     Ok(())
//! }
//! ```

mod builder;
pub mod error;
mod lexer;
mod parser;
mod parser_types;
mod tokens;

pub use oven_core::span::Span;

use log::{debug, warn};

use oven_core::ast::Ast;

use builder::Builder;
use error::{Diagnostic, ParseError};

/// Result of a successful parse.
#[derive(Debug)]
pub struct Parsed {
    pub ast: Ast,
    /// Recovered lexical problems, such as skipped illegal characters.
    pub warnings: Vec<Diagnostic>,
}

/// Parse source text into an AST.
///
/// The pipeline is:
///
/// 1. **Tokenize** - Convert source text to tokens, skipping illegal
///    characters with a warning
/// 2. **Parse** - Build the owned definition tree; the first mismatch aborts
/// 3. **Build** - Lower the definitions into the AST arena
///
/// # Errors
///
/// Returns a [`ParseError`] for syntax errors and for integer literals that
/// do not fit in 64 bits.
pub fn parse(source: &str) -> Result<Parsed, ParseError> {
    // Step 1: Tokenize
    let (tokens, warnings) = lexer::tokenize(source)?;
    for warning in &warnings {
        warn!(code:? = warning.code(); "{}", warning.message());
    }
    debug!(tokens = tokens.len(); "Tokenized source");

    // Step 2: Parse
    let definitions = parser::build_definitions(&tokens)?;

    // Step 3: Build
    let ast = Builder::new().build(&definitions);

    Ok(Parsed { ast, warnings })
}
