//! Error types for Oven operations.
//!
//! [`OvenError`] wraps every failure a pipeline run can end with. The
//! `Parse` and `Resolve` variants keep the source their spans point into.

use std::io;

use thiserror::Error;

use oven_parser::error::ParseError;

use crate::resolve::ResolveError;

/// The main error type for Oven operations.
#[derive(Debug, Error)]
pub enum OvenError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Resolve error: {err}")]
    Resolve { err: ResolveError, src: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl OvenError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }

    /// Create a new `Resolve` error with the associated source code.
    pub fn new_resolve_error(err: ResolveError, src: impl Into<String>) -> Self {
        Self::Resolve {
            err,
            src: src.into(),
        }
    }
}
