//! Oven Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Oven parser and
//! resolver. It includes:
//!
//! - **Identifiers**: String-interned identifiers ([`identifier::Id`])
//! - **Types**: Type references and literal values ([`types`] module)
//! - **AST**: The arena-backed declaration tree ([`ast`] module)
//! - **Spans**: Byte ranges into the source ([`span::Span`])

pub mod ast;
pub mod identifier;
pub mod span;
pub mod types;
