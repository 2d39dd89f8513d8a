//! Owned parse tree produced by the [`parser`](super::parser).
//!
//! These types mirror the surface syntax closely. The
//! [`builder`](super::builder) lowers them into the [`oven_core::ast::Ast`]
//! arena.

use oven_core::{
    ast::{PartialTarget, Special},
    identifier::Id,
    span::Span,
    types::{Literal, TypeRef},
};

/// `[Name]`, `[Name(args)]`, `[Name=Ident]` or `[Name=Ident(args)]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedAttribute {
    pub name: Id,
    pub identity: Option<Id>,
    /// `None` when the attribute has no argument list at all.
    pub arguments: Option<Vec<Argument>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub attributes: Vec<ExtendedAttribute>,
    pub name: Id,
    pub value_type: TypeRef,
    pub default: Option<Literal>,
    pub optional: bool,
    pub variadic: bool,
    pub span: Span,
}

/// A member of an interface, dictionary or exception body.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub attributes: Vec<ExtendedAttribute>,
    /// Empty for anonymous operations.
    pub name: Id,
    pub kind: MemberKind,
    /// From the first extended attribute or keyword to the closing `;`.
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberKind {
    Const {
        value_type: TypeRef,
        value: Literal,
    },
    Attribute {
        value_type: TypeRef,
        inherited: bool,
        readonly: bool,
    },
    Operation {
        return_type: TypeRef,
        is_static: bool,
        specials: Vec<Special>,
        arguments: Vec<Argument>,
        raises: Vec<Id>,
    },
    DictionaryMember {
        value_type: TypeRef,
        default: Option<Literal>,
    },
    Field {
        value_type: TypeRef,
    },
}

/// A top-level or module-level definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub attributes: Vec<ExtendedAttribute>,
    pub name: Id,
    pub kind: DefinitionKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DefinitionKind {
    Module {
        definitions: Vec<Definition>,
    },
    Interface {
        inherit: Option<Id>,
        callback: bool,
        members: Vec<Member>,
    },
    Callback {
        return_type: TypeRef,
        arguments: Vec<Argument>,
    },
    Partial {
        target: PartialTarget,
        members: Vec<Member>,
    },
    Dictionary {
        inherit: Option<Id>,
        members: Vec<Member>,
    },
    Exception {
        inherit: Option<Id>,
        members: Vec<Member>,
    },
    Enum {
        values: Vec<Id>,
    },
    Typedef {
        aliased: TypeRef,
    },
    /// `name implements implemented;`
    Implements {
        implemented: Id,
    },
}
