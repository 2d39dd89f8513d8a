//! Type references and literal values.
//!
//! A [`TypeRef`] describes the *shape* of a referenced type: its base name,
//! union members, array depth and qualifiers. It is a plain value attached
//! to declarations, never an AST node.

use std::fmt;

use crate::identifier::Id;

/// Reference to a type as written in a declaration.
///
/// `sequence` and non-empty `union_members` describe different shapes of
/// the same reference; consumers must handle them as distinct cases.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    base_name: Id,
    union_members: Vec<TypeRef>,
    array_depth: usize,
    nullable: bool,
    sequence: bool,
    unsigned: bool,
    unrestricted: bool,
}

impl TypeRef {
    /// Name used for the return type of operations that return nothing.
    pub const VOID: &'static str = "void";

    /// Creates a reference to a named (primitive or user-declared) type.
    pub fn named(name: impl Into<Id>) -> Self {
        Self {
            base_name: name.into(),
            union_members: Vec::new(),
            array_depth: 0,
            nullable: false,
            sequence: false,
            unsigned: false,
            unrestricted: false,
        }
    }

    /// Creates the `void` return type.
    pub fn void() -> Self {
        Self::named(Self::VOID)
    }

    /// Creates a union of the given member types.
    ///
    /// Unions carry an empty base name.
    pub fn union(members: Vec<TypeRef>) -> Self {
        Self {
            union_members: members,
            ..Self::named("")
        }
    }

    /// Wraps `self` as the element of a `sequence<...>`.
    ///
    /// The element's base name, union members and numeric qualifiers are
    /// kept so the sequence classifies by its element. Array suffixes of the
    /// element are folded away.
    pub fn into_sequence(self, nullable: bool) -> Self {
        Self {
            array_depth: 0,
            nullable,
            sequence: true,
            ..self
        }
    }

    /// Marks the numeric base type as `unsigned`.
    pub fn with_unsigned(mut self, unsigned: bool) -> Self {
        self.unsigned = unsigned;
        self
    }

    /// Marks the floating-point base type as `unrestricted`.
    pub fn with_unrestricted(mut self, unrestricted: bool) -> Self {
        self.unrestricted = unrestricted;
        self
    }

    /// Applies a parsed suffix chain: `[]` occurrences add to the array
    /// depth and any `?` makes the reference nullable.
    pub fn with_suffix(mut self, array_depth: usize, nullable: bool) -> Self {
        self.array_depth += array_depth;
        self.nullable |= nullable;
        self
    }

    pub fn base_name(&self) -> Id {
        self.base_name
    }

    pub fn union_members(&self) -> &[TypeRef] {
        &self.union_members
    }

    pub fn array_depth(&self) -> usize {
        self.array_depth
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_sequence(&self) -> bool {
        self.sequence
    }

    pub fn is_unsigned(&self) -> bool {
        self.unsigned
    }

    pub fn is_unrestricted(&self) -> bool {
        self.unrestricted
    }

    /// Returns `true` for `(A or B ...)` references.
    pub fn is_union(&self) -> bool {
        !self.union_members.is_empty()
    }

    /// Returns `true` for the `void` return type.
    pub fn is_void(&self) -> bool {
        !self.is_union() && self.base_name == Self::VOID
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sequence {
            f.write_str("sequence<")?;
        }
        if self.unrestricted {
            f.write_str("unrestricted ")?;
        }
        if self.unsigned {
            f.write_str("unsigned ")?;
        }
        if self.is_union() {
            f.write_str("(")?;
            for (i, member) in self.union_members.iter().enumerate() {
                if i > 0 {
                    f.write_str(" or ")?;
                }
                write!(f, "{member}")?;
            }
            f.write_str(")")?;
        } else {
            write!(f, "{}", self.base_name)?;
        }
        if self.sequence {
            f.write_str(">")?;
        }
        if self.nullable {
            f.write_str("?")?;
        }
        for _ in 0..self.array_depth {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

/// Literal value of a constant or default.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
    Infinity,
    NegativeInfinity,
    NaN,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(value) => write!(f, "{value}"),
            Literal::Float(value) => write!(f, "{value}"),
            Literal::String(value) => write!(f, "\"{value}\""),
            Literal::Boolean(value) => write!(f, "{value}"),
            Literal::Null => f.write_str("null"),
            Literal::Infinity => f.write_str("Infinity"),
            Literal::NegativeInfinity => f.write_str("-Infinity"),
            Literal::NaN => f.write_str("NaN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_display() {
        let ty = TypeRef::named("DOMString");
        assert_eq!(ty.to_string(), "DOMString");
        assert!(!ty.is_union());
        assert!(!ty.is_sequence());
    }

    #[test]
    fn test_suffix_accumulates() {
        let ty = TypeRef::named("long")
            .with_suffix(1, false)
            .with_suffix(2, true)
            .with_suffix(0, false);

        assert_eq!(ty.array_depth(), 3);
        assert!(ty.is_nullable());
        assert_eq!(ty.to_string(), "long?[][][]");
    }

    #[test]
    fn test_union_display() {
        let ty = TypeRef::union(vec![TypeRef::named("A"), TypeRef::named("B")]);
        assert!(ty.is_union());
        assert!(ty.base_name().is_empty());
        assert_eq!(ty.to_string(), "(A or B)");
    }

    #[test]
    fn test_sequence_keeps_element_name() {
        let ty = TypeRef::named("long")
            .with_unsigned(true)
            .with_suffix(2, false)
            .into_sequence(true);

        assert!(ty.is_sequence());
        assert!(ty.is_nullable());
        assert!(ty.is_unsigned());
        assert_eq!(ty.array_depth(), 0);
        assert_eq!(ty.base_name(), "long");
        assert_eq!(ty.to_string(), "sequence<unsigned long>?");
    }

    #[test]
    fn test_void() {
        assert!(TypeRef::void().is_void());
        assert!(!TypeRef::named("long").is_void());
    }

    #[test]
    fn test_literal_display() {
        assert_eq!(Literal::Integer(-8).to_string(), "-8");
        assert_eq!(Literal::String("a".to_string()).to_string(), "\"a\"");
        assert_eq!(Literal::NegativeInfinity.to_string(), "-Infinity");
        assert_eq!(Literal::Null.to_string(), "null");
    }
}
