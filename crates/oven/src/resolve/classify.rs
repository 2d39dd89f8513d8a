//! Type classification.
//!
//! A [`TypeClass`] is the coarse marshaling kind code generation needs for a
//! type: a primitive value, an enum, a dictionary, a callback or a platform
//! object. Classification consults the symbol tables in a fixed precedence
//! order: primitive, enum, typedef, callback, dictionary, interface.

use std::fmt;

use log::trace;

use oven_core::{identifier::Id, types::TypeRef};

use super::tables::SymbolTables;

/// Primitive types known to the script-side validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    /// `object`, validated as a dictionary.
    Object,
    Boolean,
    Byte,
    Octet,
    Long,
    LongLong,
    UnsignedLong,
    UnsignedLongLong,
    Double,
    Any,
    Date,
}

impl Primitive {
    /// Looks up the primitive a (non-union) type reference names.
    ///
    /// Sequence and array shapes are ignored; the element decides.
    pub fn from_type(ty: &TypeRef) -> Option<Self> {
        if ty.is_union() {
            return None;
        }
        let unsigned = ty.is_unsigned();
        ty.base_name().with_str(|name| {
            let primitive = match name {
                "DOMString" => Primitive::String,
                "object" => Primitive::Object,
                "boolean" => Primitive::Boolean,
                "byte" => Primitive::Byte,
                "octet" => Primitive::Octet,
                "short" | "long" if unsigned => Primitive::UnsignedLong,
                "short" | "long" => Primitive::Long,
                "long long" if unsigned => Primitive::UnsignedLongLong,
                "long long" => Primitive::LongLong,
                "float" | "double" => Primitive::Double,
                "any" => Primitive::Any,
                "Date" => Primitive::Date,
                _ => return None,
            };
            Some(primitive)
        })
    }

    /// Validator tag used by the script stub.
    pub fn tag(self) -> &'static str {
        match self {
            Primitive::String => "STRING",
            Primitive::Object => "DICTIONARY",
            Primitive::Boolean => "BOOLEAN",
            Primitive::Byte => "BYTE",
            Primitive::Octet => "OCTET",
            Primitive::Long => "LONG",
            Primitive::LongLong => "LONG_LONG",
            Primitive::UnsignedLong => "UNSIGNED_LONG",
            Primitive::UnsignedLongLong => "UNSIGNED_LONG_LONG",
            Primitive::Double => "DOUBLE",
            Primitive::Any => "ANY",
            Primitive::Date => "DATE",
        }
    }

    /// Native representation, if the primitive has one.
    pub fn native(self) -> Option<NativeRepr> {
        match self {
            Primitive::String => Some(NativeRepr::String),
            Primitive::Object => Some(NativeRepr::Object),
            Primitive::Boolean => Some(NativeRepr::Bool),
            Primitive::Byte
            | Primitive::Octet
            | Primitive::Long
            | Primitive::LongLong
            | Primitive::UnsignedLong
            | Primitive::UnsignedLongLong
            | Primitive::Double => Some(NativeRepr::Double),
            Primitive::Any | Primitive::Date => None,
        }
    }
}

/// Native (C++) value representation of a plain value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeRepr {
    String,
    Object,
    Bool,
    Double,
}

impl NativeRepr {
    pub fn cpp_type(self) -> &'static str {
        match self {
            NativeRepr::String => "std::string",
            NativeRepr::Object => "picojson::object",
            NativeRepr::Bool => "bool",
            NativeRepr::Double => "double",
        }
    }
}

/// Which conventional handler a listener callback declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackFlavor {
    /// Declares `onsuccess`.
    Success,
    /// Declares `onerror` but not `onsuccess`.
    Error,
}

impl CallbackFlavor {
    /// Flavor of a callback declaring `operations`, if any.
    pub fn from_operations(operations: &[Id]) -> Option<Self> {
        if operations.iter().any(|op| *op == "onsuccess") {
            Some(CallbackFlavor::Success)
        } else if operations.iter().any(|op| *op == "onerror") {
            Some(CallbackFlavor::Error)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CallbackFlavor::Success => "success",
            CallbackFlavor::Error => "error",
        }
    }
}

/// Marshaling kind of a type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeClass {
    Primitive(Primitive),
    /// Enum, or union of enums, with its literal members in order.
    Enum(Vec<Id>),
    /// A callback marked function-only.
    Function,
    Listener {
        operations: Vec<Id>,
        flavor: Option<CallbackFlavor>,
    },
    Dictionary,
    /// One or more interfaces.
    PlatformObject(Vec<Id>),
}

impl TypeClass {
    pub fn tag(&self) -> &'static str {
        match self {
            TypeClass::Primitive(primitive) => primitive.tag(),
            TypeClass::Enum(_) => "ENUM",
            TypeClass::Function => "FUNCTION",
            TypeClass::Listener { .. } => "LISTENER",
            TypeClass::Dictionary => "DICTIONARY",
            TypeClass::PlatformObject(_) => "PLATFORM_OBJECT",
        }
    }

    /// Callback kinds make the operation taking them asynchronous.
    pub fn is_async(&self) -> bool {
        matches!(self, TypeClass::Function | TypeClass::Listener { .. })
    }

    /// Plain values are marshaled directly rather than by reference.
    pub fn is_plain_value(&self) -> bool {
        matches!(self, TypeClass::Primitive(_) | TypeClass::Dictionary)
    }

    pub fn native(&self) -> Option<NativeRepr> {
        match self {
            TypeClass::Primitive(primitive) => primitive.native(),
            TypeClass::Enum(_) => Some(NativeRepr::String),
            _ => None,
        }
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Why a type could not be classified.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyError {
    /// Names no primitive or declared type.
    Unresolved(String),
    /// A union mixing kinds other than all-enum or all-interface.
    UnsupportedUnion(String),
    /// A typedef whose expansion reaches itself.
    TypedefCycle(Id),
}

/// Classifies type references against a set of symbol tables.
pub struct Classifier<'a> {
    tables: &'a SymbolTables,
}

impl<'a> Classifier<'a> {
    pub fn new(tables: &'a SymbolTables) -> Self {
        Self { tables }
    }

    pub fn classify(&self, ty: &TypeRef) -> Result<TypeClass, ClassifyError> {
        let class = self.classify_inner(ty, &mut Vec::new())?;
        trace!(ty:% = ty, class:% = class; "Classified type");
        Ok(class)
    }

    fn classify_inner(
        &self,
        ty: &TypeRef,
        expanding: &mut Vec<Id>,
    ) -> Result<TypeClass, ClassifyError> {
        if ty.is_union() {
            return self.classify_union(ty, expanding);
        }

        let name = ty.base_name();
        if let Some(primitive) = Primitive::from_type(ty) {
            return Ok(TypeClass::Primitive(primitive));
        }
        if let Some(literals) = self.tables.enum_literals(name) {
            return Ok(TypeClass::Enum(literals.to_vec()));
        }
        if let Some(aliased) = self.tables.typedef(name) {
            if expanding.contains(&name) {
                return Err(ClassifyError::TypedefCycle(name));
            }
            expanding.push(name);
            let class = self.classify_inner(aliased, expanding);
            expanding.pop();
            return class;
        }
        if let Some(callback) = self.tables.callback(name) {
            return Ok(if callback.function_only() {
                TypeClass::Function
            } else {
                TypeClass::Listener {
                    operations: callback.operations().to_vec(),
                    flavor: callback.flavor(),
                }
            });
        }
        if self.tables.dictionary(name).is_some() {
            return Ok(TypeClass::Dictionary);
        }
        if self.tables.interface(name).is_some() {
            return Ok(TypeClass::PlatformObject(vec![name]));
        }

        Err(ClassifyError::Unresolved(name.to_string()))
    }

    /// All-enum unions merge their literals, all-interface unions list the
    /// interfaces, and a single member stands for itself.
    fn classify_union(
        &self,
        ty: &TypeRef,
        expanding: &mut Vec<Id>,
    ) -> Result<TypeClass, ClassifyError> {
        let members = ty.union_members();
        if let [single] = members {
            return self.classify_inner(single, expanding);
        }

        let plain = |member: &TypeRef| !member.is_union();

        if members
            .iter()
            .all(|m| plain(m) && self.tables.enum_literals(m.base_name()).is_some())
        {
            let literals = members
                .iter()
                .filter_map(|m| self.tables.enum_literals(m.base_name()))
                .flatten()
                .copied()
                .collect();
            return Ok(TypeClass::Enum(literals));
        }

        if members
            .iter()
            .all(|m| plain(m) && self.tables.interface(m.base_name()).is_some())
        {
            let names = members.iter().map(TypeRef::base_name).collect();
            return Ok(TypeClass::PlatformObject(names));
        }

        Err(ClassifyError::UnsupportedUnion(ty.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use oven_core::ast::{Ast, Decl};

    use super::*;
    use crate::resolve::tables::CallbackEntry;

    fn ids(names: &[&str]) -> Vec<Id> {
        names.iter().map(|n| Id::new(n)).collect()
    }

    fn tables() -> SymbolTables {
        let mut ast = Ast::new();
        let node = ast.add_root(Id::new("placeholder"), Decl::Module);

        let mut tables = SymbolTables::default();
        tables.add_enum(Id::new("Red"), ids(&["r1", "r2"]));
        tables.add_enum(Id::new("Green"), ids(&["g1"]));
        tables.add_typedef(
            Id::new("Color"),
            TypeRef::union(vec![TypeRef::named("Red"), TypeRef::named("Green")]),
        );
        tables.add_typedef(Id::new("Level"), TypeRef::named("long"));
        tables.add_typedef(Id::new("Loop"), TypeRef::named("Loop"));
        tables.add_interface(Id::new("Foo"), node);
        tables.add_interface(Id::new("Bar"), node);
        tables.add_dictionary(Id::new("Options"), node);
        tables.add_callback(
            Id::new("ErrorListener"),
            CallbackEntry::new(node, false, ids(&["onerror"])),
        );
        tables.add_callback(
            Id::new("Done"),
            CallbackEntry::new(node, true, Vec::new()),
        );
        tables
    }

    #[test]
    fn test_primitive_tags() {
        let cases = [
            (TypeRef::named("DOMString"), "STRING"),
            (TypeRef::named("object"), "DICTIONARY"),
            (TypeRef::named("boolean"), "BOOLEAN"),
            (TypeRef::named("short"), "LONG"),
            (TypeRef::named("long").with_unsigned(true), "UNSIGNED_LONG"),
            (TypeRef::named("long long"), "LONG_LONG"),
            (
                TypeRef::named("long long").with_unsigned(true),
                "UNSIGNED_LONG_LONG",
            ),
            (TypeRef::named("double").with_unrestricted(true), "DOUBLE"),
            (TypeRef::named("any"), "ANY"),
        ];
        for (ty, tag) in cases {
            assert_eq!(Primitive::from_type(&ty).map(Primitive::tag), Some(tag), "{ty}");
        }
    }

    #[test]
    fn test_native_repr() {
        assert_eq!(
            Primitive::String.native().map(NativeRepr::cpp_type),
            Some("std::string")
        );
        assert_eq!(Primitive::Octet.native(), Some(NativeRepr::Double));
        assert_eq!(Primitive::Date.native(), None);
        assert_eq!(
            TypeClass::Enum(Vec::new()).native(),
            Some(NativeRepr::String)
        );
    }

    #[test]
    fn test_precedence() {
        let tables = tables();
        let classifier = Classifier::new(&tables);

        assert_eq!(
            classifier.classify(&TypeRef::named("Red")),
            Ok(TypeClass::Enum(ids(&["r1", "r2"])))
        );
        assert_eq!(
            classifier.classify(&TypeRef::named("Level")),
            Ok(TypeClass::Primitive(Primitive::Long))
        );
        assert_eq!(
            classifier.classify(&TypeRef::named("Options")),
            Ok(TypeClass::Dictionary)
        );
        assert_eq!(
            classifier.classify(&TypeRef::named("Foo").with_suffix(1, true)),
            Ok(TypeClass::PlatformObject(ids(&["Foo"])))
        );
        assert_eq!(
            classifier.classify(&TypeRef::named("Done")),
            Ok(TypeClass::Function)
        );
    }

    #[test]
    fn test_error_listener() {
        let tables = tables();
        let class = Classifier::new(&tables)
            .classify(&TypeRef::named("ErrorListener"))
            .unwrap();

        assert_eq!(
            class,
            TypeClass::Listener {
                operations: ids(&["onerror"]),
                flavor: Some(CallbackFlavor::Error),
            }
        );
        assert!(class.is_async());
        assert!(!class.is_plain_value());
    }

    #[test]
    fn test_enum_union_typedef_concatenates() {
        let tables = tables();
        assert_eq!(
            Classifier::new(&tables).classify(&TypeRef::named("Color")),
            Ok(TypeClass::Enum(ids(&["r1", "r2", "g1"])))
        );
    }

    #[test]
    fn test_interface_union() {
        let tables = tables();
        let ty = TypeRef::union(vec![TypeRef::named("Foo"), TypeRef::named("Bar")]);
        assert_eq!(
            Classifier::new(&tables).classify(&ty),
            Ok(TypeClass::PlatformObject(ids(&["Foo", "Bar"])))
        );
    }

    #[test]
    fn test_single_member_union() {
        let tables = tables();
        let ty = TypeRef::union(vec![TypeRef::named("Green")]);
        assert_eq!(
            Classifier::new(&tables).classify(&ty),
            Ok(TypeClass::Enum(ids(&["g1"])))
        );
    }

    #[test]
    fn test_mixed_union_rejected() {
        let tables = tables();
        let ty = TypeRef::union(vec![TypeRef::named("Red"), TypeRef::named("Foo")]);
        assert_eq!(
            Classifier::new(&tables).classify(&ty),
            Err(ClassifyError::UnsupportedUnion("(Red or Foo)".to_string()))
        );
    }

    #[test]
    fn test_unresolved_and_cycle() {
        let tables = tables();
        let classifier = Classifier::new(&tables);

        assert_eq!(
            classifier.classify(&TypeRef::named("ApplicationId")),
            Err(ClassifyError::Unresolved("ApplicationId".to_string()))
        );
        assert_eq!(
            classifier.classify(&TypeRef::named("Mystery").with_suffix(1, true)),
            Err(ClassifyError::Unresolved("Mystery".to_string()))
        );
        assert_eq!(
            classifier.classify(&TypeRef::named("Loop")),
            Err(ClassifyError::TypedefCycle(Id::new("Loop")))
        );
    }
}
