//! Emission context handed to the template renderer.
//!
//! The context is a plain serializable snapshot of the declarations in scope
//! and everything the resolver found out about them. It is only built from a
//! complete [`Resolution`].

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use oven_core::{
    ast::{Ast, Decl, Node, NodeId, NodeKind, Special},
    types::TypeRef,
};

use crate::{
    artifact::OutputKind,
    resolve::{Resolution, TypeClass},
};

/// Everything the renderer needs for one module.
#[derive(Debug, Clone, Serialize)]
pub struct EmissionContext {
    pub module: ModuleMeta,
    pub output: OutputKind,
    /// Files the renderer is expected to produce.
    pub artifacts: Vec<String>,
    /// Top-level declarations matching the module name.
    pub declarations: Vec<DeclarationContext>,
    pub callbacks: IndexMap<String, CallbackContext>,
    /// Native function name to backend command.
    pub command_table: IndexMap<String, String>,
    /// In resolution order; may repeat a name.
    pub exported_interfaces: Vec<String>,
    pub active_objects: Vec<String>,
    /// Implementing interface to host root.
    pub implemented_classes: IndexMap<String, String>,
    pub implemented_object: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleMeta {
    pub name: String,
    pub upper: String,
    pub lower: String,
    pub title: String,
    pub year: i32,
    #[serde(rename = "async")]
    pub is_async: bool,
}

impl ModuleMeta {
    pub fn new(name: &str, year: i32, is_async: bool) -> Self {
        Self {
            name: name.to_string(),
            upper: name.to_uppercase(),
            lower: name.to_lowercase(),
            title: title_case(name),
            year,
            is_async,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclarationContext {
    Module {
        name: String,
        #[serde(rename = "async")]
        is_async: bool,
        declarations: Vec<DeclarationContext>,
    },
    Interface(InterfaceContext),
    Callback {
        name: String,
        return_type: TypeContext,
        arguments: Vec<ArgumentContext>,
    },
    Dictionary {
        name: String,
        inherit: Option<String>,
        members: Vec<MemberContext>,
    },
    Exception {
        name: String,
        inherit: Option<String>,
        members: Vec<MemberContext>,
    },
    Enum {
        name: String,
        values: Vec<String>,
    },
    Typedef {
        name: String,
        aliased: TypeContext,
    },
    Implements {
        host: String,
        implemented: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct InterfaceContext {
    pub name: String,
    pub inherit: Option<String>,
    pub exported: Option<String>,
    pub implements: Option<String>,
    pub private: bool,
    pub callback: bool,
    pub function_only: bool,
    pub extended_attributes: Vec<ExtendedAttributeContext>,
    pub constructor: Option<ConstructorContext>,
    pub consts: Vec<MemberContext>,
    pub attributes: Vec<AttributeContext>,
    pub operations: Vec<OperationContext>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConstructorContext {
    pub arguments: Vec<ArgumentContext>,
    pub primitive_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttributeContext {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: TypeContext,
    pub readonly: bool,
    pub inherited: bool,
    pub exist_in: Option<String>,
    pub validation: Option<ValidationContext>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationContext {
    pub name: String,
    pub return_type: TypeContext,
    #[serde(rename = "static")]
    pub is_static: bool,
    pub specials: Vec<&'static str>,
    pub raises: Vec<String>,
    pub native_function: Option<String>,
    pub native_cmd: Option<String>,
    #[serde(rename = "async")]
    pub is_async: bool,
    pub argnames: Vec<String>,
    pub primitive_args: Vec<String>,
    pub arguments: Vec<ArgumentContext>,
    pub return_validation: Option<ValidationContext>,
    pub return_internal: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArgumentContext {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: TypeContext,
    pub optional: bool,
    pub variadic: bool,
    pub default: Option<String>,
    pub validation: Option<ValidationContext>,
    pub extended_attributes: Vec<ExtendedAttributeContext>,
}

/// `[Name]`, `[Name(args)]`, `[Name=Identity]` or `[Name=Identity(args)]`.
#[derive(Debug, Clone, Serialize)]
pub struct ExtendedAttributeContext {
    pub name: String,
    pub identity: Option<String>,
    /// `true` when written with parentheses, even if they are empty.
    pub has_arguments: bool,
    pub arguments: Vec<ArgumentContext>,
}

/// Dictionary members, exception fields and constants.
#[derive(Debug, Clone, Serialize)]
pub struct MemberContext {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: TypeContext,
    /// Default or constant value, as written.
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeContext {
    /// Full spelling, e.g. `sequence<long>?`.
    pub name: String,
    pub base: String,
    pub union: Vec<TypeContext>,
    pub array_depth: usize,
    pub nullable: bool,
    pub sequence: bool,
}

impl From<&TypeRef> for TypeContext {
    fn from(ty: &TypeRef) -> Self {
        Self {
            name: ty.to_string(),
            base: ty.base_name().to_string(),
            union: ty.union_members().iter().map(TypeContext::from).collect(),
            array_depth: ty.array_depth(),
            nullable: ty.is_nullable(),
            sequence: ty.is_sequence(),
        }
    }
}

/// Serializable form of a [`TypeClass`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationContext {
    /// Validator tag such as `STRING`, `ENUM` or `LISTENER`.
    pub kind: &'static str,
    /// Enum literals, listener operations or interface names.
    pub members: Vec<String>,
    pub flavor: Option<&'static str>,
    /// C++ type for plain values and enums.
    pub native: Option<&'static str>,
}

impl From<&TypeClass> for ValidationContext {
    fn from(class: &TypeClass) -> Self {
        let (members, flavor) = match class {
            TypeClass::Enum(literals) => (literals.iter().map(ToString::to_string).collect(), None),
            TypeClass::Listener { operations, flavor } => (
                operations.iter().map(ToString::to_string).collect(),
                flavor.map(|f| f.as_str()),
            ),
            TypeClass::PlatformObject(names) => {
                (names.iter().map(ToString::to_string).collect(), None)
            }
            TypeClass::Primitive(_) | TypeClass::Function | TypeClass::Dictionary => {
                (Vec::new(), None)
            }
        };
        Self {
            kind: class.tag(),
            members,
            flavor,
            native: class.native().map(|n| n.cpp_type()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallbackContext {
    pub function_only: bool,
    pub operations: Vec<String>,
    pub flavor: Option<&'static str>,
}

impl EmissionContext {
    /// Snapshot `resolution` of `ast` for the renderer.
    pub fn build(ast: &Ast, resolution: &Resolution, output: OutputKind, year: i32) -> Self {
        let module = resolution.module();
        let tables = resolution.tables();
        let builder = ContextBuilder { ast, resolution };

        let declarations: Vec<DeclarationContext> = resolution
            .module_roots()
            .iter()
            .filter_map(|root| builder.declaration(*root))
            .collect();
        debug!(declarations = declarations.len(); "Emission context built");

        Self {
            module: ModuleMeta::new(module, year, resolution.is_async()),
            output,
            artifacts: output.artifact_names(module),
            declarations,
            callbacks: tables
                .callbacks()
                .iter()
                .map(|(name, entry)| {
                    (
                        name.to_string(),
                        CallbackContext {
                            function_only: entry.function_only(),
                            operations: entry.operations().iter().map(ToString::to_string).collect(),
                            flavor: entry.flavor().map(|f| f.as_str()),
                        },
                    )
                })
                .collect(),
            command_table: resolution.command_table().clone(),
            exported_interfaces: resolution
                .exported_interfaces()
                .iter()
                .map(ToString::to_string)
                .collect(),
            active_objects: tables.active_objects().iter().map(ToString::to_string).collect(),
            implemented_classes: tables
                .implemented_classes()
                .iter()
                .map(|(class, host)| (class.to_string(), host.to_string()))
                .collect(),
            implemented_object: tables.implemented_object().map(|o| o.to_string()),
        }
    }
}

struct ContextBuilder<'a> {
    ast: &'a Ast,
    resolution: &'a Resolution,
}

impl ContextBuilder<'_> {
    fn declaration(&self, id: NodeId) -> Option<DeclarationContext> {
        let node = self.ast.node(id);
        let name = node.name().to_string();

        let declaration = match node.decl() {
            Decl::Module => DeclarationContext::Module {
                name,
                is_async: self.resolution.annotations().is_async_root(id),
                declarations: node
                    .children()
                    .filter_map(|child| self.declaration(child))
                    .collect(),
            },
            Decl::Interface { .. } => DeclarationContext::Interface(self.interface(id)),
            Decl::Callback { return_type } => DeclarationContext::Callback {
                name,
                return_type: return_type.into(),
                arguments: self.arguments(id),
            },
            Decl::Dictionary { inherit } => DeclarationContext::Dictionary {
                name,
                inherit: inherit.map(|i| i.to_string()),
                members: self.members(id, NodeKind::DictionaryMember),
            },
            Decl::Exception { inherit } => DeclarationContext::Exception {
                name,
                inherit: inherit.map(|i| i.to_string()),
                members: self.members(id, NodeKind::Field),
            },
            Decl::Enum => DeclarationContext::Enum {
                name,
                values: self.ast.texts(id).map(|t| t.to_string()).collect(),
            },
            Decl::Typedef { aliased } => DeclarationContext::Typedef {
                name,
                aliased: aliased.into(),
            },
            Decl::Implements { implemented } => DeclarationContext::Implements {
                host: name,
                implemented: implemented.to_string(),
            },
            _ => return None,
        };
        Some(declaration)
    }

    fn interface(&self, id: NodeId) -> InterfaceContext {
        let node = self.ast.node(id);
        let tables = self.resolution.tables();
        let annotation = self.resolution.annotations().interface(id);
        let callback = tables
            .callback(node.name())
            .filter(|entry| entry.node() == id);

        let inherit = match node.decl() {
            Decl::Interface { inherit, .. } => inherit.map(|i| i.to_string()),
            _ => None,
        };

        InterfaceContext {
            name: node.name().to_string(),
            inherit,
            exported: annotation.and_then(|a| a.exported).map(|e| e.to_string()),
            implements: annotation.and_then(|a| a.implements).map(|h| h.to_string()),
            private: annotation.is_some_and(|a| a.private),
            callback: callback.is_some(),
            function_only: callback.is_some_and(|c| c.function_only()),
            extended_attributes: self.extended_attributes(id),
            constructor: annotation
                .and_then(|a| a.constructor.map(|ctor| (a, ctor)))
                .map(|(a, ctor)| ConstructorContext {
                    arguments: self.arguments(ctor),
                    primitive_args: a
                        .constructor_primitive_args
                        .iter()
                        .map(ToString::to_string)
                        .collect(),
                }),
            consts: self.members(id, NodeKind::Const),
            attributes: self
                .ast
                .children_of_kind(id, NodeKind::Attribute)
                .iter()
                .map(|attr| self.attribute(*attr))
                .collect(),
            operations: self
                .ast
                .children_of_kind(id, NodeKind::Operation)
                .iter()
                .map(|op| self.operation(*op))
                .collect(),
        }
    }

    fn attribute(&self, id: NodeId) -> AttributeContext {
        let node = self.ast.node(id);
        let annotation = self.resolution.annotations().attribute(id);
        let (readonly, inherited) = match node.decl() {
            Decl::Attribute {
                readonly,
                inherited,
                ..
            } => (*readonly, *inherited),
            _ => (false, false),
        };

        AttributeContext {
            name: node.name().to_string(),
            value_type: type_context(node),
            readonly,
            inherited,
            exist_in: annotation.and_then(|a| a.exist_in.clone()),
            validation: annotation
                .and_then(|a| a.class.as_ref())
                .map(ValidationContext::from),
        }
    }

    fn operation(&self, id: NodeId) -> OperationContext {
        let node = self.ast.node(id);
        let annotation = self.resolution.annotations().operation(id);
        let (is_static, specials) = match node.decl() {
            Decl::Operation {
                is_static,
                specials,
                ..
            } => (*is_static, specials.iter().map(|s| special_name(*s)).collect()),
            _ => (false, Vec::new()),
        };
        let names = |ids: Option<&Vec<oven_core::identifier::Id>>| -> Vec<String> {
            ids.map(|ids| ids.iter().map(ToString::to_string).collect())
                .unwrap_or_default()
        };

        OperationContext {
            name: node.name().to_string(),
            return_type: type_context(node),
            is_static,
            specials,
            raises: self.ast.texts(id).map(|t| t.to_string()).collect(),
            native_function: annotation.and_then(|a| a.native_function.clone()),
            native_cmd: annotation.and_then(|a| a.native_cmd.clone()),
            is_async: annotation.is_some_and(|a| a.is_async),
            argnames: names(annotation.map(|a| &a.argnames)),
            primitive_args: names(annotation.map(|a| &a.primitive_args)),
            arguments: self.arguments(id),
            return_validation: annotation
                .and_then(|a| a.return_class.as_ref())
                .map(ValidationContext::from),
            return_internal: annotation
                .and_then(|a| a.return_internal)
                .map(|i| i.to_string()),
        }
    }

    fn extended_attributes(&self, id: NodeId) -> Vec<ExtendedAttributeContext> {
        self.ast
            .children_of_kind(id, NodeKind::ExtendedAttribute)
            .iter()
            .map(|attr| {
                let node = self.ast.node(*attr);
                let (identity, has_arguments) = match node.decl() {
                    Decl::ExtendedAttribute {
                        identity,
                        has_arguments,
                    } => (identity.map(|i| i.to_string()), *has_arguments),
                    _ => (None, false),
                };
                ExtendedAttributeContext {
                    name: node.name().to_string(),
                    identity,
                    has_arguments,
                    arguments: self.arguments(*attr),
                }
            })
            .collect()
    }

    fn arguments(&self, id: NodeId) -> Vec<ArgumentContext> {
        self.ast
            .arguments(id)
            .iter()
            .map(|arg| {
                let node = self.ast.node(*arg);
                let (optional, variadic, default) = match node.decl() {
                    Decl::Argument {
                        optional,
                        variadic,
                        default,
                        ..
                    } => (*optional, *variadic, default.as_ref().map(|d| d.to_string())),
                    _ => (false, false, None),
                };
                ArgumentContext {
                    name: node.name().to_string(),
                    value_type: type_context(node),
                    optional,
                    variadic,
                    default,
                    validation: self
                        .resolution
                        .annotations()
                        .argument(*arg)
                        .map(ValidationContext::from),
                    extended_attributes: self.extended_attributes(*arg),
                }
            })
            .collect()
    }

    fn members(&self, id: NodeId, kind: NodeKind) -> Vec<MemberContext> {
        self.ast
            .children_of_kind(id, kind)
            .iter()
            .map(|member| {
                let node = self.ast.node(*member);
                let value = match node.decl() {
                    Decl::DictionaryMember { default, .. } => {
                        default.as_ref().map(|d| d.to_string())
                    }
                    Decl::Const { value, .. } => Some(value.to_string()),
                    _ => None,
                };
                MemberContext {
                    name: node.name().to_string(),
                    value_type: type_context(node),
                    value,
                }
            })
            .collect()
    }
}

fn type_context(node: &Node) -> TypeContext {
    node.decl()
        .value_type()
        .map(TypeContext::from)
        .unwrap_or_else(|| TypeContext::from(&TypeRef::void()))
}

fn special_name(special: Special) -> &'static str {
    match special {
        Special::Getter => "getter",
        Special::Setter => "setter",
        Special::Creator => "creator",
        Special::Deleter => "deleter",
        Special::LegacyCaller => "legacycaller",
        Special::Stringifier => "stringifier",
    }
}

/// Uppercases the first letter of every run of letters and lowercases the
/// rest, so `tv_audio` becomes `Tv_Audio`.
pub fn title_case(name: &str) -> String {
    let mut title = String::with_capacity(name.len());
    let mut in_word = false;
    for ch in name.chars() {
        if ch.is_alphabetic() {
            if in_word {
                title.extend(ch.to_lowercase());
            } else {
                title.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            title.push(ch);
            in_word = false;
        }
    }
    title
}
