//! Lowering of the owned parse tree into the [`Ast`] arena.
//!
//! Extended attributes, arguments, enum literals and raised exception names
//! all become ordinary children of the node they belong to.

use log::{debug, trace};

use oven_core::{
    ast::{Ast, Decl, NodeId},
    identifier::Id,
};

use crate::parser_types::{
    Argument, Definition, DefinitionKind, ExtendedAttribute, Member, MemberKind,
};

#[derive(Default)]
pub struct Builder {
    ast: Ast,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(mut self, definitions: &[Definition]) -> Ast {
        debug!(definitions = definitions.len(); "Building AST");
        for definition in definitions {
            self.add_definition(None, definition);
        }
        debug!(nodes = self.ast.len(); "AST built");
        self.ast
    }

    fn add(&mut self, parent: Option<NodeId>, name: Id, decl: Decl) -> NodeId {
        match parent {
            Some(parent) => self.ast.add_child(parent, name, decl),
            None => self.ast.add_root(name, decl),
        }
    }

    fn add_definition(&mut self, parent: Option<NodeId>, definition: &Definition) {
        trace!(name:% = definition.name; "Adding definition");
        let decl = match &definition.kind {
            DefinitionKind::Module { .. } => Decl::Module,
            DefinitionKind::Interface {
                inherit, callback, ..
            } => Decl::Interface {
                inherit: *inherit,
                callback: *callback,
            },
            DefinitionKind::Callback { return_type, .. } => Decl::Callback {
                return_type: return_type.clone(),
            },
            DefinitionKind::Partial { target, .. } => Decl::Partial { target: *target },
            DefinitionKind::Dictionary { inherit, .. } => Decl::Dictionary { inherit: *inherit },
            DefinitionKind::Exception { inherit, .. } => Decl::Exception { inherit: *inherit },
            DefinitionKind::Enum { .. } => Decl::Enum,
            DefinitionKind::Typedef { aliased } => Decl::Typedef {
                aliased: aliased.clone(),
            },
            DefinitionKind::Implements { implemented } => Decl::Implements {
                implemented: *implemented,
            },
        };

        let id = self.add(parent, definition.name, decl);
        self.ast.set_span(id, definition.span);
        self.add_extended_attributes(id, &definition.attributes);

        match &definition.kind {
            DefinitionKind::Module { definitions } => {
                for nested in definitions {
                    self.add_definition(Some(id), nested);
                }
            }
            DefinitionKind::Interface { members, .. }
            | DefinitionKind::Partial { members, .. }
            | DefinitionKind::Dictionary { members, .. }
            | DefinitionKind::Exception { members, .. } => {
                for member in members {
                    self.add_member(id, member);
                }
            }
            DefinitionKind::Callback { arguments, .. } => self.add_arguments(id, arguments),
            DefinitionKind::Enum { values } => {
                for value in values {
                    self.ast.add_child(id, *value, Decl::Text);
                }
            }
            DefinitionKind::Typedef { .. } | DefinitionKind::Implements { .. } => {}
        }
    }

    fn add_member(&mut self, parent: NodeId, member: &Member) {
        let (decl, arguments, raises) = match &member.kind {
            MemberKind::Const { value_type, value } => (
                Decl::Const {
                    value_type: value_type.clone(),
                    value: value.clone(),
                },
                None,
                None,
            ),
            MemberKind::Attribute {
                value_type,
                inherited,
                readonly,
            } => (
                Decl::Attribute {
                    value_type: value_type.clone(),
                    inherited: *inherited,
                    readonly: *readonly,
                },
                None,
                None,
            ),
            MemberKind::Operation {
                return_type,
                is_static,
                specials,
                arguments,
                raises,
            } => (
                Decl::Operation {
                    return_type: return_type.clone(),
                    is_static: *is_static,
                    specials: specials.clone(),
                },
                Some(arguments),
                Some(raises),
            ),
            MemberKind::DictionaryMember {
                value_type,
                default,
            } => (
                Decl::DictionaryMember {
                    value_type: value_type.clone(),
                    default: default.clone(),
                },
                None,
                None,
            ),
            MemberKind::Field { value_type } => (
                Decl::Field {
                    value_type: value_type.clone(),
                },
                None,
                None,
            ),
        };

        let id = self.ast.add_child(parent, member.name, decl);
        self.ast.set_span(id, member.span);
        self.add_extended_attributes(id, &member.attributes);
        if let Some(arguments) = arguments {
            self.add_arguments(id, arguments);
        }
        for raised in raises.into_iter().flatten() {
            self.ast.add_child(id, *raised, Decl::Text);
        }
    }

    fn add_arguments(&mut self, parent: NodeId, arguments: &[Argument]) {
        for argument in arguments {
            let id = self.ast.add_child(
                parent,
                argument.name,
                Decl::Argument {
                    value_type: argument.value_type.clone(),
                    default: argument.default.clone(),
                    optional: argument.optional,
                    variadic: argument.variadic,
                },
            );
            self.ast.set_span(id, argument.span);
            self.add_extended_attributes(id, &argument.attributes);
        }
    }

    fn add_extended_attributes(&mut self, parent: NodeId, attributes: &[ExtendedAttribute]) {
        for attribute in attributes {
            let id = self.ast.add_child(
                parent,
                attribute.name,
                Decl::ExtendedAttribute {
                    identity: attribute.identity,
                    has_arguments: attribute.arguments.is_some(),
                },
            );
            if let Some(arguments) = &attribute.arguments {
                self.add_arguments(id, arguments);
            }
        }
    }
}
