//! Per-node findings of the resolver.
//!
//! The AST stays read-only after parsing, so everything the resolver learns
//! about a node is kept here, keyed by [`NodeId`].

use indexmap::{IndexMap, IndexSet};

use oven_core::{ast::NodeId, identifier::Id};

use super::classify::TypeClass;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterfaceAnnotation {
    /// Name the interface is exported under: a host root or its own name.
    pub exported: Option<Id>,
    /// Host root this interface is attached to through `implements`.
    pub implements: Option<Id>,
    /// Members are reached through an exported parent.
    pub private: bool,
    /// The `[Constructor]` extended attribute node.
    pub constructor: Option<NodeId>,
    /// Constructor arguments with a native representation.
    pub constructor_primitive_args: Vec<Id>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeAnnotation {
    /// `ctor`, or `argument.member` when the value arrives inside a
    /// constructor argument.
    pub exist_in: Option<String>,
    pub class: Option<TypeClass>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationAnnotation {
    pub native_function: Option<String>,
    pub native_cmd: Option<String>,
    pub is_async: bool,
    pub argnames: Vec<Id>,
    pub primitive_args: Vec<Id>,
    /// First exported interface returned by the operation.
    pub return_internal: Option<Id>,
    /// `None` for `void`.
    pub return_class: Option<TypeClass>,
}

#[derive(Debug, Clone, Default)]
pub struct Annotations {
    interfaces: IndexMap<NodeId, InterfaceAnnotation>,
    attributes: IndexMap<NodeId, AttributeAnnotation>,
    operations: IndexMap<NodeId, OperationAnnotation>,
    arguments: IndexMap<NodeId, TypeClass>,
    async_roots: IndexSet<NodeId>,
}

impl Annotations {
    pub(crate) fn interface_mut(&mut self, id: NodeId) -> &mut InterfaceAnnotation {
        self.interfaces.entry(id).or_default()
    }

    pub(crate) fn attribute_mut(&mut self, id: NodeId) -> &mut AttributeAnnotation {
        self.attributes.entry(id).or_default()
    }

    pub(crate) fn operation_mut(&mut self, id: NodeId) -> &mut OperationAnnotation {
        self.operations.entry(id).or_default()
    }

    pub(crate) fn set_argument(&mut self, id: NodeId, class: TypeClass) {
        self.arguments.insert(id, class);
    }

    pub(crate) fn mark_async_root(&mut self, id: NodeId) {
        self.async_roots.insert(id);
    }

    pub fn interface(&self, id: NodeId) -> Option<&InterfaceAnnotation> {
        self.interfaces.get(&id)
    }

    pub fn attribute(&self, id: NodeId) -> Option<&AttributeAnnotation> {
        self.attributes.get(&id)
    }

    pub fn operation(&self, id: NodeId) -> Option<&OperationAnnotation> {
        self.operations.get(&id)
    }

    pub fn argument(&self, id: NodeId) -> Option<&TypeClass> {
        self.arguments.get(&id)
    }

    /// Returns `true` if the top-level declaration `id` has an asynchronous
    /// operation.
    pub fn is_async_root(&self, id: NodeId) -> bool {
        self.async_roots.contains(&id)
    }

    pub(crate) fn has_async_root(&self) -> bool {
        !self.async_roots.is_empty()
    }
}
