//! Arena-backed declaration tree.
//!
//! Every node is owned by the [`Ast`] arena and addressed by a [`NodeId`].
//! Children keep their source order, and are also indexed by [`NodeKind`]
//! for lookups of one kind. A node's parent is a plain id, so upward
//! navigation never creates shared ownership.
//!
//! The tree is built once by the parser and is read-only afterwards; later
//! passes record their findings in side tables keyed by [`NodeId`].

use std::fmt;

use indexmap::IndexMap;

use crate::{
    identifier::Id,
    span::Span,
    types::{Literal, TypeRef},
};

/// Index of a node inside an [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discriminant of a [`Decl`], used to group children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Module,
    Interface,
    Callback,
    Partial,
    Dictionary,
    DictionaryMember,
    Exception,
    Field,
    Enum,
    Typedef,
    Implements,
    Attribute,
    Operation,
    Argument,
    Const,
    ExtendedAttribute,
    Text,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Module => "module",
            NodeKind::Interface => "interface",
            NodeKind::Callback => "callback",
            NodeKind::Partial => "partial",
            NodeKind::Dictionary => "dictionary",
            NodeKind::DictionaryMember => "dictionary member",
            NodeKind::Exception => "exception",
            NodeKind::Field => "field",
            NodeKind::Enum => "enum",
            NodeKind::Typedef => "typedef",
            NodeKind::Implements => "implements",
            NodeKind::Attribute => "attribute",
            NodeKind::Operation => "operation",
            NodeKind::Argument => "argument",
            NodeKind::Const => "const",
            NodeKind::ExtendedAttribute => "extended attribute",
            NodeKind::Text => "text",
        };
        f.write_str(name)
    }
}

/// Special operation qualifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Special {
    Getter,
    Setter,
    Creator,
    Deleter,
    LegacyCaller,
    Stringifier,
}

/// What a `partial` declaration extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialTarget {
    Interface,
    Dictionary,
}

/// Kind-specific payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Module,
    Interface {
        inherit: Option<Id>,
        /// Set by the `callback interface` form.
        callback: bool,
    },
    /// A callback function; its arguments are [`NodeKind::Argument`] children.
    Callback {
        return_type: TypeRef,
    },
    Partial {
        target: PartialTarget,
    },
    Dictionary {
        inherit: Option<Id>,
    },
    DictionaryMember {
        value_type: TypeRef,
        default: Option<Literal>,
    },
    Exception {
        inherit: Option<Id>,
    },
    Field {
        value_type: TypeRef,
    },
    /// Literal members are [`NodeKind::Text`] children.
    Enum,
    Typedef {
        aliased: TypeRef,
    },
    /// The node name is the subject, `implemented` the interface it gains.
    Implements {
        implemented: Id,
    },
    Attribute {
        value_type: TypeRef,
        inherited: bool,
        readonly: bool,
    },
    /// Raised exception names are [`NodeKind::Text`] children.
    Operation {
        return_type: TypeRef,
        is_static: bool,
        specials: Vec<Special>,
    },
    Argument {
        value_type: TypeRef,
        default: Option<Literal>,
        optional: bool,
        variadic: bool,
    },
    Const {
        value_type: TypeRef,
        value: Literal,
    },
    /// `A`, `A(args)`, `A=B` or `A=B(args)`; arguments are children.
    ExtendedAttribute {
        identity: Option<Id>,
        has_arguments: bool,
    },
    Text,
}

impl Decl {
    pub fn kind(&self) -> NodeKind {
        match self {
            Decl::Module => NodeKind::Module,
            Decl::Interface { .. } => NodeKind::Interface,
            Decl::Callback { .. } => NodeKind::Callback,
            Decl::Partial { .. } => NodeKind::Partial,
            Decl::Dictionary { .. } => NodeKind::Dictionary,
            Decl::DictionaryMember { .. } => NodeKind::DictionaryMember,
            Decl::Exception { .. } => NodeKind::Exception,
            Decl::Field { .. } => NodeKind::Field,
            Decl::Enum => NodeKind::Enum,
            Decl::Typedef { .. } => NodeKind::Typedef,
            Decl::Implements { .. } => NodeKind::Implements,
            Decl::Attribute { .. } => NodeKind::Attribute,
            Decl::Operation { .. } => NodeKind::Operation,
            Decl::Argument { .. } => NodeKind::Argument,
            Decl::Const { .. } => NodeKind::Const,
            Decl::ExtendedAttribute { .. } => NodeKind::ExtendedAttribute,
            Decl::Text => NodeKind::Text,
        }
    }

    /// The type a member or argument carries, if any.
    ///
    /// Operations and callbacks report their return type.
    pub fn value_type(&self) -> Option<&TypeRef> {
        match self {
            Decl::DictionaryMember { value_type, .. }
            | Decl::Field { value_type }
            | Decl::Attribute { value_type, .. }
            | Decl::Argument { value_type, .. }
            | Decl::Const { value_type, .. } => Some(value_type),
            Decl::Operation { return_type, .. } | Decl::Callback { return_type } => {
                Some(return_type)
            }
            Decl::Typedef { aliased } => Some(aliased),
            _ => None,
        }
    }
}

/// A single declaration in the tree.
#[derive(Debug, Clone)]
pub struct Node {
    name: Id,
    decl: Decl,
    parent: Option<NodeId>,
    span: Span,
    children: Vec<NodeId>,
    by_kind: IndexMap<NodeKind, Vec<NodeId>>,
}

impl Node {
    pub fn name(&self) -> Id {
        self.name
    }

    pub fn decl(&self) -> &Decl {
        &self.decl
    }

    pub fn kind(&self) -> NodeKind {
        self.decl.kind()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Source text of the declaration; empty for nodes built by hand.
    pub fn span(&self) -> Span {
        self.span
    }

    /// All children in insertion order, whatever their kind.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().copied()
    }
}

/// Owner of every node of a parsed input.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a top-level declaration.
    pub fn add_root(&mut self, name: Id, decl: Decl) -> NodeId {
        let id = self.push(name, decl, None);
        self.roots.push(id);
        id
    }

    /// Adds `decl` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this arena.
    pub fn add_child(&mut self, parent: NodeId, name: Id, decl: Decl) -> NodeId {
        let kind = decl.kind();
        let id = self.push(name, decl, Some(parent));
        let node = &mut self.nodes[parent.0];
        node.children.push(id);
        node.by_kind.entry(kind).or_default().push(id);
        id
    }

    /// Records where `id` was declared.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this arena.
    pub fn set_span(&mut self, id: NodeId, span: Span) {
        self.nodes[id.0].span = span;
    }

    fn push(&mut self, name: Id, decl: Decl, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name,
            decl,
            parent,
            span: Span::default(),
            children: Vec::new(),
            by_kind: IndexMap::new(),
        });
        id
    }

    /// # Panics
    ///
    /// Panics if `id` does not belong to this arena.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Top-level declarations in source order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Children of `id` with the given kind, in insertion order.
    ///
    /// Returns an empty slice when there are none.
    pub fn children_of_kind(&self, id: NodeId, kind: NodeKind) -> &[NodeId] {
        self.node(id)
            .by_kind
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// First child of the given kind named `name`.
    pub fn child_named(&self, id: NodeId, kind: NodeKind, name: Id) -> Option<NodeId> {
        self.children_of_kind(id, kind)
            .iter()
            .copied()
            .find(|child| self.node(*child).name == name)
    }

    /// Argument children of an operation, callback or extended attribute.
    pub fn arguments(&self, id: NodeId) -> &[NodeId] {
        self.children_of_kind(id, NodeKind::Argument)
    }

    /// The extended attribute named `name` attached to `id`.
    pub fn extended_attribute(&self, id: NodeId, name: &str) -> Option<&Node> {
        self.children_of_kind(id, NodeKind::ExtendedAttribute)
            .iter()
            .map(|child| self.node(*child))
            .find(|attr| attr.name == name)
    }

    /// Names of the [`NodeKind::Text`] children of `id`.
    pub fn texts(&self, id: NodeId) -> impl Iterator<Item = Id> + '_ {
        self.children_of_kind(id, NodeKind::Text)
            .iter()
            .map(|child| self.node(*child).name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
