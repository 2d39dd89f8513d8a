//! Semantic resolution of a parsed AST for one target module.
//!
//! Resolution runs in three ordered phases:
//!
//! 1. **Declare** - a breadth-first worklist over every declaration
//!    registers interfaces, callbacks, dictionaries, typedefs and enums,
//!    records `[Constructor]` interfaces and host-root `implements`
//!    statements of the target module.
//! 2. **Link** - a second worklist pass exports the interfaces reached from
//!    host roots through attributes, and the interfaces returned by
//!    operations.
//! 3. **Module** - the interfaces of the target module get their
//!    constructor provenance, visibility, type classes and command table
//!    entries.
//!
//! Because every name is declared before anything is linked, the result
//! does not depend on the order declarations appear in.
//!
//! Partial declarations are not merged into the declaration they extend;
//! they are reported with a warning and otherwise ignored.

mod annotations;
mod classify;
mod tables;

pub use annotations::{Annotations, AttributeAnnotation, InterfaceAnnotation, OperationAnnotation};
pub use classify::{CallbackFlavor, Classifier, NativeRepr, Primitive, TypeClass};
pub use tables::{CallbackEntry, SymbolTables};

use std::collections::VecDeque;

use indexmap::IndexMap;
use log::{debug, info, trace, warn};
use thiserror::Error;

use oven_core::{
    ast::{Ast, Decl, NodeId, NodeKind},
    identifier::Id,
    span::Span,
    types::TypeRef,
};

use crate::config::ResolveConfig;

use classify::ClassifyError;

/// Fatal resolution failures.
///
/// Each variant carries the span of the declaration whose type failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("unresolved type `{name}` in {site}")]
    UnresolvedType {
        name: String,
        site: String,
        span: Span,
    },

    #[error("unsupported union `{ty}` in {site}: members must all be enums or all be interfaces")]
    UnsupportedUnion {
        ty: String,
        site: String,
        span: Span,
    },

    #[error("typedef `{name}` refers to itself, reached from {site}")]
    TypedefCycle {
        name: String,
        site: String,
        span: Span,
    },
}

impl ResolveError {
    fn from_classify(err: ClassifyError, site: String, span: Span) -> Self {
        match err {
            ClassifyError::Unresolved(name) => Self::UnresolvedType { name, site, span },
            ClassifyError::UnsupportedUnion(ty) => Self::UnsupportedUnion { ty, site, span },
            ClassifyError::TypedefCycle(name) => Self::TypedefCycle {
                name: name.to_string(),
                site,
                span,
            },
        }
    }

    /// Source range of the offending declaration.
    pub fn span(&self) -> Span {
        match self {
            Self::UnresolvedType { span, .. }
            | Self::UnsupportedUnion { span, .. }
            | Self::TypedefCycle { span, .. } => *span,
        }
    }

    /// Short text for a label under [`span`](Self::span).
    pub fn label(&self) -> String {
        match self {
            Self::UnresolvedType { name, .. } => format!("`{name}` is not declared"),
            Self::UnsupportedUnion { .. } => "mixed union".to_string(),
            Self::TypedefCycle { name, .. } => format!("`{name}` expands to itself"),
        }
    }

    /// Suggested remedy.
    pub fn help(&self) -> &'static str {
        match self {
            Self::UnresolvedType { .. } => {
                "declare it as an interface, dictionary, enum, callback or typedef"
            }
            Self::UnsupportedUnion { .. } => "use a union of only enums or only interfaces",
            Self::TypedefCycle { .. } => "break the cycle with a concrete type",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Declare,
    Link,
}

/// Resolves an [`Ast`] for one target module.
///
/// A resolver is consumed by [`Resolver::prepare`]; every run starts from
/// empty tables.
pub struct Resolver<'a> {
    ast: &'a Ast,
    config: &'a ResolveConfig,
    module: String,
    tables: SymbolTables,
    annotations: Annotations,
}

impl<'a> Resolver<'a> {
    pub fn new(ast: &'a Ast, config: &'a ResolveConfig, module: impl Into<String>) -> Self {
        Self {
            ast,
            config,
            module: module.into(),
            tables: SymbolTables::default(),
            annotations: Annotations::default(),
        }
    }

    /// Run every phase and return the complete resolution.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] when a type used by the target module
    /// cannot be classified. No partial result is produced.
    pub fn prepare(mut self) -> Result<Resolution, ResolveError> {
        info!(module = self.module; "Resolving module");

        self.run_phase(Phase::Declare);
        debug!(
            interfaces = self.tables.interfaces().len(),
            callbacks = self.tables.callbacks().len(),
            dictionaries = self.tables.dictionaries().len(),
            enums = self.tables.enums().len(),
            typedefs = self.tables.typedefs().len();
            "Declarations registered"
        );

        self.run_phase(Phase::Link);
        debug!(
            exported = self.tables.exported_interfaces().len(),
            active_objects = self.tables.active_objects().len();
            "Exports linked"
        );

        let roots = self.module_roots();
        if roots.is_empty() {
            warn!(module = self.module; "No top-level declaration matches the module name");
        }
        for &root in &roots {
            for iface in self.module_interfaces(root) {
                self.resolve_interface(root, iface)?;
            }
        }

        info!(
            module = self.module,
            commands = self.tables.command_table().len();
            "Module resolved"
        );

        Ok(Resolution {
            module: self.module,
            roots,
            tables: self.tables,
            annotations: self.annotations,
        })
    }

    fn run_phase(&mut self, phase: Phase) {
        let ast = self.ast;
        let mut queue: VecDeque<NodeId> = ast.roots().iter().copied().collect();

        while let Some(id) = queue.pop_front() {
            let node = ast.node(id);
            if let Decl::Partial { target } = node.decl() {
                if let Phase::Declare = phase {
                    warn!(
                        name:% = node.name(),
                        target:? = target;
                        "Partial declarations are not merged; ignoring"
                    );
                }
                continue;
            }

            match phase {
                Phase::Declare => self.declare(id),
                Phase::Link => self.link(id),
            }
            queue.extend(node.children());
        }
    }

    // ============================================================================
    // Declare
    // ============================================================================

    fn declare(&mut self, id: NodeId) {
        let ast = self.ast;
        let node = ast.node(id);
        let name = node.name();

        match node.decl() {
            Decl::Interface { callback, .. } => {
                let marker = ast.extended_attribute(id, "Callback");
                if marker.is_some() || *callback {
                    let function_only = marker
                        .and_then(|attr| match attr.decl() {
                            Decl::ExtendedAttribute { identity, .. } => *identity,
                            _ => None,
                        })
                        .is_some_and(|identity| identity == self.config.function_only_marker());
                    let operations = ast
                        .children_of_kind(id, NodeKind::Operation)
                        .iter()
                        .map(|op| ast.node(*op).name())
                        .collect();
                    trace!(name:% = name, function_only; "Callback interface");
                    self.tables
                        .add_callback(name, CallbackEntry::new(id, function_only, operations));
                }

                self.tables.add_interface(name, id);

                let constructor = ast
                    .children_of_kind(id, NodeKind::ExtendedAttribute)
                    .iter()
                    .copied()
                    .find(|attr| ast.node(*attr).name() == "Constructor");
                if let Some(constructor) = constructor {
                    trace!(name:% = name; "Constructible interface");
                    let annotation = self.annotations.interface_mut(id);
                    annotation.constructor = Some(constructor);
                    annotation.exported = Some(name);
                }
            }
            Decl::Callback { .. } => {
                self.tables
                    .add_callback(name, CallbackEntry::new(id, true, Vec::new()));
            }
            Decl::Dictionary { .. } => self.tables.add_dictionary(name, id),
            Decl::Typedef { aliased } => self.tables.add_typedef(name, aliased.clone()),
            Decl::Enum => self.tables.add_enum(name, ast.texts(id).collect()),
            Decl::Implements { implemented } => self.declare_implements(id, name, *implemented),
            _ => {}
        }
    }

    /// `Host implements Iface;` inside the target module attaches `Iface`
    /// to the host root.
    fn declare_implements(&mut self, id: NodeId, host: Id, implemented: Id) {
        let ast = self.ast;
        if !host.with_str(|host| self.config.is_host_root(host)) {
            return;
        }
        let Some(parent) = ast.parent(id) else {
            debug!(host:% = host, implemented:% = implemented; "Top-level implements statement ignored");
            return;
        };
        if !ast.node(parent).name().eq_ignore_ascii_case(&self.module) {
            return;
        }

        trace!(host:% = host, implemented:% = implemented; "Implemented class");
        self.tables.add_implemented_class(implemented, host);
        match ast.child_named(parent, NodeKind::Interface, implemented) {
            Some(iface) => self.annotations.interface_mut(iface).implements = Some(host),
            None => debug!(implemented:% = implemented; "Implemented interface not declared in module"),
        }
    }

    // ============================================================================
    // Link
    // ============================================================================

    fn link(&mut self, id: NodeId) {
        let ast = self.ast;
        let node = ast.node(id);

        match node.decl() {
            Decl::Attribute { value_type, .. } => {
                let Some(owner) = ast.parent(id).map(|parent| ast.node(parent)) else {
                    return;
                };
                if owner.kind() != NodeKind::Interface {
                    return;
                }
                let Some(host) = self.tables.implemented_host(owner.name()) else {
                    return;
                };

                self.tables.set_implemented_object(node.name());
                if let Some(target) = self.named_interface(value_type) {
                    self.export(target, host);
                }
            }
            Decl::Operation { return_type, .. } => {
                if let Some(target) = self.named_interface(return_type) {
                    let returned = return_type.base_name();
                    self.tables.add_active_object(returned);
                    self.export(target, returned);
                }
            }
            _ => {}
        }
    }

    fn named_interface(&self, ty: &TypeRef) -> Option<NodeId> {
        if ty.is_union() {
            return None;
        }
        self.tables.interface(ty.base_name())
    }

    fn export(&mut self, iface: NodeId, under: Id) {
        let name = self.ast.node(iface).name();
        trace!(name:% = name, under:% = under; "Exported interface");
        self.annotations.interface_mut(iface).exported = Some(under);
        self.tables.push_exported(name);
    }

    // ============================================================================
    // Module
    // ============================================================================

    /// Top-level declarations named like the module, ignoring case.
    fn module_roots(&self) -> Vec<NodeId> {
        self.ast
            .roots()
            .iter()
            .copied()
            .filter(|root| self.ast.node(*root).name().eq_ignore_ascii_case(&self.module))
            .collect()
    }

    fn module_interfaces(&self, root: NodeId) -> Vec<NodeId> {
        match self.ast.node(root).kind() {
            NodeKind::Module => self
                .ast
                .children_of_kind(root, NodeKind::Interface)
                .to_vec(),
            NodeKind::Interface => vec![root],
            _ => Vec::new(),
        }
    }

    fn resolve_interface(&mut self, root: NodeId, iface: NodeId) -> Result<(), ResolveError> {
        let ast = self.ast;
        let node = ast.node(iface);
        let name = node.name();
        debug!(interface:% = name; "Resolving interface");

        let constructor = self.annotations.interface(iface).and_then(|a| a.constructor);
        if let Some(constructor) = constructor {
            self.resolve_constructor(iface, constructor);
        }

        if let Decl::Interface {
            inherit: Some(parent),
            ..
        } = node.decl()
        {
            if self.tables.is_exported_interface(*parent) {
                trace!(interface:% = name, parent:% = parent; "Private interface");
                self.annotations.interface_mut(iface).private = true;
            }
        }

        for &attr in ast.children_of_kind(iface, NodeKind::Attribute) {
            let attr_node = ast.node(attr);
            if let Some(ty) = attr_node.decl().value_type() {
                let class = self.classify(ty, attr, || {
                    format!("attribute `{}` of `{name}`", attr_node.name())
                })?;
                self.annotations.attribute_mut(attr).class = Some(class);
            }
        }

        let exported = self
            .annotations
            .interface(iface)
            .is_some_and(|a| a.exported.is_some());
        for &op in ast.children_of_kind(iface, NodeKind::Operation) {
            self.resolve_operation(root, name, exported, op)?;
        }

        Ok(())
    }

    fn resolve_constructor(&mut self, iface: NodeId, constructor: NodeId) {
        let ast = self.ast;
        let arguments = ast.arguments(constructor);

        let primitive_args: Vec<Id> = arguments
            .iter()
            .map(|arg| ast.node(*arg))
            .filter(|arg| {
                arg.decl()
                    .value_type()
                    .and_then(|ty| self.native_repr(ty))
                    .is_some()
            })
            .map(|arg| arg.name())
            .collect();

        let argument_names: Vec<Id> = arguments.iter().map(|arg| ast.node(*arg).name()).collect();

        for &attr in ast.children_of_kind(iface, NodeKind::Attribute) {
            let attr_name = ast.node(attr).name();
            let exist_in = if argument_names.contains(&attr_name) {
                Some("ctor".to_string())
            } else {
                arguments.iter().find_map(|arg| {
                    let arg_node = ast.node(*arg);
                    let ty = arg_node.decl().value_type()?;
                    let declaration = self.named_interface(ty).or_else(|| {
                        (!ty.is_union())
                            .then(|| self.tables.dictionary(ty.base_name()))
                            .flatten()
                    })?;
                    declares_member(ast, declaration, attr_name)
                        .then(|| format!("{}.{attr_name}", arg_node.name()))
                })
            };

            if let Some(exist_in) = exist_in {
                trace!(attribute:% = attr_name, exist_in; "Attribute provenance");
                self.annotations.attribute_mut(attr).exist_in = Some(exist_in);
            }
        }

        self.annotations
            .interface_mut(iface)
            .constructor_primitive_args = primitive_args;
    }

    fn resolve_operation(
        &mut self,
        root: NodeId,
        iface_name: Id,
        exported: bool,
        op: NodeId,
    ) -> Result<(), ResolveError> {
        let ast = self.ast;
        let node = ast.node(op);
        let op_name = node.name();
        let mut annotation = OperationAnnotation::default();

        if exported && !op_name.is_empty() {
            let op_str = op_name.to_string();
            let native_function = format!("{iface_name}{}", capitalize(&op_str));
            let native_cmd = format!("{iface_name}_{op_str}");
            trace!(native_function, native_cmd; "Command table entry");
            self.tables
                .insert_command(native_function.clone(), native_cmd.clone());
            annotation.native_function = Some(native_function);
            annotation.native_cmd = Some(native_cmd);
        }

        for &arg in ast.arguments(op) {
            let arg_node = ast.node(arg);
            let arg_name = arg_node.name();
            annotation.argnames.push(arg_name);

            let Some(ty) = arg_node.decl().value_type() else {
                continue;
            };
            let class = self.classify(ty, arg, || {
                format!("argument `{arg_name}` of `{iface_name}.{op_name}`")
            })?;
            if class.is_async() {
                annotation.is_async = true;
                self.annotations.mark_async_root(root);
            } else if class.is_plain_value() {
                annotation.primitive_args.push(arg_name);
            }
            self.annotations.set_argument(arg, class);
        }

        if let Some(return_type) = node.decl().value_type() {
            if !return_type.is_void() {
                let class = self.classify(return_type, op, || {
                    format!("return type of `{iface_name}.{op_name}`")
                })?;
                annotation.return_class = Some(class);
            }
            annotation.return_internal = self
                .tables
                .exported_interfaces()
                .iter()
                .copied()
                .find(|exported| *exported == return_type.base_name());
        }

        *self.annotations.operation_mut(op) = annotation;
        Ok(())
    }

    fn classify(
        &self,
        ty: &TypeRef,
        node: NodeId,
        site: impl FnOnce() -> String,
    ) -> Result<TypeClass, ResolveError> {
        let span = self.ast.node(node).span();
        Classifier::new(&self.tables)
            .classify(ty)
            .map_err(|err| ResolveError::from_classify(err, site(), span))
    }

    /// Native representation of a primitive or enum type.
    fn native_repr(&self, ty: &TypeRef) -> Option<NativeRepr> {
        if let Some(primitive) = Primitive::from_type(ty) {
            return primitive.native();
        }
        (!ty.is_union() && self.tables.enum_literals(ty.base_name()).is_some())
            .then_some(NativeRepr::String)
    }
}

/// Returns `true` if `declaration` has an attribute, member, constant or
/// operation named `name`.
fn declares_member(ast: &Ast, declaration: NodeId, name: Id) -> bool {
    [
        NodeKind::Attribute,
        NodeKind::DictionaryMember,
        NodeKind::Const,
        NodeKind::Operation,
    ]
    .into_iter()
    .any(|kind| ast.child_named(declaration, kind, name).is_some())
}

/// Uppercases the first character.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Outcome of a successful [`Resolver::prepare`].
#[derive(Debug, Clone)]
pub struct Resolution {
    module: String,
    roots: Vec<NodeId>,
    tables: SymbolTables,
    annotations: Annotations,
}

impl Resolution {
    /// Module name as requested.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Top-level declarations that matched the module name.
    pub fn module_roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn tables(&self) -> &SymbolTables {
        &self.tables
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn command_table(&self) -> &IndexMap<String, String> {
        self.tables.command_table()
    }

    pub fn exported_interfaces(&self) -> &[Id] {
        self.tables.exported_interfaces()
    }

    /// Returns `true` if any operation of the module takes a callback.
    pub fn is_async(&self) -> bool {
        self.annotations.has_async_root()
    }
}
