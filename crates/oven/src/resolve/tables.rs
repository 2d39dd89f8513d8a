//! Symbol tables built by one resolution run.

use indexmap::{IndexMap, IndexSet};

use oven_core::{ast::NodeId, identifier::Id, types::TypeRef};

use super::classify::CallbackFlavor;

/// A registered callback type.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackEntry {
    node: NodeId,
    function_only: bool,
    operations: Vec<Id>,
    flavor: Option<CallbackFlavor>,
}

impl CallbackEntry {
    pub fn new(node: NodeId, function_only: bool, operations: Vec<Id>) -> Self {
        let flavor = CallbackFlavor::from_operations(&operations);
        Self {
            node,
            function_only,
            operations,
            flavor,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn function_only(&self) -> bool {
        self.function_only
    }

    /// Names of the operations the callback declares.
    pub fn operations(&self) -> &[Id] {
        &self.operations
    }

    pub fn flavor(&self) -> Option<CallbackFlavor> {
        self.flavor
    }
}

/// Name tables plus the export bookkeeping of a run.
///
/// Registration keeps the last declaration of a name.
#[derive(Debug, Clone, Default)]
pub struct SymbolTables {
    interfaces: IndexMap<Id, NodeId>,
    dictionaries: IndexMap<Id, NodeId>,
    enums: IndexMap<Id, Vec<Id>>,
    typedefs: IndexMap<Id, TypeRef>,
    callbacks: IndexMap<Id, CallbackEntry>,

    /// May hold the same interface more than once.
    exported_interfaces: Vec<Id>,
    command_table: IndexMap<String, String>,
    active_objects: IndexSet<Id>,
    /// Implementing interface name to the host root it is attached to.
    implemented_classes: IndexMap<Id, Id>,
    implemented_object: Option<Id>,
}

impl SymbolTables {
    pub(crate) fn add_interface(&mut self, name: Id, node: NodeId) {
        self.interfaces.insert(name, node);
    }

    pub(crate) fn add_dictionary(&mut self, name: Id, node: NodeId) {
        self.dictionaries.insert(name, node);
    }

    pub(crate) fn add_enum(&mut self, name: Id, literals: Vec<Id>) {
        self.enums.insert(name, literals);
    }

    pub(crate) fn add_typedef(&mut self, name: Id, aliased: TypeRef) {
        self.typedefs.insert(name, aliased);
    }

    pub(crate) fn add_callback(&mut self, name: Id, entry: CallbackEntry) {
        self.callbacks.insert(name, entry);
    }

    pub(crate) fn push_exported(&mut self, name: Id) {
        self.exported_interfaces.push(name);
    }

    /// Inserts a command, replacing any earlier one for `native_function`.
    pub(crate) fn insert_command(&mut self, native_function: String, command: String) {
        self.command_table.insert(native_function, command);
    }

    pub(crate) fn add_active_object(&mut self, name: Id) {
        self.active_objects.insert(name);
    }

    pub(crate) fn add_implemented_class(&mut self, name: Id, host: Id) {
        self.implemented_classes.insert(name, host);
    }

    pub(crate) fn set_implemented_object(&mut self, name: Id) {
        self.implemented_object = Some(name);
    }

    pub fn interface(&self, name: Id) -> Option<NodeId> {
        self.interfaces.get(&name).copied()
    }

    pub fn interfaces(&self) -> &IndexMap<Id, NodeId> {
        &self.interfaces
    }

    pub fn dictionary(&self, name: Id) -> Option<NodeId> {
        self.dictionaries.get(&name).copied()
    }

    pub fn dictionaries(&self) -> &IndexMap<Id, NodeId> {
        &self.dictionaries
    }

    pub fn enum_literals(&self, name: Id) -> Option<&[Id]> {
        self.enums.get(&name).map(Vec::as_slice)
    }

    pub fn enums(&self) -> &IndexMap<Id, Vec<Id>> {
        &self.enums
    }

    pub fn typedef(&self, name: Id) -> Option<&TypeRef> {
        self.typedefs.get(&name)
    }

    pub fn typedefs(&self) -> &IndexMap<Id, TypeRef> {
        &self.typedefs
    }

    pub fn callback(&self, name: Id) -> Option<&CallbackEntry> {
        self.callbacks.get(&name)
    }

    pub fn callbacks(&self) -> &IndexMap<Id, CallbackEntry> {
        &self.callbacks
    }

    pub fn exported_interfaces(&self) -> &[Id] {
        &self.exported_interfaces
    }

    pub fn is_exported_interface(&self, name: Id) -> bool {
        self.exported_interfaces.contains(&name)
    }

    /// Native function name to backend command.
    pub fn command_table(&self) -> &IndexMap<String, String> {
        &self.command_table
    }

    pub fn active_objects(&self) -> &IndexSet<Id> {
        &self.active_objects
    }

    pub fn implemented_classes(&self) -> &IndexMap<Id, Id> {
        &self.implemented_classes
    }

    /// Host root `name` was attached to by an `implements` statement.
    pub fn implemented_host(&self, name: Id) -> Option<Id> {
        self.implemented_classes.get(&name).copied()
    }

    /// The last attribute through which a host root reaches the module.
    pub fn implemented_object(&self) -> Option<Id> {
        self.implemented_object
    }
}
