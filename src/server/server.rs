//! The authoritative owner of the address space.
//!
//! Every operation takes the store-wide readers-writer lock for its own
//! duration only: reads share it, structural changes take it exclusively.
//! Node context hooks and method handlers always run with the lock released,
//! so they may call back into the server.
//!
//! Operations invoked directly on [`Server`] act for [`Session::Local`];
//! requests routed through [`Server::handle_request`] carry the session the
//! engine reported. Both pass the injected [`AccessPolicy`] first.

use std::sync::Arc;
use std::sync::Weak;

use arc_swap::ArcSwap;
use parking_lot::RwLock;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::access_level;
use crate::ids;
use crate::AccessPolicy;
use crate::AddNodeItem;
use crate::AddressSpace;
use crate::AddressSpaceError;
use crate::ArgumentDirection;
use crate::AttributeId;
use crate::BrowseDirection;
use crate::CallbackRegistry;
use crate::ContextHandle;
use crate::ContextRegistry;
use crate::DataTypeAttributes;
use crate::Error;
use crate::ExpandedNodeId;
use crate::FnHandler;
use crate::LocalizedText;
use crate::MethodAttributes;
use crate::MethodError;
use crate::NodeAttributes;
use crate::NodeClass;
use crate::NodeContext;
use crate::NodeId;
use crate::ObjectAttributes;
use crate::ObjectTypeAttributes;
use crate::Operation;
use crate::ProtocolEngine;
use crate::QualifiedName;
use crate::ReferenceDescription;
use crate::ReferenceTypeAttributes;
use crate::RelativePathElement;
use crate::RepeatedCallback;
use crate::RepeatedCallbackHandler;
use crate::Request;
use crate::Response;
use crate::Result;
use crate::SchedulerError;
use crate::ServerConfig;
use crate::ServerMethod;
use crate::Session;
use crate::VariableAttributes;
use crate::VariableTypeAttributes;
use crate::Variant;
use crate::ViewAttributes;

pub struct Server {
    config: ServerConfig,
    space: RwLock<AddressSpace>,
    contexts: ContextRegistry,
    access_policy: ArcSwap<Box<dyn AccessPolicy>>,
    engine: Arc<dyn ProtocolEngine>,
    callbacks: CallbackRegistry,
    this: Weak<Server>,
}

impl Server {
    pub(crate) fn new(
        config: ServerConfig,
        engine: Arc<dyn ProtocolEngine>,
        access_policy: Box<dyn AccessPolicy>,
    ) -> Arc<Self> {
        let space = AddressSpace::new(
            &config.server.application_uri,
            config.address_space.first_auto_id,
            config.address_space.max_nodes,
        );
        Arc::new_cyclic(|this| Self {
            config,
            space: RwLock::new(space),
            contexts: ContextRegistry::new(),
            access_policy: ArcSwap::from_pointee(access_policy),
            engine,
            callbacks: CallbackRegistry::new(),
            this: this.clone(),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<dyn ProtocolEngine> {
        &self.engine
    }

    pub fn contexts(&self) -> &ContextRegistry {
        &self.contexts
    }

    /// Replaces the access policy for all subsequent operations.
    pub fn set_access_policy(
        &self,
        access_policy: Box<dyn AccessPolicy>,
    ) {
        self.access_policy.store(Arc::new(access_policy));
        info!("access policy replaced");
    }

    /// Runs `f` against the address space under the shared lock.
    pub fn with_address_space<R>(
        &self,
        f: impl FnOnce(&AddressSpace) -> R,
    ) -> R {
        let guard = self.space.read();
        f(&guard)
    }

    fn authorize(
        &self,
        operation: Operation,
        session: &Session,
        node_id: &NodeId,
    ) -> Result<()> {
        if self.access_policy.load().allow(operation, session, node_id) {
            return Ok(());
        }
        warn!(%operation, ?session, %node_id, "access denied");
        Err(AddressSpaceError::AccessDenied {
            operation,
            node_id: node_id.clone(),
        }
        .into())
    }

    /// Live node context behind `handle`. A handle whose owner has dropped
    /// the context is skipped.
    fn live_context(
        &self,
        handle: Option<ContextHandle>,
        node_id: &NodeId,
    ) -> Option<Arc<dyn NodeContext>> {
        let handle = handle?;
        if self.contexts.is_method(handle) {
            return None;
        }
        let context = self.contexts.node_context(handle);
        if context.is_none() {
            warn!(%node_id, ?handle, "node context no longer available, skipping hook");
        }
        context
    }

    fn hook_failed(
        node_id: &NodeId,
        hook: &str,
        e: Error,
    ) -> Error {
        error!(%node_id, "{} hook failed: {}", hook, e);
        AddressSpaceError::CallbackFailed {
            node_id: node_id.clone(),
            reason: e.to_string(),
        }
        .into()
    }

    // ---------------------------------------------------------------
    // Namespaces

    /// Registers a naming authority and returns its index. A known URI keeps
    /// its index.
    pub fn add_namespace(
        &self,
        uri: &str,
    ) -> u16 {
        let index = self.space.write().add_namespace(uri);
        info!(%uri, index, "namespace registered");
        index
    }

    pub fn namespace_index(
        &self,
        uri: &str,
    ) -> Option<u16> {
        self.space.read().namespace_index(uri)
    }

    pub fn namespaces(&self) -> Vec<String> {
        self.space.read().namespaces().to_vec()
    }

    // ---------------------------------------------------------------
    // Adding nodes

    /// Inserts a node described by `item` and runs the construct hook of
    /// its context, if any. A failing hook removes the node again.
    pub fn add_node(
        &self,
        item: AddNodeItem,
    ) -> Result<NodeId> {
        self.add_node_as(&Session::Local, item)
    }

    fn add_node_as(
        &self,
        session: &Session,
        item: AddNodeItem,
    ) -> Result<NodeId> {
        self.authorize(Operation::AddNode, session, &item.parent_id)?;
        let handle = item.context;
        let node_id = self.space.write().add_node(item)?;

        if let Some(context) = self.live_context(handle, &node_id) {
            if let Err(e) = context.construct(self, &node_id) {
                if let Err(undo) = self.space.write().remove_node(&node_id, true) {
                    warn!(%node_id, "rolling back failed construct: {}", undo);
                }
                return Err(Self::hook_failed(&node_id, "construct", e));
            }
        }
        Ok(node_id)
    }

    pub fn add_folder(
        &self,
        parent: &NodeId,
        browse_name: impl Into<QualifiedName>,
        requested_id: NodeId,
    ) -> Result<NodeId> {
        self.add_node(
            AddNodeItem::new(parent.clone(), browse_name, ObjectAttributes::default())
                .with_requested_id(requested_id)
                .with_reference_type(ids::ORGANIZES)
                .with_type_definition(ids::FOLDER_TYPE),
        )
    }

    pub fn add_object(
        &self,
        parent: &NodeId,
        browse_name: impl Into<QualifiedName>,
        requested_id: NodeId,
        attributes: ObjectAttributes,
    ) -> Result<NodeId> {
        self.add_node(
            AddNodeItem::new(parent.clone(), browse_name, attributes)
                .with_requested_id(requested_id)
                .with_reference_type(ids::ORGANIZES),
        )
    }

    /// Object whose type definition is `type_definition`
    pub fn add_instance(
        &self,
        parent: &NodeId,
        browse_name: impl Into<QualifiedName>,
        requested_id: NodeId,
        type_definition: NodeId,
    ) -> Result<NodeId> {
        self.add_node(
            AddNodeItem::new(parent.clone(), browse_name, ObjectAttributes::default())
                .with_requested_id(requested_id)
                .with_reference_type(ids::ORGANIZES)
                .with_type_definition(type_definition),
        )
    }

    pub fn add_variable(
        &self,
        parent: &NodeId,
        browse_name: impl Into<QualifiedName>,
        requested_id: NodeId,
        attributes: VariableAttributes,
    ) -> Result<NodeId> {
        self.add_node(
            AddNodeItem::new(parent.clone(), browse_name, attributes)
                .with_requested_id(requested_id)
                .with_reference_type(ids::ORGANIZES),
        )
    }

    /// Property variable attached through HasProperty
    pub fn add_property(
        &self,
        parent: &NodeId,
        browse_name: impl Into<QualifiedName>,
        value: impl Into<Variant>,
    ) -> Result<NodeId> {
        self.add_node(
            AddNodeItem::new(parent.clone(), browse_name, VariableAttributes::new(value))
                .with_reference_type(ids::HAS_PROPERTY)
                .with_type_definition(ids::PROPERTY_TYPE),
        )
    }

    pub fn add_object_type(
        &self,
        parent: &NodeId,
        browse_name: impl Into<QualifiedName>,
        requested_id: NodeId,
        attributes: ObjectTypeAttributes,
    ) -> Result<NodeId> {
        self.add_type(parent, browse_name, requested_id, NodeAttributes::ObjectType(attributes))
    }

    pub fn add_variable_type(
        &self,
        parent: &NodeId,
        browse_name: impl Into<QualifiedName>,
        requested_id: NodeId,
        attributes: VariableTypeAttributes,
    ) -> Result<NodeId> {
        self.add_type(parent, browse_name, requested_id, NodeAttributes::VariableType(attributes))
    }

    pub fn add_reference_type(
        &self,
        parent: &NodeId,
        browse_name: impl Into<QualifiedName>,
        requested_id: NodeId,
        attributes: ReferenceTypeAttributes,
    ) -> Result<NodeId> {
        self.add_type(parent, browse_name, requested_id, NodeAttributes::ReferenceType(attributes))
    }

    pub fn add_data_type(
        &self,
        parent: &NodeId,
        browse_name: impl Into<QualifiedName>,
        requested_id: NodeId,
        attributes: DataTypeAttributes,
    ) -> Result<NodeId> {
        self.add_type(parent, browse_name, requested_id, NodeAttributes::DataType(attributes))
    }

    fn add_type(
        &self,
        parent: &NodeId,
        browse_name: impl Into<QualifiedName>,
        requested_id: NodeId,
        attributes: NodeAttributes,
    ) -> Result<NodeId> {
        self.add_node(
            AddNodeItem::new(parent.clone(), browse_name, attributes)
                .with_requested_id(requested_id)
                .with_reference_type(ids::HAS_SUBTYPE),
        )
    }

    pub fn add_view(
        &self,
        parent: &NodeId,
        browse_name: impl Into<QualifiedName>,
        requested_id: NodeId,
        attributes: ViewAttributes,
    ) -> Result<NodeId> {
        self.add_node(
            AddNodeItem::new(parent.clone(), browse_name, NodeAttributes::View(attributes))
                .with_requested_id(requested_id)
                .with_reference_type(ids::ORGANIZES),
        )
    }

    /// Adds a Method node below `parent` (HasOrderedComponent) served by
    /// `method`. The server keeps only a weak reference to the handler.
    pub fn add_method(
        &self,
        parent: &NodeId,
        browse_name: impl Into<QualifiedName>,
        requested_id: NodeId,
        method: Arc<dyn ServerMethod>,
    ) -> Result<NodeId> {
        let handle = self.contexts.register_method(method);
        let added = self.add_node(
            AddNodeItem::new(parent.clone(), browse_name, MethodAttributes::default())
                .with_requested_id(requested_id)
                .with_reference_type(ids::HAS_ORDERED_COMPONENT)
                .with_context(handle),
        );
        if added.is_err() {
            self.contexts.unregister(handle);
        }
        added
    }

    /// Tags `node_id` with the Mandatory modelling rule.
    pub fn mark_mandatory(
        &self,
        node_id: &NodeId,
    ) -> Result<bool> {
        self.add_reference(node_id, &ids::HAS_MODELLING_RULE, ids::MODELLING_RULE_MANDATORY, true)
    }

    /// Returns the forward hierarchical child of `parent` named
    /// `browse_name`, creating a folder when there is none. Lookup and insert
    /// happen under one exclusive lock, so concurrent callers converge on the
    /// same node.
    pub fn get_or_create_folder(
        &self,
        parent: &NodeId,
        browse_name: QualifiedName,
    ) -> Result<NodeId> {
        self.authorize(Operation::AddNode, &Session::Local, parent)?;
        let mut space = self.space.write();
        let existing: Vec<NodeId> = space
            .find_children(parent, &ids::HIERARCHICAL_REFERENCES, true, &browse_name)
            .collect();
        match existing.as_slice() {
            [id] => return Ok(id.clone()),
            [] => {}
            many => {
                return Err(AddressSpaceError::Ambiguous {
                    segment: browse_name,
                    candidates: many.len(),
                }
                .into())
            }
        }
        let node_id = space.add_node(
            AddNodeItem::new(parent.clone(), browse_name, ObjectAttributes::default())
                .with_reference_type(ids::ORGANIZES)
                .with_type_definition(ids::FOLDER_TYPE),
        )?;
        Ok(node_id)
    }

    // ---------------------------------------------------------------
    // Deleting nodes

    /// Removes a node after running the destruct hook of its context.
    /// Succeeds exactly when the node was removed.
    pub fn delete_node(
        &self,
        node_id: &NodeId,
        cascade: bool,
    ) -> Result<()> {
        self.delete_node_as(&Session::Local, node_id, cascade)
    }

    fn delete_node_as(
        &self,
        session: &Session,
        node_id: &NodeId,
        cascade: bool,
    ) -> Result<()> {
        self.authorize(Operation::DeleteNode, session, node_id)?;
        let handle = self.space.read().find(node_id)?.context;

        if let Some(context) = self.live_context(handle, node_id) {
            context
                .destruct(self, node_id)
                .map_err(|e| Self::hook_failed(node_id, "destruct", e))?;
        }

        let removed = self.space.write().remove_node(node_id, cascade)?;
        if let Some(handle) = removed.context.filter(|h| self.contexts.is_method(*h)) {
            self.contexts.unregister(handle);
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // References

    pub fn add_reference(
        &self,
        source: &NodeId,
        reference_type_id: &NodeId,
        target: impl Into<ExpandedNodeId>,
        is_forward: bool,
    ) -> Result<bool> {
        self.add_reference_as(&Session::Local, source, reference_type_id, &target.into(), is_forward)
    }

    fn add_reference_as(
        &self,
        session: &Session,
        source: &NodeId,
        reference_type_id: &NodeId,
        target: &ExpandedNodeId,
        is_forward: bool,
    ) -> Result<bool> {
        self.authorize(Operation::AddReference, session, source)?;
        Ok(self
            .space
            .write()
            .add_reference(source, reference_type_id, target, is_forward)?)
    }

    pub fn delete_reference(
        &self,
        source: &NodeId,
        reference_type_id: &NodeId,
        target: impl Into<ExpandedNodeId>,
        is_forward: bool,
    ) -> Result<bool> {
        self.delete_reference_as(&Session::Local, source, reference_type_id, &target.into(), is_forward)
    }

    fn delete_reference_as(
        &self,
        session: &Session,
        source: &NodeId,
        reference_type_id: &NodeId,
        target: &ExpandedNodeId,
        is_forward: bool,
    ) -> Result<bool> {
        self.authorize(Operation::DeleteReference, session, source)?;
        Ok(self
            .space
            .write()
            .delete_reference(source, reference_type_id, target, is_forward)?)
    }

    // ---------------------------------------------------------------
    // Attributes

    /// Reads one attribute. For the Value attribute the context's read hook
    /// sees, and may replace, the value before it is returned.
    pub fn read_attribute(
        &self,
        node_id: &NodeId,
        attribute: AttributeId,
    ) -> Result<Variant> {
        self.read_attribute_as(&Session::Local, node_id, attribute)
    }

    fn read_attribute_as(
        &self,
        session: &Session,
        node_id: &NodeId,
        attribute: AttributeId,
    ) -> Result<Variant> {
        self.authorize(Operation::ReadAttribute, session, node_id)?;
        let (mut value, handle) = {
            let space = self.space.read();
            let node = space.find(node_id)?;
            (node.read_attribute(attribute)?, node.context)
        };

        if attribute == AttributeId::Value {
            if let Some(context) = self.live_context(handle, node_id) {
                context
                    .read_value(self, node_id, &mut value)
                    .map_err(|e| Self::hook_failed(node_id, "read", e))?;
            }
        }
        Ok(value)
    }

    /// Writes one attribute. A Value write is validated, shown to the
    /// context's write hook, and only then committed. A new browse name must
    /// stay unique below every hierarchical parent.
    pub fn write_attribute(
        &self,
        node_id: &NodeId,
        attribute: AttributeId,
        value: &Variant,
    ) -> Result<()> {
        self.write_attribute_as(&Session::Local, node_id, attribute, value)
    }

    fn write_attribute_as(
        &self,
        session: &Session,
        node_id: &NodeId,
        attribute: AttributeId,
        value: &Variant,
    ) -> Result<()> {
        self.authorize(Operation::WriteAttribute, session, node_id)?;

        if attribute == AttributeId::Value {
            let handle = self.space.read().find(node_id)?.context;
            if let Some(context) = self.live_context(handle, node_id) {
                let mut trial = self.space.read().find(node_id)?.clone();
                if !session.is_local() {
                    trial.check_write_mask(attribute)?;
                }
                trial.write_attribute(attribute, value)?;
                context
                    .write_value(self, node_id, value)
                    .map_err(|e| Self::hook_failed(node_id, "write", e))?;
            }
        }

        let mut space = self.space.write();
        if !session.is_local() {
            space.find(node_id)?.check_write_mask(attribute).map_err(|e| {
                warn!(%node_id, ?attribute, ?session, "write refused by write mask");
                e
            })?;
        }
        if attribute == AttributeId::BrowseName {
            let browse_name: QualifiedName = value.get()?;
            space.check_browse_name(node_id, &browse_name)?;
        }
        space.find_mut(node_id)?.write_attribute(attribute, value)?;
        debug!(%node_id, ?attribute, "attribute written");
        Ok(())
    }

    pub fn read_value(
        &self,
        node_id: &NodeId,
    ) -> Result<Variant> {
        self.read_attribute(node_id, AttributeId::Value)
    }

    pub fn write_value(
        &self,
        node_id: &NodeId,
        value: impl Into<Variant>,
    ) -> Result<()> {
        self.write_attribute(node_id, AttributeId::Value, &value.into())
    }

    pub fn read_browse_name(
        &self,
        node_id: &NodeId,
    ) -> Result<QualifiedName> {
        Ok(self.read_attribute(node_id, AttributeId::BrowseName)?.get()?)
    }

    pub fn write_browse_name(
        &self,
        node_id: &NodeId,
        browse_name: QualifiedName,
    ) -> Result<()> {
        self.write_attribute(node_id, AttributeId::BrowseName, &browse_name.into())
    }

    pub fn read_display_name(
        &self,
        node_id: &NodeId,
    ) -> Result<LocalizedText> {
        Ok(self.read_attribute(node_id, AttributeId::DisplayName)?.get()?)
    }

    pub fn write_display_name(
        &self,
        node_id: &NodeId,
        display_name: impl Into<LocalizedText>,
    ) -> Result<()> {
        let display_name: LocalizedText = display_name.into();
        self.write_attribute(node_id, AttributeId::DisplayName, &display_name.into())
    }

    pub fn read_description(
        &self,
        node_id: &NodeId,
    ) -> Result<LocalizedText> {
        Ok(self.read_attribute(node_id, AttributeId::Description)?.get()?)
    }

    pub fn write_description(
        &self,
        node_id: &NodeId,
        description: impl Into<LocalizedText>,
    ) -> Result<()> {
        let description: LocalizedText = description.into();
        self.write_attribute(node_id, AttributeId::Description, &description.into())
    }

    pub fn read_node_class(
        &self,
        node_id: &NodeId,
    ) -> Result<NodeClass> {
        self.authorize(Operation::ReadAttribute, &Session::Local, node_id)?;
        Ok(self.space.read().find(node_id)?.node_class())
    }

    pub fn read_data_type(
        &self,
        node_id: &NodeId,
    ) -> Result<NodeId> {
        Ok(self.read_attribute(node_id, AttributeId::DataType)?.get()?)
    }

    pub fn read_access_level(
        &self,
        node_id: &NodeId,
    ) -> Result<u8> {
        Ok(self.read_attribute(node_id, AttributeId::AccessLevel)?.get()?)
    }

    pub fn write_access_level(
        &self,
        node_id: &NodeId,
        level: u8,
    ) -> Result<()> {
        self.write_attribute(node_id, AttributeId::AccessLevel, &level.into())
    }

    /// Sets the current-write bit of a variable's access level.
    pub fn write_enable(
        &self,
        node_id: &NodeId,
    ) -> Result<()> {
        let level = self.read_access_level(node_id)?;
        self.write_access_level(node_id, level | access_level::CURRENT_WRITE)
    }

    /// Restricts a variable to reads, optionally including history reads.
    pub fn set_read_only(
        &self,
        node_id: &NodeId,
        history: bool,
    ) -> Result<()> {
        let mut level = access_level::CURRENT_READ;
        if history {
            level |= access_level::HISTORY_READ;
        }
        self.write_access_level(node_id, level)
    }

    pub fn read_executable(
        &self,
        node_id: &NodeId,
    ) -> Result<bool> {
        Ok(self.read_attribute(node_id, AttributeId::Executable)?.get()?)
    }

    pub fn write_executable(
        &self,
        node_id: &NodeId,
        executable: bool,
    ) -> Result<()> {
        self.write_attribute(node_id, AttributeId::Executable, &executable.into())
    }

    // ---------------------------------------------------------------
    // Node contexts

    /// Registers `context` with this server's registry. The caller keeps
    /// ownership.
    pub fn register_context(
        &self,
        name: impl Into<String>,
        context: Arc<dyn NodeContext>,
    ) -> ContextHandle {
        self.contexts.register(name, context)
    }

    pub fn get_node_context(
        &self,
        node_id: &NodeId,
    ) -> Result<Option<ContextHandle>> {
        Ok(self.space.read().find(node_id)?.context)
    }

    /// Attaches or detaches a context. No construct hook runs.
    pub fn set_node_context(
        &self,
        node_id: &NodeId,
        handle: Option<ContextHandle>,
    ) -> Result<()> {
        self.space.write().find_mut(node_id)?.context = handle;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Browsing

    pub fn node_exists(
        &self,
        node_id: &NodeId,
    ) -> bool {
        self.space.read().contains(node_id)
    }

    pub fn node_count(&self) -> usize {
        self.space.read().len()
    }

    pub fn browse(
        &self,
        node_id: &NodeId,
        direction: BrowseDirection,
        reference_filter: Option<(&NodeId, bool)>,
    ) -> Result<Vec<ReferenceDescription>> {
        self.browse_as(&Session::Local, node_id, direction, reference_filter)
    }

    fn browse_as(
        &self,
        session: &Session,
        node_id: &NodeId,
        direction: BrowseDirection,
        reference_filter: Option<(&NodeId, bool)>,
    ) -> Result<Vec<ReferenceDescription>> {
        self.authorize(Operation::Browse, session, node_id)?;
        Ok(self.space.read().browse(node_id, direction, reference_filter)?)
    }

    /// Local forward hierarchical children of `node_id`
    pub fn children(
        &self,
        node_id: &NodeId,
    ) -> Result<Vec<NodeId>> {
        self.authorize(Operation::Browse, &Session::Local, node_id)?;
        Ok(self.space.read().children(node_id)?)
    }

    /// The single forward hierarchical child of `parent` named `browse_name`
    pub fn find_child(
        &self,
        parent: &NodeId,
        browse_name: impl Into<QualifiedName>,
    ) -> Result<NodeId> {
        self.translate_browse_path(parent, &[RelativePathElement::hierarchical(browse_name)])
    }

    /// Follows `path` from `origin`. Every hop must match exactly one node:
    /// none is `NoMatch`, several is `Ambiguous`.
    pub fn translate_browse_path(
        &self,
        origin: &NodeId,
        path: &[RelativePathElement],
    ) -> Result<NodeId> {
        self.translate_browse_path_as(&Session::Local, origin, path)
    }

    fn translate_browse_path_as(
        &self,
        session: &Session,
        origin: &NodeId,
        path: &[RelativePathElement],
    ) -> Result<NodeId> {
        self.authorize(Operation::Browse, session, origin)?;
        Ok(self.space.read().translate_browse_path(origin, path)?)
    }

    /// Browse path given as plain names over any hierarchical reference
    pub fn browse_simplified_browse_path(
        &self,
        origin: &NodeId,
        names: &[QualifiedName],
    ) -> Result<NodeId> {
        let path: Vec<RelativePathElement> = names
            .iter()
            .cloned()
            .map(RelativePathElement::hierarchical)
            .collect();
        self.translate_browse_path(origin, &path)
    }

    /// `start` and all nodes below it through forward hierarchical
    /// references, each once
    pub fn hierarchical_descendants(
        &self,
        start: &NodeId,
    ) -> Result<Vec<NodeId>> {
        self.authorize(Operation::Browse, &Session::Local, start)?;
        Ok(self.space.read().hierarchical_descendants(start)?)
    }

    // ---------------------------------------------------------------
    // Methods

    /// Invokes the handler of `method_id` on `object_id`.
    ///
    /// The input count is checked against the handler's signature before it
    /// runs and the output count after; the store lock is not held while the
    /// handler runs.
    pub fn call(
        &self,
        method_id: &NodeId,
        object_id: &NodeId,
        inputs: &[Variant],
    ) -> Result<Vec<Variant>> {
        self.call_as(&Session::Local, method_id, object_id, inputs)
    }

    fn call_as(
        &self,
        session: &Session,
        method_id: &NodeId,
        object_id: &NodeId,
        inputs: &[Variant],
    ) -> Result<Vec<Variant>> {
        self.authorize(Operation::Call, session, method_id)?;
        let handle = {
            let space = self.space.read();
            let method = space.find(method_id)?;
            let NodeAttributes::Method(attributes) = &method.attributes else {
                return Err(AddressSpaceError::InvalidNodeClass {
                    node_id: method_id.clone(),
                    reason: "not a method node",
                }
                .into());
            };
            if !attributes.executable {
                return Err(MethodError::NotExecutable(method_id.clone()).into());
            }
            space.find(object_id)?;
            method.context
        };

        let handler = handle
            .and_then(|h| self.contexts.method(h))
            .ok_or_else(|| MethodError::HandlerUnavailable(method_id.clone()))?;
        let signature = handler.signature();

        if inputs.len() != signature.input_count() {
            return Err(MethodError::ArgumentCountMismatch {
                method_id: method_id.clone(),
                direction: ArgumentDirection::Input,
                expected: signature.input_count(),
                actual: inputs.len(),
            }
            .into());
        }
        for (argument, value) in signature.inputs.iter().zip(inputs) {
            argument.check(value)?;
        }

        debug!(%method_id, %object_id, method = handler.name(), "invoking method");
        let outputs = handler.invoke(self, object_id, inputs)?;

        if outputs.len() != signature.output_count() {
            return Err(MethodError::ArgumentCountMismatch {
                method_id: method_id.clone(),
                direction: ArgumentDirection::Output,
                expected: signature.output_count(),
                actual: outputs.len(),
            }
            .into());
        }
        Ok(outputs)
    }

    // ---------------------------------------------------------------
    // Repeated callbacks

    /// Registers a closure run every `interval_ms` once started. A callback
    /// already registered under `name` is stopped and replaced.
    pub fn add_repeated_callback<F>(
        &self,
        name: &str,
        interval_ms: u64,
        body: F,
    ) -> Result<Arc<RepeatedCallback>>
    where
        F: Fn(&RepeatedCallback) -> Result<()> + Send + Sync + 'static,
    {
        self.add_repeated_handler(name, interval_ms, Arc::new(FnHandler(body)))
    }

    pub fn add_repeated_handler(
        &self,
        name: &str,
        interval_ms: u64,
        handler: Arc<dyn RepeatedCallbackHandler>,
    ) -> Result<Arc<RepeatedCallback>> {
        let min_ms = self.config.callbacks.min_interval_ms;
        if interval_ms < min_ms {
            return Err(SchedulerError::InvalidInterval { interval_ms, min_ms }.into());
        }
        let callback = RepeatedCallback::new(self.this.clone(), name, interval_ms, handler);
        self.callbacks.insert(callback.clone());
        debug!(%name, interval_ms, "repeated callback added");
        Ok(callback)
    }

    /// Stops and removes the callback named `name`.
    pub fn remove_repeated_callback(
        &self,
        name: &str,
    ) -> Result<Arc<RepeatedCallback>> {
        self.callbacks
            .remove(name)
            .ok_or_else(|| SchedulerError::CallbackNotFound(name.to_string()).into())
    }

    pub fn repeated_callback(
        &self,
        name: &str,
    ) -> Option<Arc<RepeatedCallback>> {
        self.callbacks.get(name)
    }

    pub fn repeated_callback_names(&self) -> Vec<String> {
        self.callbacks.names()
    }

    // ---------------------------------------------------------------
    // Engine facing

    /// Routes a request delivered by the engine on behalf of `session`.
    pub fn handle_request(
        &self,
        session: &Session,
        request: Request,
    ) -> Result<Response> {
        match request {
            Request::Read { node_id, attribute } => self
                .read_attribute_as(session, &node_id, attribute)
                .map(Response::Value),
            Request::Write {
                node_id,
                attribute,
                value,
            } => self
                .write_attribute_as(session, &node_id, attribute, &value)
                .map(|_| Response::Written),
            Request::Browse {
                node_id,
                direction,
                reference_type_id,
                include_subtypes,
            } => self
                .browse_as(
                    session,
                    &node_id,
                    direction,
                    reference_type_id.as_ref().map(|id| (id, include_subtypes)),
                )
                .map(Response::References),
            Request::TranslateBrowsePath { origin, path } => self
                .translate_browse_path_as(session, &origin, &path)
                .map(Response::NodeId),
            Request::Call {
                method_id,
                object_id,
                inputs,
            } => self
                .call_as(session, &method_id, &object_id, &inputs)
                .map(Response::Outputs),
            Request::AddNode(mut item) => {
                if !session.is_local() {
                    item.context = None;
                }
                self.add_node_as(session, item).map(Response::NodeId)
            }
            Request::DeleteNode { node_id, cascade } => self
                .delete_node_as(session, &node_id, cascade)
                .map(|_| Response::Deleted),
            Request::AddReference {
                source,
                reference_type_id,
                target,
                is_forward,
            } => self
                .add_reference_as(session, &source, &reference_type_id, &target, is_forward)
                .map(Response::ReferenceChanged),
            Request::DeleteReference {
                source,
                reference_type_id,
                target,
                is_forward,
            } => self
                .delete_reference_as(session, &source, &reference_type_id, &target, is_forward)
                .map(Response::ReferenceChanged),
        }
    }

    /// Stops and drops every repeated callback. Called once on shutdown.
    pub fn terminate(&self) {
        let count = self.callbacks.len();
        self.callbacks.clear();
        info!(callbacks = count, "server terminated");
    }
}
