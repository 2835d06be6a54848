//! The address space graph.
//!
//! [`AddressSpace`] owns every node and keeps local references mirrored: a
//! forward reference stored on its source always has an inverse twin stored
//! on its target. It carries no lock and invokes no hooks; the server wraps it
//! in a readers-writer lock and layers access control and node contexts on
//! top.

use std::collections::HashMap;
use std::collections::HashSet;

use tracing::debug;
use tracing::trace;

use super::bootstrap;
use crate::ids;
use crate::AddressSpaceError;
use crate::BrowseDirection;
use crate::ContextHandle;
use crate::ExpandedNodeId;
use crate::LocalizedText;
use crate::Node;
use crate::NodeAttributes;
use crate::NodeClass;
use crate::NodeId;
use crate::QualifiedName;
use crate::Reference;
use crate::ReferenceDescription;
use crate::RelativePathElement;

type Result<T> = std::result::Result<T, AddressSpaceError>;

/// Everything needed to insert one node below an existing parent.
#[derive(Debug, Clone)]
pub struct AddNodeItem {
    /// Null or numeric 0 requests an auto-assigned id
    pub requested_id: NodeId,
    pub parent_id: NodeId,
    /// Reference from parent to the new node; `None` picks the class default
    pub reference_type_id: Option<NodeId>,
    pub browse_name: QualifiedName,
    pub display_name: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub attributes: NodeAttributes,
    /// `None` picks the class default (BaseObjectType, BaseDataVariableType)
    pub type_definition: Option<NodeId>,
    pub context: Option<ContextHandle>,
}

impl AddNodeItem {
    pub fn new(
        parent_id: NodeId,
        browse_name: impl Into<QualifiedName>,
        attributes: impl Into<NodeAttributes>,
    ) -> Self {
        Self {
            requested_id: NodeId::null(),
            parent_id,
            reference_type_id: None,
            browse_name: browse_name.into(),
            display_name: None,
            description: None,
            attributes: attributes.into(),
            type_definition: None,
            context: None,
        }
    }

    pub fn with_requested_id(
        mut self,
        requested_id: NodeId,
    ) -> Self {
        self.requested_id = requested_id;
        self
    }

    pub fn with_reference_type(
        mut self,
        reference_type_id: NodeId,
    ) -> Self {
        self.reference_type_id = Some(reference_type_id);
        self
    }

    pub fn with_type_definition(
        mut self,
        type_definition: NodeId,
    ) -> Self {
        self.type_definition = Some(type_definition);
        self
    }

    pub fn with_display_name(
        mut self,
        display_name: impl Into<LocalizedText>,
    ) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_description(
        mut self,
        description: impl Into<LocalizedText>,
    ) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_context(
        mut self,
        context: ContextHandle,
    ) -> Self {
        self.context = Some(context);
        self
    }
}

#[derive(Debug)]
pub struct AddressSpace {
    nodes: HashMap<NodeId, Node>,
    namespaces: Vec<String>,
    next_ids: HashMap<u16, u32>,
    first_auto_id: u32,
    /// 0 = unlimited
    max_nodes: usize,
    /// Ids removed without cascade; other nodes may still name them
    detached: HashSet<NodeId>,
}

impl AddressSpace {
    /// Creates a store holding the namespace 0 nodes, with `application_uri`
    /// registered as namespace 1.
    pub fn new(
        application_uri: &str,
        first_auto_id: u32,
        max_nodes: usize,
    ) -> Self {
        let mut space = Self {
            nodes: HashMap::new(),
            namespaces: vec![ids::NAMESPACE_0_URI.to_string(), application_uri.to_string()],
            next_ids: HashMap::new(),
            first_auto_id,
            max_nodes,
            detached: HashSet::new(),
        };
        bootstrap::populate(&mut space);
        debug!("address space bootstrapped with {} nodes", space.nodes.len());
        space
    }

    // ---------------------------------------------------------------
    // Namespaces

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn namespace_index(
        &self,
        uri: &str,
    ) -> Option<u16> {
        self.namespaces.iter().position(|n| n == uri).map(|i| i as u16)
    }

    /// Registers `uri`, returning the existing index when already known.
    pub fn add_namespace(
        &mut self,
        uri: &str,
    ) -> u16 {
        if let Some(index) = self.namespace_index(uri) {
            return index;
        }
        self.namespaces.push(uri.to_string());
        (self.namespaces.len() - 1) as u16
    }

    // ---------------------------------------------------------------
    // Lookup

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(
        &self,
        node_id: &NodeId,
    ) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn node(
        &self,
        node_id: &NodeId,
    ) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn find(
        &self,
        node_id: &NodeId,
    ) -> Result<&Node> {
        self.nodes
            .get(node_id)
            .ok_or_else(|| AddressSpaceError::NodeNotFound(node_id.clone()))
    }

    pub fn find_mut(
        &mut self,
        node_id: &NodeId,
    ) -> Result<&mut Node> {
        self.nodes
            .get_mut(node_id)
            .ok_or_else(|| AddressSpaceError::NodeNotFound(node_id.clone()))
    }

    // ---------------------------------------------------------------
    // Structural mutation

    /// Picks the id a new node will get. A requested id with a numeric 0
    /// identifier asks for a fresh numeric id in its namespace; namespace 0
    /// requests are moved to the browse name's namespace.
    pub fn assign_node_id(
        &mut self,
        requested: &NodeId,
        browse_name: &QualifiedName,
    ) -> Result<NodeId> {
        if !requested.needs_assignment() {
            if self.contains(requested) {
                return Err(AddressSpaceError::IdentifierCollision(requested.clone()));
            }
            return Ok(requested.clone());
        }

        let namespace = if requested.namespace == 0 {
            browse_name.namespace
        } else {
            requested.namespace
        };
        let next = self.next_ids.entry(namespace).or_insert(self.first_auto_id);
        loop {
            let candidate = NodeId::numeric(namespace, *next);
            *next = next.wrapping_add(1).max(1);
            if !self.nodes.contains_key(&candidate) {
                return Ok(candidate);
            }
        }
    }

    /// Validates and inserts a node below its parent.
    ///
    /// Adds the parent reference and, for objects and variables, a
    /// HasTypeDefinition reference, both mirrored.
    pub fn add_node(
        &mut self,
        item: AddNodeItem,
    ) -> Result<NodeId> {
        if self.max_nodes > 0 && self.nodes.len() >= self.max_nodes {
            return Err(AddressSpaceError::CapacityExceeded {
                max_nodes: self.max_nodes,
            });
        }
        if !self.contains(&item.parent_id) {
            return Err(AddressSpaceError::ParentNotFound(item.parent_id));
        }

        let reference_type_id = item
            .reference_type_id
            .unwrap_or_else(|| item.attributes.default_reference_type());
        self.check_reference_type(&reference_type_id)?;

        let type_definition = match item.attributes.node_class() {
            NodeClass::Object | NodeClass::Variable => {
                let type_definition = item
                    .type_definition
                    .clone()
                    .unwrap_or_else(|| item.attributes.default_type_definition());
                let expected = match item.attributes.node_class() {
                    NodeClass::Object => NodeClass::ObjectType,
                    _ => NodeClass::VariableType,
                };
                match self.node(&type_definition) {
                    Some(node) if node.node_class() == expected => Some(type_definition),
                    Some(_) => {
                        return Err(AddressSpaceError::InvalidNodeClass {
                            node_id: type_definition,
                            reason: "type definition has the wrong node class",
                        })
                    }
                    None => return Err(AddressSpaceError::NodeNotFound(type_definition)),
                }
            }
            _ => None,
        };

        let node_id = self.assign_node_id(&item.requested_id, &item.browse_name)?;

        if self
            .find_children(&item.parent_id, &reference_type_id, false, &item.browse_name)
            .next()
            .is_some()
        {
            return Err(AddressSpaceError::BrowseNameDuplicated {
                parent: item.parent_id,
                browse_name: item.browse_name,
            });
        }

        let mut node = Node::new(node_id.clone(), item.browse_name, item.attributes);
        if let Some(display_name) = item.display_name {
            node.display_name = display_name;
        }
        if let Some(description) = item.description {
            node.description = description;
        }
        node.context = item.context;
        if self.detached.remove(&node_id) {
            self.drop_references_to(&node_id);
        }
        self.insert(node);

        self.link(&item.parent_id, &reference_type_id, &node_id);
        if let Some(type_definition) = type_definition {
            self.link(&node_id, &ids::HAS_TYPE_DEFINITION, &type_definition);
        }

        debug!(%node_id, parent = %item.parent_id, "node added");
        Ok(node_id)
    }

    /// Removes a node. With `cascade` the mirrored twins of its references
    /// are removed from the other endpoints as well; without it they stay
    /// until the id is reused.
    pub fn remove_node(
        &mut self,
        node_id: &NodeId,
        cascade: bool,
    ) -> Result<Node> {
        let node = self
            .nodes
            .remove(node_id)
            .ok_or_else(|| AddressSpaceError::NodeNotFound(node_id.clone()))?;

        if cascade {
            for reference in &node.references {
                let Some(target) = reference.local_target() else {
                    continue;
                };
                if let Some(other) = self.nodes.get_mut(target) {
                    other
                        .references
                        .retain(|r| !(r.target.is_local() && &r.target.node_id == node_id));
                }
            }
        } else {
            self.detached.insert(node_id.clone());
        }

        debug!(%node_id, cascade, "node removed");
        Ok(node)
    }

    /// Fails with `BrowseNameDuplicated` when a sibling attached to any
    /// hierarchical parent of `node_id` by the same reference type is
    /// already named `browse_name`.
    pub fn check_browse_name(
        &self,
        node_id: &NodeId,
        browse_name: &QualifiedName,
    ) -> Result<()> {
        let node = self.find(node_id)?;
        let parents = node
            .references
            .iter()
            .filter(|r| !r.is_forward && self.is_hierarchical(&r.reference_type_id));
        for reference in parents {
            let Some(parent) = reference.local_target() else {
                continue;
            };
            if self
                .find_children(parent, &reference.reference_type_id, false, browse_name)
                .any(|sibling| &sibling != node_id)
            {
                return Err(AddressSpaceError::BrowseNameDuplicated {
                    parent: parent.clone(),
                    browse_name: browse_name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Adds a reference and its mirrored twin. Returns `false` when the
    /// reference already existed.
    pub fn add_reference(
        &mut self,
        source: &NodeId,
        reference_type_id: &NodeId,
        target: &ExpandedNodeId,
        is_forward: bool,
    ) -> Result<bool> {
        self.find(source)?;
        self.check_reference_type(reference_type_id)?;
        if target.is_local() {
            self.find(&target.node_id)?;
        }

        let reference = Reference {
            reference_type_id: reference_type_id.clone(),
            target: target.clone(),
            is_forward,
        };
        let node = self.find_mut(source)?;
        if node.has_reference(&reference) {
            trace!(%source, %target, "reference already present");
            return Ok(false);
        }
        node.references.push(reference);

        if target.is_local() {
            let twin = Reference {
                reference_type_id: reference_type_id.clone(),
                target: source.clone().into(),
                is_forward: !is_forward,
            };
            let other = self.find_mut(&target.node_id)?;
            if !other.has_reference(&twin) {
                other.references.push(twin);
            }
        }
        debug!(%source, %reference_type_id, %target, is_forward, "reference added");
        Ok(true)
    }

    /// Removes a reference and its mirrored twin. Returns whether the
    /// reference was present.
    pub fn delete_reference(
        &mut self,
        source: &NodeId,
        reference_type_id: &NodeId,
        target: &ExpandedNodeId,
        is_forward: bool,
    ) -> Result<bool> {
        self.find(source)?;
        if target.is_local() {
            self.find(&target.node_id)?;
        }

        let node = self.find_mut(source)?;
        let before = node.references.len();
        node.references
            .retain(|r| !(&r.reference_type_id == reference_type_id && &r.target == target && r.is_forward == is_forward));
        let removed = node.references.len() != before;

        if target.is_local() {
            let other = self.find_mut(&target.node_id)?;
            other.references.retain(|r| {
                !(&r.reference_type_id == reference_type_id
                    && r.target.is_local()
                    && &r.target.node_id == source
                    && r.is_forward != is_forward)
            });
        }
        if removed {
            debug!(%source, %reference_type_id, %target, is_forward, "reference deleted");
        }
        Ok(removed)
    }

    // ---------------------------------------------------------------
    // Type hierarchy

    /// True when `sub` equals `sup` or reaches it through inverse HasSubtype.
    pub fn is_subtype_of(
        &self,
        sub: &NodeId,
        sup: &NodeId,
    ) -> bool {
        let mut visited = HashSet::new();
        let mut current = vec![sub.clone()];
        while let Some(id) = current.pop() {
            if &id == sup {
                return true;
            }
            if !visited.insert(id.clone()) {
                continue;
            }
            if let Some(node) = self.nodes.get(&id) {
                current.extend(
                    node.references
                        .iter()
                        .filter(|r| !r.is_forward && r.reference_type_id == ids::HAS_SUBTYPE)
                        .filter_map(|r| r.local_target().cloned()),
                );
            }
        }
        false
    }

    pub fn is_hierarchical(
        &self,
        reference_type_id: &NodeId,
    ) -> bool {
        self.is_subtype_of(reference_type_id, &ids::HIERARCHICAL_REFERENCES)
    }

    fn check_reference_type(
        &self,
        reference_type_id: &NodeId,
    ) -> Result<()> {
        match self.node(reference_type_id) {
            Some(node) if node.node_class() == NodeClass::ReferenceType => Ok(()),
            _ => Err(AddressSpaceError::InvalidReferenceType(reference_type_id.clone())),
        }
    }

    fn reference_matches(
        &self,
        reference: &Reference,
        filter: &NodeId,
        include_subtypes: bool,
    ) -> bool {
        &reference.reference_type_id == filter
            || (include_subtypes && self.is_subtype_of(&reference.reference_type_id, filter))
    }

    // ---------------------------------------------------------------
    // Browsing

    /// References of `node_id` in `direction`, optionally filtered by a
    /// reference type (and its subtypes).
    pub fn browse(
        &self,
        node_id: &NodeId,
        direction: BrowseDirection,
        reference_filter: Option<(&NodeId, bool)>,
    ) -> Result<Vec<ReferenceDescription>> {
        let node = self.find(node_id)?;
        let rows = node
            .references
            .iter()
            .filter(|r| direction.matches(r.is_forward))
            .filter(|r| {
                reference_filter
                    .map(|(filter, include_subtypes)| self.reference_matches(r, filter, include_subtypes))
                    .unwrap_or(true)
            })
            .map(|r| {
                let target = r.local_target().and_then(|id| self.nodes.get(id));
                ReferenceDescription {
                    reference_type_id: r.reference_type_id.clone(),
                    is_forward: r.is_forward,
                    node_id: r.target.clone(),
                    browse_name: target.map(|n| n.browse_name.clone()).unwrap_or_default(),
                    display_name: target.map(|n| n.display_name.clone()).unwrap_or_default(),
                    node_class: target.map(Node::node_class),
                }
            })
            .collect();
        Ok(rows)
    }

    /// Local targets of the forward hierarchical references of `parent`
    pub fn children(
        &self,
        parent: &NodeId,
    ) -> Result<Vec<NodeId>> {
        let node = self.find(parent)?;
        let mut seen = HashSet::new();
        Ok(node
            .references
            .iter()
            .filter(|r| r.is_forward && self.is_hierarchical(&r.reference_type_id))
            .filter_map(|r| r.local_target())
            .filter(|id| self.nodes.contains_key(*id) && seen.insert((*id).clone()))
            .cloned()
            .collect())
    }

    /// Forward children of `parent` named `browse_name` reached through
    /// `reference_type_id` (or a subtype of it when `include_subtypes`).
    pub fn find_children<'a>(
        &'a self,
        parent: &'a NodeId,
        reference_type_id: &'a NodeId,
        include_subtypes: bool,
        browse_name: &'a QualifiedName,
    ) -> impl Iterator<Item = NodeId> + 'a {
        let references = self.nodes.get(parent).map(|n| n.references.as_slice()).unwrap_or(&[]);
        let mut seen = HashSet::new();
        references
            .iter()
            .filter(move |r| r.is_forward && self.reference_matches(r, reference_type_id, include_subtypes))
            .filter_map(|r| r.local_target())
            .filter(move |id| {
                self.nodes
                    .get(*id)
                    .map(|n| &n.browse_name == browse_name)
                    .unwrap_or(false)
            })
            .filter(move |id| seen.insert((*id).clone()))
            .cloned()
    }

    /// Resolves one relative path hop. Zero candidates is `NoMatch`, more
    /// than one is `Ambiguous`.
    pub fn resolve_element(
        &self,
        parent: &NodeId,
        element: &RelativePathElement,
    ) -> Result<NodeId> {
        if !self.is_hierarchical(&element.reference_type_id) {
            return Err(AddressSpaceError::InvalidReferenceType(element.reference_type_id.clone()));
        }
        let mut candidates = self.find_children(
            parent,
            &element.reference_type_id,
            element.include_subtypes,
            &element.target_name,
        );
        match (candidates.next(), candidates.count()) {
            (None, _) => Err(AddressSpaceError::NoMatch {
                segment: element.target_name.clone(),
            }),
            (Some(id), 0) => Ok(id),
            (Some(_), rest) => Err(AddressSpaceError::Ambiguous {
                segment: element.target_name.clone(),
                candidates: rest + 1,
            }),
        }
    }

    pub fn translate_browse_path(
        &self,
        origin: &NodeId,
        path: &[RelativePathElement],
    ) -> Result<NodeId> {
        self.find(origin)?;
        path.iter()
            .try_fold(origin.clone(), |current, element| self.resolve_element(&current, element))
    }

    /// `start` followed by every node reachable through forward hierarchical
    /// references, each listed once even when the graph has cycles.
    pub fn hierarchical_descendants(
        &self,
        start: &NodeId,
    ) -> Result<Vec<NodeId>> {
        self.find(start)?;
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![start.clone()];
        while let Some(id) = stack.pop() {
            if !visited.insert(id.clone()) {
                continue;
            }
            if let Ok(children) = self.children(&id) {
                stack.extend(children.into_iter().rev());
            }
            order.push(id);
        }
        Ok(order)
    }

    // ---------------------------------------------------------------
    // Raw helpers used while bootstrapping

    pub(crate) fn insert(
        &mut self,
        node: Node,
    ) {
        self.nodes.insert(node.node_id.clone(), node);
    }

    fn drop_references_to(
        &mut self,
        node_id: &NodeId,
    ) {
        for node in self.nodes.values_mut() {
            node.references
                .retain(|r| !(r.target.is_local() && &r.target.node_id == node_id));
        }
        trace!(%node_id, "stale references dropped");
    }

    /// Adds a local forward reference and its inverse twin without checks.
    pub(crate) fn link(
        &mut self,
        source: &NodeId,
        reference_type_id: &NodeId,
        target: &NodeId,
    ) {
        if let Some(node) = self.nodes.get_mut(source) {
            node.references
                .push(Reference::forward(reference_type_id.clone(), target.clone()));
        }
        if let Some(node) = self.nodes.get_mut(target) {
            node.references
                .push(Reference::inverse(reference_type_id.clone(), source.clone()));
        }
    }
}
