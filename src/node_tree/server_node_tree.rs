use std::collections::BTreeMap;
use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;
use tracing::warn;

use crate::AddressSpaceError;
use crate::Error;
use crate::NodeClass;
use crate::NodeId;
use crate::NodePath;
use crate::QualifiedName;
use crate::Result;
use crate::Server;
use crate::TreeNode;
use crate::VariableAttributes;
use crate::Variant;

/// Builds and reads folder/value subtrees of one namespace below a root node.
pub struct ServerNodeTree {
    server: Arc<Server>,
    root: NodeId,
    namespace: u16,
}

impl ServerNodeTree {
    pub fn new(
        server: Arc<Server>,
        root: NodeId,
        namespace: u16,
    ) -> Self {
        Self {
            server,
            root,
            namespace,
        }
    }

    pub fn server(&self) -> &Arc<Server> {
        &self.server
    }

    pub fn root(&self) -> &NodeId {
        &self.root
    }

    pub fn namespace(&self) -> u16 {
        self.namespace
    }

    fn name(
        &self,
        segment: &str,
    ) -> QualifiedName {
        QualifiedName::new(self.namespace, segment)
    }

    /// Resolves `path` below `start`, creating each missing segment as a
    /// folder. Calling it again with the same path returns the same leaf and
    /// adds nothing.
    pub fn create_folder_path(
        &self,
        start: &NodeId,
        path: &NodePath,
    ) -> Result<NodeId> {
        let leaf = path.segments().iter().try_fold(start.clone(), |current, segment| {
            self.server.get_or_create_folder(&current, self.name(segment))
        })?;
        debug!(%start, %path, %leaf, "folder path resolved");
        Ok(leaf)
    }

    pub fn add_folder_node(
        &self,
        parent: &NodeId,
        name: &str,
    ) -> Result<NodeId> {
        self.server
            .add_folder(parent, self.name(name), NodeId::auto(self.namespace))
    }

    /// Adds a writable variable typed after `value`.
    pub fn add_value_node(
        &self,
        parent: &NodeId,
        name: &str,
        value: impl Into<Variant>,
    ) -> Result<NodeId> {
        self.server.add_variable(
            parent,
            self.name(name),
            NodeId::auto(self.namespace),
            VariableAttributes::new(value),
        )
    }

    pub fn get_value(
        &self,
        node_id: &NodeId,
    ) -> Result<Variant> {
        self.server.read_value(node_id)
    }

    pub fn set_value(
        &self,
        node_id: &NodeId,
        value: impl Into<Variant>,
    ) -> Result<()> {
        self.server.write_value(node_id, value)
    }

    /// Writes `value` to the variable `name` under `path` (relative to the
    /// root), creating the folders and the variable as needed.
    pub fn set_node_value(
        &self,
        path: &NodePath,
        name: &str,
        value: impl Into<Variant>,
    ) -> Result<NodeId> {
        let folder = self.create_folder_path(&self.root, path)?;
        match self.get_child(&folder, name) {
            Ok(existing) => {
                self.set_value(&existing, value)?;
                Ok(existing)
            }
            Err(Error::AddressSpace(AddressSpaceError::NoMatch { .. })) => self.add_value_node(&folder, name, value),
            Err(e) => Err(e),
        }
    }

    /// Value of the variable `name` under `path`, relative to the root
    pub fn get_node_value(
        &self,
        path: &NodePath,
        name: &str,
    ) -> Result<Variant> {
        let node_id = self.node_id_from_path(&self.root, &path.join(name))?;
        self.get_value(&node_id)
    }

    pub fn get_child(
        &self,
        parent: &NodeId,
        name: &str,
    ) -> Result<NodeId> {
        self.server.find_child(parent, self.name(name))
    }

    /// Resolves an existing path; fails on the first segment that is missing
    /// or ambiguous.
    pub fn node_id_from_path(
        &self,
        start: &NodeId,
        path: &NodePath,
    ) -> Result<NodeId> {
        let names: Vec<QualifiedName> = path.segments().iter().map(|s| self.name(s)).collect();
        self.server.browse_simplified_browse_path(start, &names)
    }

    /// Direct hierarchical children of `parent` keyed by browse name
    pub fn browse_children(
        &self,
        parent: &NodeId,
    ) -> Result<BTreeMap<String, NodeId>> {
        let mut children = BTreeMap::new();
        for child in self.server.children(parent)? {
            let name = self.server.read_browse_name(&child)?.name;
            children.entry(name).or_insert(child);
        }
        Ok(children)
    }

    /// Materialises the subtree below `start`. Each node appears once even
    /// when references form a cycle; with `with_values` Variable nodes carry
    /// their current value.
    pub fn browse_tree(
        &self,
        start: &NodeId,
        with_values: bool,
    ) -> Result<TreeNode> {
        let mut visited = HashSet::new();
        self.browse_node(start, with_values, &mut visited)
    }

    fn browse_node(
        &self,
        node_id: &NodeId,
        with_values: bool,
        visited: &mut HashSet<NodeId>,
    ) -> Result<TreeNode> {
        visited.insert(node_id.clone());
        let name = self.server.read_browse_name(node_id)?.name;
        let node_class = self.server.read_node_class(node_id)?;
        let mut node = TreeNode::new(name, node_id.clone(), node_class);
        if with_values && node_class == NodeClass::Variable {
            node.value = Some(self.server.read_value(node_id)?);
        }

        for child in self.server.children(node_id)? {
            if visited.contains(&child) {
                continue;
            }
            let subtree = self.browse_node(&child, with_values, visited)?;
            if node.children.contains_key(&subtree.name) {
                warn!(parent = %node_id, name = %subtree.name, "duplicate browse name in tree, keeping first");
                continue;
            }
            node.children.insert(subtree.name.clone(), subtree);
        }
        Ok(node)
    }

    /// Dotted path below `start` mapped to node id
    pub fn browse_tree_map(
        &self,
        start: &NodeId,
    ) -> Result<BTreeMap<String, NodeId>> {
        Ok(self.browse_tree(start, false)?.flatten())
    }

    /// Deletes `start` and everything hierarchically below it, leaves first.
    /// Returns the number of nodes removed.
    pub fn delete_tree(
        &self,
        start: &NodeId,
    ) -> Result<usize> {
        let nodes = self.server.hierarchical_descendants(start)?;
        let mut removed = 0;
        for node_id in nodes.iter().rev() {
            match self.server.delete_node(node_id, true) {
                Ok(()) => removed += 1,
                Err(Error::AddressSpace(AddressSpaceError::NodeNotFound(_))) => {}
                Err(e) => return Err(e),
            }
        }
        debug!(%start, removed, "tree deleted");
        Ok(removed)
    }
}
