use std::collections::BTreeMap;

use crate::NodeClass;
use crate::NodeId;
use crate::NodePath;
use crate::Variant;

/// In-memory snapshot of one node of a browsed subtree. Children are keyed by
/// browse name.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub name: String,
    pub node_id: NodeId,
    pub node_class: NodeClass,
    /// Current value of Variable nodes when the tree was browsed with values
    pub value: Option<Variant>,
    pub children: BTreeMap<String, TreeNode>,
}

impl TreeNode {
    pub fn new(
        name: impl Into<String>,
        node_id: NodeId,
        node_class: NodeClass,
    ) -> Self {
        Self {
            name: name.into(),
            node_id,
            node_class,
            value: None,
            children: BTreeMap::new(),
        }
    }

    pub fn child(
        &self,
        name: &str,
    ) -> Option<&TreeNode> {
        self.children.get(name)
    }

    /// Follows `path` downwards from this node.
    pub fn find(
        &self,
        path: &NodePath,
    ) -> Option<&TreeNode> {
        path.segments()
            .iter()
            .try_fold(self, |node, segment| node.child(segment))
    }

    /// Number of nodes in the subtree, this one included
    pub fn len(&self) -> usize {
        1 + self.children.values().map(TreeNode::len).sum::<usize>()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Dotted path below this node mapped to node id, for every descendant.
    pub fn flatten(&self) -> BTreeMap<String, NodeId> {
        let mut map = BTreeMap::new();
        self.flatten_into(&NodePath::new(), &mut map);
        map
    }

    fn flatten_into(
        &self,
        prefix: &NodePath,
        map: &mut BTreeMap<String, NodeId>,
    ) {
        for (name, child) in &self.children {
            let path = prefix.join(name.as_str());
            map.insert(path.to_string(), child.node_id.clone());
            child.flatten_into(&path, map);
        }
    }
}
