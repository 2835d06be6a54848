use crate::ExpandedNodeId;
use crate::LocalizedText;
use crate::NodeClass;
use crate::NodeId;
use crate::QualifiedName;

/// Directed, typed edge stored on its source node.
///
/// Local references are mirrored: a forward reference `A -> B` on `A` has an
/// inverse twin `B <- A` stored on `B`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub reference_type_id: NodeId,
    pub target: ExpandedNodeId,
    pub is_forward: bool,
}

impl Reference {
    pub fn forward(
        reference_type_id: NodeId,
        target: impl Into<ExpandedNodeId>,
    ) -> Self {
        Self {
            reference_type_id,
            target: target.into(),
            is_forward: true,
        }
    }

    pub fn inverse(
        reference_type_id: NodeId,
        target: impl Into<ExpandedNodeId>,
    ) -> Self {
        Self {
            reference_type_id,
            target: target.into(),
            is_forward: false,
        }
    }

    /// Local target id, if the target lives in this store
    pub fn local_target(&self) -> Option<&NodeId> {
        self.target.is_local().then_some(&self.target.node_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowseDirection {
    #[default]
    Forward,
    Inverse,
    Both,
}

impl BrowseDirection {
    pub fn matches(
        self,
        is_forward: bool,
    ) -> bool {
        match self {
            BrowseDirection::Forward => is_forward,
            BrowseDirection::Inverse => !is_forward,
            BrowseDirection::Both => true,
        }
    }
}

/// One result row of a browse
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceDescription {
    pub reference_type_id: NodeId,
    pub is_forward: bool,
    pub node_id: ExpandedNodeId,
    pub browse_name: QualifiedName,
    pub display_name: LocalizedText,
    /// `None` when the target is not in this store
    pub node_class: Option<NodeClass>,
}

/// One hop of a relative browse path: follow forward references of
/// `reference_type_id` (and its subtypes when `include_subtypes`) to a child
/// named `target_name`.
#[derive(Debug, Clone, PartialEq)]
pub struct RelativePathElement {
    pub reference_type_id: NodeId,
    pub include_subtypes: bool,
    pub target_name: QualifiedName,
}

impl RelativePathElement {
    /// Any forward hierarchical reference to `target_name`
    pub fn hierarchical(target_name: impl Into<QualifiedName>) -> Self {
        Self {
            reference_type_id: crate::ids::HIERARCHICAL_REFERENCES,
            include_subtypes: true,
            target_name: target_name.into(),
        }
    }
}
