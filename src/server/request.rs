use tokio::sync::oneshot;

use crate::AddNodeItem;
use crate::AttributeId;
use crate::BrowseDirection;
use crate::ExpandedNodeId;
use crate::NodeId;
use crate::ReferenceDescription;
use crate::RelativePathElement;
use crate::RequestContext;
use crate::Result;
use crate::Variant;

/// Client request delivered by the protocol engine
#[derive(Debug, Clone)]
pub enum Request {
    Read {
        node_id: NodeId,
        attribute: AttributeId,
    },
    Write {
        node_id: NodeId,
        attribute: AttributeId,
        value: Variant,
    },
    Browse {
        node_id: NodeId,
        direction: BrowseDirection,
        reference_type_id: Option<NodeId>,
        include_subtypes: bool,
    },
    TranslateBrowsePath {
        origin: NodeId,
        path: Vec<RelativePathElement>,
    },
    Call {
        method_id: NodeId,
        object_id: NodeId,
        inputs: Vec<Variant>,
    },
    AddNode(AddNodeItem),
    DeleteNode {
        node_id: NodeId,
        cascade: bool,
    },
    AddReference {
        source: NodeId,
        reference_type_id: NodeId,
        target: ExpandedNodeId,
        is_forward: bool,
    },
    DeleteReference {
        source: NodeId,
        reference_type_id: NodeId,
        target: ExpandedNodeId,
        is_forward: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Value(Variant),
    Written,
    References(Vec<ReferenceDescription>),
    NodeId(NodeId),
    Outputs(Vec<Variant>),
    Deleted,
    /// Whether the reference set changed
    ReferenceChanged(bool),
}

/// A request in flight from the engine to the host loop
#[derive(Debug)]
pub struct InboundRequest {
    pub context: RequestContext,
    pub request: Request,
    pub respond_to: oneshot::Sender<Result<Response>>,
}
