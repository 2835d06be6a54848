//! Address Space Runtime Error Hierarchy
//!
//! Every failure an operation can report is recoverable and maps onto a
//! protocol [`StatusCode`] so the engine can answer a client with it. The one
//! exception is [`Error::EngineUnavailable`], which is only produced while
//! constructing a server and means the server must not start.

use config::ConfigError;

use crate::AttributeId;
use crate::NodeId;
use crate::Operation;
use crate::QualifiedName;
use crate::StatusCode;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Node store lookups and mutations
    #[error(transparent)]
    AddressSpace(#[from] AddressSpaceError),

    /// Variant construction and typed access
    #[error(transparent)]
    Value(#[from] ValueError),

    /// Method node invocation
    #[error(transparent)]
    Method(#[from] MethodError),

    /// Repeated callback registration and timers
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// Configuration loading and validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The protocol engine could not be created or configured
    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AddressSpaceError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Parent node {0} not found")]
    ParentNotFound(NodeId),

    #[error("Node id {0} already exists")]
    IdentifierCollision(NodeId),

    #[error("Attribute {attribute:?} does not apply to node {node_id}")]
    AttributeNotApplicable { node_id: NodeId, attribute: AttributeId },

    #[error("{operation} on {node_id} denied")]
    AccessDenied { operation: Operation, node_id: NodeId },

    /// More than one candidate matched a browse path segment
    #[error("Browse path segment {segment} is ambiguous ({candidates} candidates)")]
    Ambiguous { segment: QualifiedName, candidates: usize },

    /// No candidate matched a browse path segment
    #[error("Browse path segment {segment} matched nothing")]
    NoMatch { segment: QualifiedName },

    #[error("Browse name {browse_name} already used below {parent}")]
    BrowseNameDuplicated { parent: NodeId, browse_name: QualifiedName },

    #[error("{0} is not a reference type")]
    InvalidReferenceType(NodeId),

    #[error("Node {node_id} has the wrong node class: {reason}")]
    InvalidNodeClass { node_id: NodeId, reason: &'static str },

    #[error("Address space is full ({max_nodes} nodes)")]
    CapacityExceeded { max_nodes: usize },

    /// A node context hook returned an error
    #[error("Node context callback failed for {node_id}: {reason}")]
    CallbackFailed { node_id: NodeId, reason: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("Type mismatch: expected {expected}, found {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Array elements must all be {expected}, found {found}")]
    NotHomogeneous { expected: &'static str, found: &'static str },

    #[error("Dimensions {dimensions:?} do not cover {len} elements")]
    DimensionMismatch { dimensions: Vec<u32>, len: usize },

    #[error("Cannot parse {input:?}: {reason}")]
    Parse { input: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentDirection {
    Input,
    Output,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MethodError {
    #[error("Method {method_id} expects {expected} {direction:?} arguments, got {actual}")]
    ArgumentCountMismatch {
        method_id: NodeId,
        direction: ArgumentDirection,
        expected: usize,
        actual: usize,
    },

    #[error("Method {0} is not executable")]
    NotExecutable(NodeId),

    /// The node carries no handler, or its handler has been dropped
    #[error("Method {0} has no live handler")]
    HandlerUnavailable(NodeId),

    /// The handler itself reported a failure status
    #[error("Method handler failed with {status}: {message}")]
    Handler { status: StatusCode, message: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchedulerError {
    #[error("No repeated callback named {0:?}")]
    CallbackNotFound(String),

    #[error("Interval {interval_ms}ms is below the minimum of {min_ms}ms")]
    InvalidInterval { interval_ms: u64, min_ms: u64 },

    #[error("Timer registration failed: {0}")]
    TimerRegistration(String),
}

impl Error {
    /// Protocol status reported to a client for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::AddressSpace(e) => e.status_code(),
            Error::Value(e) => e.status_code(),
            Error::Method(e) => e.status_code(),
            Error::Scheduler(SchedulerError::CallbackNotFound(_)) => StatusCode::BAD_NOT_FOUND,
            Error::Scheduler(SchedulerError::InvalidInterval { .. }) => StatusCode::BAD_INVALID_ARGUMENT,
            Error::Scheduler(SchedulerError::TimerRegistration(_)) => StatusCode::BAD_RESOURCE_UNAVAILABLE,
            Error::Config(_) => StatusCode::BAD_CONFIGURATION_ERROR,
            Error::EngineUnavailable(_) => StatusCode::BAD_RESOURCE_UNAVAILABLE,
            Error::Fatal(_) => StatusCode::BAD_INTERNAL_ERROR,
        }
    }
}

impl AddressSpaceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AddressSpaceError::NodeNotFound(_) => StatusCode::BAD_NODE_ID_UNKNOWN,
            AddressSpaceError::ParentNotFound(_) => StatusCode::BAD_PARENT_NODE_ID_INVALID,
            AddressSpaceError::IdentifierCollision(_) => StatusCode::BAD_NODE_ID_EXISTS,
            AddressSpaceError::AttributeNotApplicable { .. } => StatusCode::BAD_ATTRIBUTE_ID_INVALID,
            AddressSpaceError::AccessDenied { .. } => StatusCode::BAD_USER_ACCESS_DENIED,
            AddressSpaceError::Ambiguous { .. } => StatusCode::BAD_TOO_MANY_MATCHES,
            AddressSpaceError::NoMatch { .. } => StatusCode::BAD_NO_MATCH,
            AddressSpaceError::BrowseNameDuplicated { .. } => StatusCode::BAD_BROWSE_NAME_DUPLICATED,
            AddressSpaceError::InvalidReferenceType(_) => StatusCode::BAD_REFERENCE_TYPE_ID_INVALID,
            AddressSpaceError::InvalidNodeClass { .. } => StatusCode::BAD_NODE_CLASS_INVALID,
            AddressSpaceError::CapacityExceeded { .. } => StatusCode::BAD_OUT_OF_MEMORY,
            AddressSpaceError::CallbackFailed { .. } => StatusCode::BAD_INTERNAL_ERROR,
        }
    }
}

impl ValueError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ValueError::Parse { .. } => StatusCode::BAD_NODE_ID_INVALID,
            _ => StatusCode::BAD_TYPE_MISMATCH,
        }
    }
}

impl MethodError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MethodError::ArgumentCountMismatch { expected, actual, .. } if actual < expected => {
                StatusCode::BAD_ARGUMENTS_MISSING
            }
            MethodError::ArgumentCountMismatch { .. } => StatusCode::BAD_TOO_MANY_ARGUMENTS,
            MethodError::NotExecutable(_) => StatusCode::BAD_NOT_EXECUTABLE,
            MethodError::HandlerUnavailable(_) => StatusCode::BAD_METHOD_INVALID,
            MethodError::Handler { status, .. } => *status,
        }
    }
}

impl Error {
    /// Convenience to build a handler failure from inside a method body
    pub fn handler(
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        MethodError::Handler {
            status,
            message: message.into(),
        }
        .into()
    }
}
