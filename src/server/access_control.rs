use std::fmt;

#[cfg(test)]
use mockall::automock;
use tracing::trace;

use crate::AccessConfig;
use crate::NodeId;

/// Operation kinds an [`AccessPolicy`] decides on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AddNode,
    DeleteNode,
    ReadAttribute,
    WriteAttribute,
    AddReference,
    DeleteReference,
    Browse,
    Call,
}

impl fmt::Display for Operation {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Who is asking. Calls made directly on the server are `Local`; requests
/// routed by the protocol engine carry the remote session id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Session {
    Local,
    Remote(NodeId),
}

impl Session {
    pub fn is_local(&self) -> bool {
        matches!(self, Session::Local)
    }
}

/// Pluggable access control, consulted before every add, delete, attribute
/// access, reference change, browse and call.
#[cfg_attr(test, automock)]
pub trait AccessPolicy: Send + Sync {
    fn allow(
        &self,
        operation: Operation,
        session: &Session,
        node_id: &NodeId,
    ) -> bool;
}

/// Allows everything for local callers. Remote sessions may read, browse,
/// call and edit references; adding nodes and writing attributes follow the
/// access configuration, deleting nodes is refused unless enabled.
#[derive(Debug, Clone)]
pub struct DefaultAccessPolicy {
    allow_remote_delete: bool,
    allow_remote_add: bool,
    allow_remote_write: bool,
}

impl DefaultAccessPolicy {
    pub fn new(config: &AccessConfig) -> Self {
        Self {
            allow_remote_delete: config.allow_remote_delete,
            allow_remote_add: config.allow_remote_add,
            allow_remote_write: config.allow_remote_write,
        }
    }
}

impl Default for DefaultAccessPolicy {
    fn default() -> Self {
        Self::new(&AccessConfig::default())
    }
}

impl AccessPolicy for DefaultAccessPolicy {
    fn allow(
        &self,
        operation: Operation,
        session: &Session,
        node_id: &NodeId,
    ) -> bool {
        if session.is_local() {
            return true;
        }
        let allowed = match operation {
            Operation::DeleteNode => self.allow_remote_delete,
            Operation::AddNode => self.allow_remote_add,
            Operation::WriteAttribute => self.allow_remote_write,
            Operation::ReadAttribute
            | Operation::AddReference
            | Operation::DeleteReference
            | Operation::Browse
            | Operation::Call => true,
        };
        trace!(%operation, ?session, %node_id, allowed, "access decision");
        allowed
    }
}
