//! Node identity.
//!
//! A [`NodeId`] is a namespace index plus an [`Identifier`]. Equality covers
//! both parts, including the identifier kind: `ns=1;i=5` and `ns=1;s=5` are
//! different nodes.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::ValueError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Identifier {
    Numeric(u32),
    String(String),
    Guid(Uuid),
    ByteString(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub namespace: u16,
    pub identifier: Identifier,
}

impl NodeId {
    pub const fn numeric(
        namespace: u16,
        value: u32,
    ) -> Self {
        Self {
            namespace,
            identifier: Identifier::Numeric(value),
        }
    }

    pub fn string(
        namespace: u16,
        value: impl Into<String>,
    ) -> Self {
        Self {
            namespace,
            identifier: Identifier::String(value.into()),
        }
    }

    pub const fn guid(
        namespace: u16,
        value: Uuid,
    ) -> Self {
        Self {
            namespace,
            identifier: Identifier::Guid(value),
        }
    }

    /// Fresh random guid identifier in `namespace`
    pub fn new_guid(namespace: u16) -> Self {
        Self::guid(namespace, Uuid::new_v4())
    }

    pub fn byte_string(
        namespace: u16,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            namespace,
            identifier: Identifier::ByteString(value.into()),
        }
    }

    /// The null id, `ns=0;i=0`.
    pub const fn null() -> Self {
        Self::numeric(0, 0)
    }

    /// Requests a server assigned numeric id in `namespace`.
    pub const fn auto(namespace: u16) -> Self {
        Self::numeric(namespace, 0)
    }

    pub fn is_null(&self) -> bool {
        self.namespace == 0 && self.needs_assignment()
    }

    /// True when the identifier is numeric zero, which asks the store to pick
    /// a fresh id in this namespace.
    pub fn needs_assignment(&self) -> bool {
        matches!(self.identifier, Identifier::Numeric(0))
    }

    pub fn namespace(&self) -> u16 {
        self.namespace
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn as_numeric(&self) -> Option<u32> {
        match self.identifier {
            Identifier::Numeric(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.identifier {
            Identifier::String(s) => Some(s),
            _ => None,
        }
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Display for Identifier {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Identifier::Numeric(v) => write!(f, "i={v}"),
            Identifier::String(s) => write!(f, "s={s}"),
            Identifier::Guid(g) => write!(f, "g={}", g.hyphenated()),
            Identifier::ByteString(b) => {
                f.write_str("b=")?;
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.namespace != 0 {
            write!(f, "ns={};", self.namespace)?;
        }
        write!(f, "{}", self.identifier)
    }
}

impl FromStr for NodeId {
    type Err = ValueError;

    /// Parses the `ns=<index>;<kind>=<value>` text form, `ns=` being optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValueError::Parse {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let (namespace, rest) = match s.strip_prefix("ns=") {
            Some(tail) => {
                let (ns, rest) = tail.split_once(';').ok_or_else(|| invalid("missing ';'"))?;
                let ns = ns.parse::<u16>().map_err(|_| invalid("bad namespace index"))?;
                (ns, rest)
            }
            None => (0, s),
        };

        let (kind, value) = rest.split_once('=').ok_or_else(|| invalid("missing identifier kind"))?;
        let identifier = match kind {
            "i" => Identifier::Numeric(value.parse().map_err(|_| invalid("bad numeric identifier"))?),
            "s" => Identifier::String(value.to_string()),
            "g" => Identifier::Guid(Uuid::parse_str(value).map_err(|_| invalid("bad guid"))?),
            "b" => Identifier::ByteString(decode_hex(value).ok_or_else(|| invalid("bad hex byte string"))?),
            _ => return Err(invalid("unknown identifier kind")),
        };

        Ok(NodeId { namespace, identifier })
    }
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
        .collect()
}

/// A node id that may live in another server or be qualified by namespace URI
/// rather than index. Only local ids (server index 0, no URI) are resolvable
/// against this store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedNodeId {
    pub node_id: NodeId,
    pub namespace_uri: Option<String>,
    pub server_index: u32,
}

impl ExpandedNodeId {
    pub fn is_local(&self) -> bool {
        self.server_index == 0 && self.namespace_uri.is_none()
    }
}

impl From<NodeId> for ExpandedNodeId {
    fn from(node_id: NodeId) -> Self {
        Self {
            node_id,
            namespace_uri: None,
            server_index: 0,
        }
    }
}

impl fmt::Display for ExpandedNodeId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.server_index != 0 {
            write!(f, "svr={};", self.server_index)?;
        }
        if let Some(uri) = &self.namespace_uri {
            write!(f, "nsu={uri};{}", self.node_id.identifier)
        } else {
            write!(f, "{}", self.node_id)
        }
    }
}
