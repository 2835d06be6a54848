//! Per-node contexts.
//!
//! A node never owns its context. It stores a [`ContextHandle`] into the
//! server's [`ContextRegistry`], which itself only keeps weak references: the
//! component that registered a context owns it, and once it is dropped the
//! hooks are skipped.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Weak;

use dashmap::DashMap;
#[cfg(test)]
use mockall::automock;
use tracing::debug;

use crate::NodeId;
use crate::Result;
use crate::Server;
use crate::ServerMethod;
use crate::Variant;

/// Lifecycle and value notifications for the node a context is attached to.
///
/// Hooks run with no store lock held and may call back into the server.
/// Returning an error fails the operation that triggered the hook.
#[cfg_attr(test, automock)]
pub trait NodeContext: Send + Sync {
    /// Called after the node has been inserted. An error removes it again.
    fn construct(
        &self,
        _server: &Server,
        _node_id: &NodeId,
    ) -> Result<()> {
        Ok(())
    }

    /// Called before the node is removed, while it can still be inspected.
    fn destruct(
        &self,
        _server: &Server,
        _node_id: &NodeId,
    ) -> Result<()> {
        Ok(())
    }

    /// Called after a Value read; may replace the value handed to the caller.
    fn read_value(
        &self,
        _server: &Server,
        _node_id: &NodeId,
        _value: &mut Variant,
    ) -> Result<()> {
        Ok(())
    }

    /// Called before a Value write is committed. An error aborts the write.
    fn write_value(
        &self,
        _server: &Server,
        _node_id: &NodeId,
        _value: &Variant,
    ) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextHandle(u64);

impl ContextHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

enum ContextEntry {
    Node(Weak<dyn NodeContext>),
    Method(Weak<dyn ServerMethod>),
}

struct Registration {
    name: String,
    entry: ContextEntry,
}

/// Name-indexed table of weakly held node contexts and method handlers.
#[derive(Default)]
pub struct ContextRegistry {
    entries: DashMap<ContextHandle, Registration>,
    next_handle: AtomicU64,
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> ContextHandle {
        ContextHandle(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Registers a node context without taking ownership of it.
    pub fn register(
        &self,
        name: impl Into<String>,
        context: Arc<dyn NodeContext>,
    ) -> ContextHandle {
        let handle = self.next();
        let name = name.into();
        debug!(?handle, %name, "node context registered");
        self.entries.insert(
            handle,
            Registration {
                name,
                entry: ContextEntry::Node(Arc::downgrade(&context)),
            },
        );
        handle
    }

    /// Registers a method handler under its own name.
    pub fn register_method(
        &self,
        method: Arc<dyn ServerMethod>,
    ) -> ContextHandle {
        let handle = self.next();
        debug!(?handle, name = method.name(), "method handler registered");
        self.entries.insert(
            handle,
            Registration {
                name: method.name().to_string(),
                entry: ContextEntry::Method(Arc::downgrade(&method)),
            },
        );
        handle
    }

    /// The live node context behind `handle`, if its owner still holds it
    pub fn node_context(
        &self,
        handle: ContextHandle,
    ) -> Option<Arc<dyn NodeContext>> {
        match &self.entries.get(&handle)?.entry {
            ContextEntry::Node(weak) => weak.upgrade(),
            ContextEntry::Method(_) => None,
        }
    }

    pub fn method(
        &self,
        handle: ContextHandle,
    ) -> Option<Arc<dyn ServerMethod>> {
        match &self.entries.get(&handle)?.entry {
            ContextEntry::Method(weak) => weak.upgrade(),
            ContextEntry::Node(_) => None,
        }
    }

    pub fn is_method(
        &self,
        handle: ContextHandle,
    ) -> bool {
        self.entries
            .get(&handle)
            .map(|r| matches!(r.entry, ContextEntry::Method(_)))
            .unwrap_or(false)
    }

    pub fn name(
        &self,
        handle: ContextHandle,
    ) -> Option<String> {
        self.entries.get(&handle).map(|r| r.name.clone())
    }

    /// First registration carrying `name`, lowest handle first
    pub fn find_by_name(
        &self,
        name: &str,
    ) -> Option<ContextHandle> {
        self.entries
            .iter()
            .filter(|r| r.value().name == name)
            .map(|r| *r.key())
            .min()
    }

    pub fn unregister(
        &self,
        handle: ContextHandle,
    ) -> bool {
        self.entries.remove(&handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
