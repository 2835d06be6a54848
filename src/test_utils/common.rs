use std::sync::Arc;

use parking_lot::Mutex;

use super::ManualEngine;
use crate::AccessPolicy;
use crate::Error;
use crate::NodeContext;
use crate::NodeId;
use crate::QualifiedName;
use crate::Result;
use crate::Server;
use crate::ServerBuilder;
use crate::ServerConfig;
use crate::StatusCode;
use crate::Variant;

pub const TEST_NAMESPACE: &str = "urn:test:test";

pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.server.application_uri = "urn:ua-space:unit".to_string();
    config
}

/// Server on a [`ManualEngine`] with the default access policy
pub fn test_server() -> (Arc<Server>, Arc<ManualEngine>) {
    let engine = Arc::new(ManualEngine::new());
    let server = ServerBuilder::new(test_config())
        .engine(engine.clone())
        .build()
        .expect("build test server");
    (server, engine)
}

pub fn test_server_with_policy(policy: Box<dyn AccessPolicy>) -> Arc<Server> {
    ServerBuilder::new(test_config())
        .engine(Arc::new(ManualEngine::new()))
        .access_policy(policy)
        .build()
        .expect("build test server")
}

/// Registers [`TEST_NAMESPACE`] and adds a folder of that namespace below
/// `parent`.
pub fn add_test_folder(
    server: &Server,
    parent: &NodeId,
    name: &str,
) -> NodeId {
    let ns = server.add_namespace(TEST_NAMESPACE);
    server
        .add_folder(parent, QualifiedName::new(ns, name), NodeId::auto(ns))
        .expect("add folder")
}

/// Node context that logs every hook and fails the ones it is told to.
#[derive(Default)]
pub struct RecordingContext {
    pub events: Mutex<Vec<String>>,
    pub fail_construct: bool,
    pub fail_destruct: bool,
    pub fail_write: bool,
    /// Replaces read values when set
    pub read_override: Option<Variant>,
}

impl RecordingContext {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    fn record(
        &self,
        event: String,
    ) {
        self.events.lock().push(event);
    }
}

fn refused(hook: &str) -> Error {
    Error::handler(StatusCode::BAD_INTERNAL_ERROR, format!("{hook} refused"))
}

impl NodeContext for RecordingContext {
    fn construct(
        &self,
        _server: &Server,
        node_id: &NodeId,
    ) -> Result<()> {
        self.record(format!("construct {node_id}"));
        if self.fail_construct {
            return Err(refused("construct"));
        }
        Ok(())
    }

    fn destruct(
        &self,
        _server: &Server,
        node_id: &NodeId,
    ) -> Result<()> {
        self.record(format!("destruct {node_id}"));
        if self.fail_destruct {
            return Err(refused("destruct"));
        }
        Ok(())
    }

    fn read_value(
        &self,
        _server: &Server,
        node_id: &NodeId,
        value: &mut Variant,
    ) -> Result<()> {
        self.record(format!("read {node_id}"));
        if let Some(replacement) = &self.read_override {
            *value = replacement.clone();
        }
        Ok(())
    }

    fn write_value(
        &self,
        _server: &Server,
        node_id: &NodeId,
        value: &Variant,
    ) -> Result<()> {
        self.record(format!("write {node_id} {value:?}"));
        if self.fail_write {
            return Err(refused("write"));
        }
        Ok(())
    }
}
