#![allow(dead_code)]

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use ua_space::HostHandle;
use ua_space::Result;
use ua_space::Server;
use ua_space::ServerBuilder;
use ua_space::ServerConfig;
use ua_space::ServerHost;
use ua_space::ServerLifecycle;

pub const TEST_NAMESPACE: &str = "urn:test";

/// Lifecycle that builds nothing
pub struct Idle;

impl ServerLifecycle for Idle {
    fn initialise(
        &mut self,
        _server: &Arc<Server>,
    ) -> Result<()> {
        Ok(())
    }
}

pub struct RunningHost {
    pub server: Arc<Server>,
    pub handle: HostHandle,
    shutdown_tx: watch::Sender<()>,
    task: JoinHandle<Result<()>>,
}

impl RunningHost {
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown_tx.send(());
        self.task.await.expect("host task panicked")
    }
}

pub fn create_server() -> Arc<Server> {
    let mut config = ServerConfig::default();
    config.server.application_uri = "urn:ua-space:integration".to_string();
    ServerBuilder::new(config).build().expect("build server")
}

/// Builds a server on the current runtime and runs its host loop.
pub fn start_host<L: ServerLifecycle + 'static>(lifecycle: L) -> RunningHost {
    let server = create_server();
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let (host, handle) = ServerHost::new(server.clone(), lifecycle, shutdown_rx);
    let task = tokio::spawn(host.run());
    RunningHost {
        server,
        handle,
        shutdown_tx,
        task,
    }
}
