//! The host loop driving a [`Server`].
//!
//! The protocol engine hands client requests to [`HostHandle::request`]; the
//! loop resolves the caller's session, routes the request through the server
//! and answers on a oneshot channel. Between requests the application's
//! [`ServerLifecycle::process`] runs on a fixed tick. A shutdown signal ends
//! the loop, after which the lifecycle and the server are terminated.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::sync::watch;
use tokio::time::interval;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::trace;
use tracing::warn;

use crate::Error;
use crate::InboundRequest;
use crate::Request;
use crate::RequestContext;
use crate::Response;
use crate::Result;
use crate::Server;
use crate::ServerLifecycle;

const INBOUND_CHANNEL_CAPACITY: usize = 1024;

/// Sending side used by the protocol engine to submit requests.
#[derive(Clone, Debug)]
pub struct HostHandle {
    inbound_tx: mpsc::Sender<InboundRequest>,
}

impl HostHandle {
    /// Submits `request` and waits for the server's answer.
    pub async fn request(
        &self,
        context: RequestContext,
        request: Request,
    ) -> Result<Response> {
        let (respond_to, rx) = oneshot::channel();
        self.inbound_tx
            .send(InboundRequest {
                context,
                request,
                respond_to,
            })
            .await
            .map_err(|e| {
                error!("host loop is gone: {}", e);
                Error::EngineUnavailable("host loop is not running".to_string())
            })?;
        rx.await
            .map_err(|_| Error::EngineUnavailable("request dropped by host loop".to_string()))?
    }
}

pub struct ServerHost<L: ServerLifecycle> {
    server: Arc<Server>,
    lifecycle: L,
    inbound_rx: mpsc::Receiver<InboundRequest>,
    shutdown_signal: watch::Receiver<()>,
}

impl<L: ServerLifecycle> ServerHost<L> {
    pub fn new(
        server: Arc<Server>,
        lifecycle: L,
        shutdown_signal: watch::Receiver<()>,
    ) -> (Self, HostHandle) {
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CHANNEL_CAPACITY);
        let host = Self {
            server,
            lifecycle,
            inbound_rx,
            shutdown_signal,
        };
        (host, HostHandle { inbound_tx })
    }

    pub fn server(&self) -> &Arc<Server> {
        &self.server
    }

    /// Runs until the shutdown signal fires or every [`HostHandle`] is gone.
    pub async fn run(mut self) -> Result<()> {
        self.lifecycle.initialise(&self.server).map_err(|e| {
            error!("lifecycle initialise failed: {}", e);
            e
        })?;
        info!(
            application_uri = %self.server.config().server.application_uri,
            nodes = self.server.node_count(),
            "server host running"
        );

        let period = Duration::from_millis(self.server.config().server.process_interval_ms);
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                // P0: shutdown
                _ = self.shutdown_signal.changed() => {
                    warn!("shutdown signal received.");
                    break;
                }
                // P1: client requests
                inbound = self.inbound_rx.recv() => {
                    match inbound {
                        Some(inbound) => self.dispatch(inbound),
                        None => {
                            info!("all request senders dropped, stopping host");
                            break;
                        }
                    }
                }
                // P2: application processing
                _ = ticker.tick() => {
                    trace!("process tick");
                    if let Err(e) = self.lifecycle.process(&self.server) {
                        error!("lifecycle process failed: {:?}", e);
                    }
                }
            }
        }

        let terminated = self.lifecycle.terminate(&self.server);
        if let Err(e) = &terminated {
            error!("lifecycle terminate failed: {}", e);
        }
        self.server.terminate();
        terminated
    }

    fn dispatch(
        &self,
        inbound: InboundRequest,
    ) {
        let InboundRequest {
            context,
            request,
            respond_to,
        } = inbound;
        let session = self.server.engine().session_identity(&context);
        debug!(?session, ?request, "handling request");

        let response = self.server.handle_request(&session, request);
        if let Err(e) = &response {
            debug!(status = %e.status_code(), "request failed: {}", e);
        }
        if respond_to.send(response).is_err() {
            warn!(?session, "requester went away before the response was sent");
        }
    }
}
