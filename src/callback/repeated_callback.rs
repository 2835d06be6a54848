//! Named background actions driven by engine timers.
//!
//! A [`RepeatedCallback`] moves through `Created -> Running -> Stopped`.
//! Changing the interval keeps the current state, and `start` on a running
//! callback does nothing. The body always receives the callback itself, which
//! carries a weak reference to the owning [`Server`].

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Weak;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::Error;
use crate::Result;
use crate::SchedulerError;
use crate::Server;
use crate::StatusCode;
use crate::TimerCallback;
use crate::TimerHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackState {
    Created,
    Running,
    Stopped,
}

/// Body of a repeated callback
pub trait RepeatedCallbackHandler: Send + Sync {
    fn callback(
        &self,
        callback: &RepeatedCallback,
    ) -> Result<()>;
}

pub(crate) struct FnHandler<F>(pub(crate) F);

impl<F> RepeatedCallbackHandler for FnHandler<F>
where
    F: Fn(&RepeatedCallback) -> Result<()> + Send + Sync,
{
    fn callback(
        &self,
        callback: &RepeatedCallback,
    ) -> Result<()> {
        (self.0)(callback)
    }
}

struct CallbackInner {
    state: CallbackState,
    interval_ms: u64,
    timer: Option<TimerHandle>,
    last_error: StatusCode,
}

pub struct RepeatedCallback {
    name: String,
    server: Weak<Server>,
    this: Weak<RepeatedCallback>,
    handler: Arc<dyn RepeatedCallbackHandler>,
    inner: Mutex<CallbackInner>,
    fired: AtomicU64,
}

impl std::fmt::Debug for RepeatedCallback {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("RepeatedCallback")
            .field("name", &self.name)
            .field("state", &inner.state)
            .field("interval_ms", &inner.interval_ms)
            .finish()
    }
}

impl RepeatedCallback {
    pub(crate) fn new(
        server: Weak<Server>,
        name: impl Into<String>,
        interval_ms: u64,
        handler: Arc<dyn RepeatedCallbackHandler>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            name: name.into(),
            server,
            this: this.clone(),
            handler,
            inner: Mutex::new(CallbackInner {
                state: CallbackState::Created,
                interval_ms,
                timer: None,
                last_error: StatusCode::GOOD,
            }),
            fired: AtomicU64::new(0),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Timer handle assigned by the engine while running
    pub fn id(&self) -> Option<TimerHandle> {
        self.inner.lock().timer
    }

    pub fn interval(&self) -> u64 {
        self.inner.lock().interval_ms
    }

    pub fn state(&self) -> CallbackState {
        self.inner.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == CallbackState::Running
    }

    /// Status of the most recent run; `GOOD` before the first one
    pub fn last_error(&self) -> StatusCode {
        self.inner.lock().last_error
    }

    pub fn last_ok(&self) -> bool {
        self.last_error().is_good()
    }

    /// Number of completed runs
    pub fn fire_count(&self) -> u64 {
        self.fired.load(Ordering::Acquire)
    }

    /// The owning server, unless it has already been dropped
    pub fn server(&self) -> Option<Arc<Server>> {
        self.server.upgrade()
    }

    fn live_server(&self) -> Result<Arc<Server>> {
        self.server
            .upgrade()
            .ok_or_else(|| Error::Fatal(format!("server of callback {:?} is gone", self.name)))
    }

    fn check_interval(
        server: &Server,
        interval_ms: u64,
    ) -> Result<()> {
        let min_ms = server.config().callbacks.min_interval_ms;
        if interval_ms < min_ms {
            return Err(SchedulerError::InvalidInterval { interval_ms, min_ms }.into());
        }
        Ok(())
    }

    /// Registers the timer and moves to `Running`. Does nothing when already
    /// running.
    pub fn start(&self) -> Result<()> {
        let server = self.live_server()?;
        let mut inner = self.inner.lock();
        if inner.state == CallbackState::Running {
            return Ok(());
        }
        Self::check_interval(&server, inner.interval_ms)?;

        let this = self.this.clone();
        let tick: TimerCallback = Arc::new(move || {
            if let Some(callback) = this.upgrade() {
                callback.fire();
            }
        });
        let handle = server
            .engine()
            .register_timer(Duration::from_millis(inner.interval_ms), tick)?;

        inner.timer = Some(handle);
        inner.state = CallbackState::Running;
        info!(name = %self.name, interval_ms = inner.interval_ms, "repeated callback started");
        Ok(())
    }

    /// Sets a new interval. A running callback is re-armed and stays running.
    pub fn change_interval(
        &self,
        interval_ms: u64,
    ) -> Result<()> {
        let server = self.live_server()?;
        Self::check_interval(&server, interval_ms)?;

        let mut inner = self.inner.lock();
        if let (CallbackState::Running, Some(handle)) = (inner.state, inner.timer) {
            server
                .engine()
                .change_timer_interval(handle, Duration::from_millis(interval_ms))?;
        }
        inner.interval_ms = interval_ms;
        debug!(name = %self.name, interval_ms, state = ?inner.state, "repeated callback interval changed");
        Ok(())
    }

    /// Cancels the timer and moves to `Stopped`. Safe to call from inside the
    /// callback body. Returns whether the callback was running.
    pub fn stop(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.state != CallbackState::Running {
            return false;
        }
        if let (Some(handle), Some(server)) = (inner.timer.take(), self.server.upgrade()) {
            server.engine().cancel_timer(handle);
        }
        inner.state = CallbackState::Stopped;
        info!(name = %self.name, "repeated callback stopped");
        true
    }

    /// Runs the body once and records its status.
    pub fn fire(&self) {
        let status = match self.handler.callback(self) {
            Ok(()) => StatusCode::GOOD,
            Err(e) => {
                warn!(name = %self.name, "repeated callback failed: {}", e);
                e.status_code()
            }
        };
        self.inner.lock().last_error = status;
        self.fired.fetch_add(1, Ordering::AcqRel);
    }
}

impl Drop for RepeatedCallback {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        if let (Some(handle), Some(server)) = (inner.timer.take(), self.server.upgrade()) {
            server.engine().cancel_timer(handle);
        }
    }
}
