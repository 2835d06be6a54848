use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use dashmap::DashMap;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::interval_at;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use tracing::trace;

use super::ProtocolEngine;
use super::RequestContext;
use super::TimerCallback;
use super::TimerHandle;
use crate::Error;
use crate::Result;
use crate::SchedulerError;
use crate::Session;

struct TimerEntry {
    task: JoinHandle<()>,
    callback: TimerCallback,
}

/// [`ProtocolEngine`] backed by the tokio runtime it was created on. Every
/// timer is a task ticking a tokio interval.
pub struct TokioEngine {
    runtime: Handle,
    timers: DashMap<TimerHandle, TimerEntry>,
    next_handle: AtomicU64,
}

impl TokioEngine {
    /// Binds to the current tokio runtime.
    ///
    /// Fails with [`Error::EngineUnavailable`] outside of a runtime.
    pub fn new() -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| Error::EngineUnavailable(e.to_string()))?;
        Ok(Self::with_handle(runtime))
    }

    pub fn with_handle(runtime: Handle) -> Self {
        Self {
            runtime,
            timers: DashMap::new(),
            next_handle: AtomicU64::new(1),
        }
    }

    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    fn spawn_timer(
        &self,
        handle: TimerHandle,
        interval: Duration,
        callback: TimerCallback,
    ) -> JoinHandle<()> {
        self.runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                trace!(timer = handle.id(), "timer fired");
                callback();
            }
        })
    }
}

fn check_interval(interval: Duration) -> Result<()> {
    if interval.is_zero() {
        return Err(SchedulerError::TimerRegistration("timer interval must be greater than zero".into()).into());
    }
    Ok(())
}

impl ProtocolEngine for TokioEngine {
    fn register_timer(
        &self,
        interval: Duration,
        callback: TimerCallback,
    ) -> Result<TimerHandle> {
        check_interval(interval)?;
        let handle = TimerHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let task = self.spawn_timer(handle, interval, callback.clone());
        self.timers.insert(handle, TimerEntry { task, callback });
        debug!(timer = handle.id(), ?interval, "timer registered");
        Ok(handle)
    }

    fn change_timer_interval(
        &self,
        handle: TimerHandle,
        interval: Duration,
    ) -> Result<()> {
        check_interval(interval)?;
        let mut entry = self
            .timers
            .get_mut(&handle)
            .ok_or_else(|| SchedulerError::TimerRegistration(format!("unknown timer {}", handle.id())))?;
        let callback = entry.callback.clone();
        entry.task.abort();
        entry.task = self.spawn_timer(handle, interval, callback);
        debug!(timer = handle.id(), ?interval, "timer interval changed");
        Ok(())
    }

    fn cancel_timer(
        &self,
        handle: TimerHandle,
    ) -> bool {
        match self.timers.remove(&handle) {
            Some((_, entry)) => {
                entry.task.abort();
                debug!(timer = handle.id(), "timer cancelled");
                true
            }
            None => false,
        }
    }

    fn session_identity(
        &self,
        context: &RequestContext,
    ) -> Session {
        match &context.session_id {
            Some(id) => Session::Remote(id.clone()),
            None => Session::Local,
        }
    }
}

impl Drop for TokioEngine {
    fn drop(&mut self) {
        for entry in self.timers.iter() {
            entry.task.abort();
        }
    }
}
