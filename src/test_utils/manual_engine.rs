use std::collections::BTreeMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use parking_lot::Mutex;

use crate::ProtocolEngine;
use crate::RequestContext;
use crate::Result;
use crate::SchedulerError;
use crate::Session;
use crate::TimerCallback;
use crate::TimerHandle;

/// [`ProtocolEngine`] whose timers never fire on their own. Tests drive them
/// with [`ManualEngine::tick`] and [`ManualEngine::tick_all`].
#[derive(Default)]
pub struct ManualEngine {
    timers: Mutex<BTreeMap<TimerHandle, (Duration, TimerCallback)>>,
    next_handle: AtomicU64,
}

impl ManualEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires one timer. Returns false when it is not registered.
    pub fn tick(
        &self,
        handle: TimerHandle,
    ) -> bool {
        // Run outside the lock: a callback may cancel its own timer.
        let callback = self.timers.lock().get(&handle).map(|(_, cb)| cb.clone());
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    /// Fires every registered timer once, in registration order.
    pub fn tick_all(&self) -> usize {
        let callbacks: Vec<TimerCallback> = self.timers.lock().values().map(|(_, cb)| cb.clone()).collect();
        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }

    pub fn interval_of(
        &self,
        handle: TimerHandle,
    ) -> Option<Duration> {
        self.timers.lock().get(&handle).map(|(interval, _)| *interval)
    }

    pub fn timer_count(&self) -> usize {
        self.timers.lock().len()
    }
}

impl ProtocolEngine for ManualEngine {
    fn register_timer(
        &self,
        interval: Duration,
        callback: TimerCallback,
    ) -> Result<TimerHandle> {
        let handle = TimerHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1);
        self.timers.lock().insert(handle, (interval, callback));
        Ok(handle)
    }

    fn change_timer_interval(
        &self,
        handle: TimerHandle,
        interval: Duration,
    ) -> Result<()> {
        match self.timers.lock().get_mut(&handle) {
            Some(entry) => {
                entry.0 = interval;
                Ok(())
            }
            None => Err(SchedulerError::TimerRegistration(format!("unknown timer {}", handle.id())).into()),
        }
    }

    fn cancel_timer(
        &self,
        handle: TimerHandle,
    ) -> bool {
        self.timers.lock().remove(&handle).is_some()
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
