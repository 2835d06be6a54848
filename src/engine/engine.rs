use std::sync::Arc;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use crate::NodeId;
use crate::Result;
use crate::Session;

/// Identifies a timer registered with a [`ProtocolEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

pub type TimerCallback = Arc<dyn Fn() + Send + Sync>;

/// Engine side metadata of an inbound request.
///
/// `session_id` is `None` for requests that originate in-process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    pub session_id: Option<NodeId>,
}

impl RequestContext {
    pub fn local() -> Self {
        Self { session_id: None }
    }

    pub fn remote(session_id: NodeId) -> Self {
        Self {
            session_id: Some(session_id),
        }
    }
}

/// The narrow slice of the underlying protocol engine the server depends on:
/// timers for repeated callbacks and session identities for access control.
#[cfg_attr(test, automock)]
pub trait ProtocolEngine: Send + Sync {
    /// Invokes `callback` every `interval`, first after one full interval.
    fn register_timer(
        &self,
        interval: Duration,
        callback: TimerCallback,
    ) -> Result<TimerHandle>;

    /// Re-arms an existing timer with a new period, keeping its callback.
    fn change_timer_interval(
        &self,
        handle: TimerHandle,
        interval: Duration,
    ) -> Result<()>;

    /// Returns whether the timer existed. Safe to call from inside the timer's
    /// own callback.
    fn cancel_timer(
        &self,
        handle: TimerHandle,
    ) -> bool;

    fn session_identity(
        &self,
        context: &RequestContext,
    ) -> Session;
}
