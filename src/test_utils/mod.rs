//! Shared fixtures for unit tests: a deterministic engine whose timers only
//! fire when told to, servers built on top of it, and a node context that
//! records every hook it receives.
mod common;
mod manual_engine;

pub use common::*;
pub use manual_engine::*;
