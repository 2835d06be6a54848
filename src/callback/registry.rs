use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::RepeatedCallback;

/// Name-keyed repeated callbacks owned by one server
#[derive(Default)]
pub struct CallbackRegistry {
    callbacks: Mutex<HashMap<String, Arc<RepeatedCallback>>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `callback` under its name. A callback previously registered
    /// under the same name is stopped and returned.
    pub fn insert(
        &self,
        callback: Arc<RepeatedCallback>,
    ) -> Option<Arc<RepeatedCallback>> {
        let previous = self
            .callbacks
            .lock()
            .insert(callback.name().to_string(), callback);
        if let Some(previous) = &previous {
            debug!(name = previous.name(), "replacing repeated callback");
            previous.stop();
        }
        previous
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<Arc<RepeatedCallback>> {
        self.callbacks.lock().get(name).cloned()
    }

    /// Stops and removes the callback named `name`.
    pub fn remove(
        &self,
        name: &str,
    ) -> Option<Arc<RepeatedCallback>> {
        let removed = self.callbacks.lock().remove(name);
        if let Some(callback) = &removed {
            callback.stop();
        }
        removed
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.callbacks.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.callbacks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.lock().is_empty()
    }

    /// Stops every callback and empties the registry.
    pub fn clear(&self) {
        let drained: Vec<Arc<RepeatedCallback>> = self.callbacks.lock().drain().map(|(_, cb)| cb).collect();
        for callback in drained {
            callback.stop();
        }
    }
}
