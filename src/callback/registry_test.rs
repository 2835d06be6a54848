use std::sync::Arc;
use std::sync::Weak;

use super::*;
use crate::FnHandler;

fn detached(name: &str) -> Arc<RepeatedCallback> {
    let body = |_: &RepeatedCallback| -> crate::Result<()> { Ok(()) };
    RepeatedCallback::new(Weak::new(), name, 100, Arc::new(FnHandler(body)))
}

#[test]
fn names_are_sorted_and_unique() {
    let registry = CallbackRegistry::new();

    assert!(registry.insert(detached("b")).is_none());
    assert!(registry.insert(detached("a")).is_none());
    let replaced = registry.insert(detached("b"));

    assert!(replaced.is_some());
    assert_eq!(registry.names(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(registry.len(), 2);
}

#[test]
fn remove_and_clear_empty_the_registry() {
    let registry = CallbackRegistry::new();
    registry.insert(detached("a"));
    registry.insert(detached("b"));

    assert!(registry.remove("a").is_some());
    assert!(registry.remove("a").is_none());
    assert!(registry.get("b").is_some());

    registry.clear();
    assert!(registry.is_empty());
}
