use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing_test::traced_test;

use super::*;
use crate::test_utils::test_config;
use crate::test_utils::test_server;
use crate::Error;
use crate::SchedulerError;
use crate::ServerBuilder;
use crate::StatusCode;

fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    (hits.clone(), hits)
}

#[test]
fn lifecycle_moves_created_running_stopped() {
    let (server, engine) = test_server();
    let callback = server.add_repeated_callback("job", 100, |_| Ok(())).unwrap();

    assert_eq!(callback.state(), CallbackState::Created);
    assert_eq!(callback.id(), None);

    callback.start().unwrap();
    assert_eq!(callback.state(), CallbackState::Running);
    let timer = callback.id().unwrap();
    assert_eq!(engine.interval_of(timer), Some(Duration::from_millis(100)));

    // starting again keeps the same timer
    callback.start().unwrap();
    assert_eq!(callback.id(), Some(timer));
    assert_eq!(engine.timer_count(), 1);

    assert!(callback.stop());
    assert!(!callback.stop());
    assert_eq!(callback.state(), CallbackState::Stopped);
    assert_eq!(engine.timer_count(), 0);
}

#[test]
fn change_interval_keeps_state() {
    let (server, engine) = test_server();
    let callback = server.add_repeated_callback("job", 100, |_| Ok(())).unwrap();

    callback.change_interval(250).unwrap();
    assert_eq!(callback.state(), CallbackState::Created);
    assert_eq!(callback.interval(), 250);
    assert_eq!(engine.timer_count(), 0);

    callback.start().unwrap();
    callback.change_interval(50).unwrap();
    assert_eq!(callback.state(), CallbackState::Running);
    assert_eq!(engine.interval_of(callback.id().unwrap()), Some(Duration::from_millis(50)));
}

#[test]
fn interval_below_minimum_is_rejected() {
    let (server, _) = test_server();
    let callback = server.add_repeated_callback("job", 100, |_| Ok(())).unwrap();

    let err = callback.change_interval(1).unwrap_err();

    assert!(matches!(err, Error::Scheduler(SchedulerError::InvalidInterval { .. })));
    assert_eq!(callback.interval(), 100);
}

#[test]
#[traced_test]
fn body_failure_is_recorded() {
    let (server, engine) = test_server();
    let callback = server
        .add_repeated_callback("flaky", 100, |cb| {
            if cb.fire_count() == 0 {
                Err(Error::handler(StatusCode::BAD_RESOURCE_UNAVAILABLE, "not yet"))
            } else {
                Ok(())
            }
        })
        .unwrap();
    callback.start().unwrap();

    engine.tick_all();
    assert_eq!(callback.last_error(), StatusCode::BAD_RESOURCE_UNAVAILABLE);
    assert!(!callback.last_ok());
    assert!(callback.is_running());
    assert!(logs_contain("repeated callback failed"));

    engine.tick_all();
    assert!(callback.last_ok());
    assert_eq!(callback.fire_count(), 2);
}

#[test]
fn body_may_stop_its_own_callback() {
    let (server, engine) = test_server();
    let (hits, counter) = counter();
    let callback = server
        .add_repeated_callback("once", 100, move |cb| {
            counter.fetch_add(1, Ordering::SeqCst);
            cb.stop();
            Ok(())
        })
        .unwrap();
    callback.start().unwrap();

    engine.tick_all();
    engine.tick_all();

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(callback.state(), CallbackState::Stopped);
}

#[test]
fn callback_outliving_its_server_cannot_start() {
    let (server, _) = test_server();
    let callback = server.add_repeated_callback("orphan", 100, |_| Ok(())).unwrap();
    drop(server);

    assert!(callback.server().is_none());
    assert!(matches!(callback.start(), Err(Error::Fatal(_))));
}

#[test]
fn handler_trait_objects_are_accepted() {
    struct Counting(AtomicUsize);

    impl RepeatedCallbackHandler for Counting {
        fn callback(
            &self,
            _callback: &RepeatedCallback,
        ) -> crate::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    let (server, engine) = test_server();
    let handler = Arc::new(Counting(AtomicUsize::new(0)));
    let callback = server.add_repeated_handler("typed", 100, handler.clone()).unwrap();
    callback.start().unwrap();

    engine.tick_all();

    assert_eq!(handler.0.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn interval_change_while_running_on_tokio() {
    let server = ServerBuilder::new(test_config()).build().unwrap();
    let (hits, counter) = counter();
    let callback = server
        .add_repeated_callback("poll", 2000, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

    callback.start().unwrap();
    callback.change_interval(500).unwrap();
    assert_eq!(callback.state(), CallbackState::Running);
    sleep(Duration::from_millis(1600)).await;

    assert!(hits.load(Ordering::SeqCst) >= 3);
    assert!(callback.is_running());
    server.terminate();
}

#[tokio::test(start_paused = true)]
async fn stop_from_body_on_tokio() {
    let server = ServerBuilder::new(test_config()).build().unwrap();
    let (hits, counter) = counter();
    let callback = server
        .add_repeated_callback("self-stop", 100, move |cb| {
            if counter.fetch_add(1, Ordering::SeqCst) == 1 {
                cb.stop();
            }
            Ok(())
        })
        .unwrap();

    callback.start().unwrap();
    sleep(Duration::from_millis(1000)).await;

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(callback.state(), CallbackState::Stopped);
}
