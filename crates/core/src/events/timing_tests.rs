// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

fn capture(bus: &EventBus, topic: &str) -> Arc<Mutex<Vec<Value>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    bus.on(topic, move |payload| {
        sink.lock().unwrap().push(payload.clone());
        Ok(())
    });
    seen
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn rate_limited_emitters_need_a_runtime() {
    let bus = EventBus::new();
    assert!(matches!(
        bus.debounce("search.changed", ms(100)),
        Err(EventError::NoRuntime(topic)) if topic == "search.changed"
    ));
    assert!(matches!(
        bus.throttle("scroll", ms(100)),
        Err(EventError::NoRuntime(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn debounce_emits_only_last_call() {
    let bus = EventBus::new();
    let seen = capture(&bus, "search.changed");
    let debounced = bus.debounce("search.changed", ms(100)).unwrap();

    debounced.emit(json!("a"));
    tokio::time::sleep(ms(50)).await;
    debounced.emit(json!("ab"));
    tokio::time::sleep(ms(50)).await;
    debounced.emit(json!("abc"));
    assert!(seen.lock().unwrap().is_empty());
    assert!(debounced.is_pending());

    tokio::time::sleep(ms(150)).await;
    assert_eq!(*seen.lock().unwrap(), vec![json!("abc")]);
    assert!(!debounced.is_pending());
}

#[tokio::test(start_paused = true)]
async fn debounce_separate_windows_each_emit() {
    let bus = EventBus::new();
    let seen = capture(&bus, "filter.changed");
    let debounced = bus.debounce("filter.changed", ms(100)).unwrap();

    debounced.emit(json!(1));
    tokio::time::sleep(ms(150)).await;
    debounced.emit(json!(2));
    tokio::time::sleep(ms(150)).await;

    assert_eq!(*seen.lock().unwrap(), vec![json!(1), json!(2)]);
}

#[tokio::test(start_paused = true)]
async fn debounce_cancel_drops_pending() {
    let bus = EventBus::new();
    let seen = capture(&bus, "filter.changed");
    let debounced = bus.debounce("filter.changed", ms(100)).unwrap();

    debounced.emit(json!(1));
    assert!(debounced.cancel());
    assert!(!debounced.cancel());
    tokio::time::sleep(ms(200)).await;

    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn debouncers_do_not_share_timers() {
    let bus = EventBus::new();
    let seen = capture(&bus, "t");
    let first = bus.debounce("t", ms(100)).unwrap();
    let second = bus.debounce("t", ms(100)).unwrap();

    first.emit(json!("first"));
    second.emit(json!("second"));
    tokio::time::sleep(ms(150)).await;

    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn throttle_leading_then_single_trailing() {
    let bus = EventBus::new();
    let seen = capture(&bus, "scroll");
    let throttled = bus.throttle("scroll", ms(100)).unwrap();

    throttled.emit(json!(1));
    assert_eq!(*seen.lock().unwrap(), vec![json!(1)]);

    tokio::time::sleep(ms(10)).await;
    throttled.emit(json!(2));
    assert!(throttled.has_trailing());
    tokio::time::sleep(ms(10)).await;
    throttled.emit(json!(3));
    assert_eq!(seen.lock().unwrap().len(), 1);

    tokio::time::sleep(ms(100)).await;
    assert_eq!(*seen.lock().unwrap(), vec![json!(1), json!(3)]);
    assert!(!throttled.has_trailing());
}

#[tokio::test(start_paused = true)]
async fn throttle_emits_immediately_after_window() {
    let bus = EventBus::new();
    let seen = capture(&bus, "resize");
    let throttled = bus.throttle("resize", ms(100)).unwrap();

    throttled.emit(json!(1));
    tokio::time::sleep(ms(120)).await;
    throttled.emit(json!(2));

    assert_eq!(*seen.lock().unwrap(), vec![json!(1), json!(2)]);
    assert!(!throttled.has_trailing());
}
