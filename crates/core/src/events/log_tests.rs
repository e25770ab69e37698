// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

fn record(event: &str, n: i64) -> EventRecord {
    EventRecord {
        event: event.to_string(),
        payload: json!({ "n": n }),
        timestamp: n,
    }
}

#[test]
fn push_and_read_in_order() {
    let mut history = EventHistory::default();
    history.push(record("ar.invoice.created", 1));
    history.push(record("ar.invoice.paid", 2));

    let records = history.records(None);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].event, "ar.invoice.created");
    assert_eq!(records[1].event, "ar.invoice.paid");
}

#[test]
fn limit_evicts_oldest() {
    let mut history = EventHistory::new(3);
    for n in 0..5 {
        history.push(record("tick", n));
    }

    let stamps: Vec<i64> = history.records(None).iter().map(|r| r.timestamp).collect();
    assert_eq!(stamps, vec![2, 3, 4]);
    assert_eq!(history.limit(), 3);
}

#[test]
fn zero_limit_keeps_nothing() {
    let mut history = EventHistory::new(0);
    history.push(record("tick", 1));
    assert!(history.is_empty());
}

#[test]
fn exact_filter() {
    let mut history = EventHistory::default();
    history.push(record("ap.bill.created", 1));
    history.push(record("ap.bill.created.extra", 2));
    history.push(record("ar.invoice.created", 3));

    let records = history.records(Some("ap.bill.created"));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].timestamp, 1);
}

#[test]
fn wildcard_filter() {
    let mut history = EventHistory::default();
    history.push(record("ap.bill.created", 1));
    history.push(record("ar.invoice.created", 2));
    history.push(record("ap.bill.paid", 3));

    let stamps: Vec<i64> = history
        .records(Some("ap.*"))
        .iter()
        .map(|r| r.timestamp)
        .collect();
    assert_eq!(stamps, vec![1, 3]);

    assert_eq!(history.records(Some("*.created")).len(), 2);
}

#[test]
fn clear_empties_log() {
    let mut history = EventHistory::default();
    history.push(record("tick", 1));
    history.clear();
    assert_eq!(history.len(), 0);
}
