mod common;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde_json::json;

use common::{contributor, harness, observer, validator};
use empathy_core::errors::MemoryError;
use empathy_core::models::{TimeWindow, TtlStrategy};
use empathy_core::traits::IKeyValueStore;

// --- Queues ---

#[test]
fn queue_is_fifo_with_priority_jumping_the_line() {
    let h = harness();
    let c = contributor("producer");
    let q = h.memory.queues();
    assert_eq!(q.push("review", json!({"n": 1}), &c, false).unwrap(), 1);
    assert_eq!(q.push("review", json!({"n": 2}), &c, false).unwrap(), 2);
    assert_eq!(q.push("review", json!({"n": 0}), &c, true).unwrap(), 3);

    let order: Vec<serde_json::Value> = (0..3)
        .map(|_| q.pop("review", &c, Duration::ZERO).unwrap().unwrap().task)
        .collect();
    assert_eq!(order, vec![json!({"n": 0}), json!({"n": 1}), json!({"n": 2})]);
    assert_eq!(q.pop("review", &c, Duration::ZERO).unwrap(), None);
}

#[test]
fn queue_entries_carry_provenance() {
    let h = harness();
    let c = contributor("producer");
    h.memory.queues().push("q", json!("task"), &c, false).unwrap();

    let peeked = h.memory.queues().peek("q", &observer("o"), 10).unwrap();
    assert_eq!(peeked.len(), 1);
    assert_eq!(peeked[0].queued_by, "producer");
    assert!(!peeked[0].task_id.is_empty());
    assert_eq!(h.memory.queues().length("q", &c).unwrap(), 1);
}

#[test]
fn queue_push_requires_contributor() {
    let h = harness();
    let err = h
        .memory
        .queues()
        .push("q", json!(1), &observer("o"), false)
        .unwrap_err();
    assert!(matches!(err, MemoryError::PermissionDenied { .. }));
    assert!(!h.store.exists("queue:q").unwrap());
}

#[test]
fn queue_expires_with_task_queue_ttl() {
    let h = harness();
    let c = contributor("c");
    h.memory.queues().push("q", json!(1), &c, false).unwrap();
    h.clock.advance(TtlStrategy::TaskQueue.default_duration());
    assert_eq!(h.memory.queues().length("q", &c).unwrap(), 0);
}

#[test]
fn blocking_pop_times_out_with_none() {
    let h = harness();
    let started = Instant::now();
    let popped = h
        .memory
        .queues()
        .pop("empty", &observer("o"), Duration::from_millis(50))
        .unwrap();
    assert!(popped.is_none());
    assert!(started.elapsed() >= Duration::from_millis(40));
}

#[test]
fn blocking_pop_wakes_on_push() {
    let h = harness();
    let memory = Arc::new(h.memory);
    let consumer = {
        let memory = Arc::clone(&memory);
        thread::spawn(move || {
            memory
                .queues()
                .pop("jobs", &contributor("worker"), Duration::from_secs(5))
                .unwrap()
        })
    };
    thread::sleep(Duration::from_millis(50));
    memory
        .queues()
        .push("jobs", json!({"job": "lint"}), &contributor("boss"), false)
        .unwrap();

    let entry = consumer.join().unwrap().unwrap();
    assert_eq!(entry.task, json!({"job": "lint"}));
}

// --- Streams ---

#[test]
fn stream_keeps_only_the_newest_entries() {
    let h = harness();
    let c = contributor("c");
    for i in 0..5 {
        h.memory
            .streams()
            .append("audit", json!({"i": i}), &c, Some(2))
            .unwrap()
            .unwrap();
    }
    let events = h.memory.streams().read("audit", &c, "0", 100).unwrap();
    let data: Vec<_> = events.iter().map(|e| e.data.clone()).collect();
    assert_eq!(data, vec![json!({"i": 3}), json!({"i": 4})]);
    assert!(events[0].entry_id < events[1].entry_id);
}

#[test]
fn stream_read_resumes_after_a_given_id() {
    let h = harness();
    let c = contributor("c");
    let ids: Vec<_> = (0..4)
        .map(|i| {
            h.memory
                .streams()
                .append("s", json!(i), &c, None)
                .unwrap()
                .unwrap()
        })
        .collect();

    let rest = h
        .memory
        .streams()
        .read("s", &c, &ids[1].to_string(), 100)
        .unwrap();
    assert_eq!(
        rest.iter().map(|e| e.entry_id).collect::<Vec<_>>(),
        ids[2..].to_vec()
    );
    assert_eq!(rest[0].agent_id, "c");

    let capped = h.memory.streams().read("s", &c, "0", 1).unwrap();
    assert_eq!(capped.len(), 1);
    assert_eq!(capped[0].entry_id, ids[0]);
}

#[test]
fn stream_read_rejects_malformed_ids() {
    let h = harness();
    let err = h
        .memory
        .streams()
        .read("s", &observer("o"), "abc", 10)
        .unwrap_err();
    assert!(matches!(err, MemoryError::ValidationError(_)));
}

#[test]
fn stream_append_requires_contributor() {
    let h = harness();
    assert!(h
        .memory
        .streams()
        .append("s", json!(1), &observer("o"), None)
        .is_err());
    assert!(!h.store.exists("stream:s").unwrap());
}

#[test]
fn read_new_with_zero_block_returns_immediately() {
    let h = harness();
    let c = contributor("c");
    h.memory.streams().append("s", json!(1), &c, None).unwrap();
    let events = h
        .memory
        .streams()
        .read_new("s", &c, Duration::ZERO, 10)
        .unwrap();
    assert!(events.is_empty());
}

#[test]
fn read_new_sees_entries_appended_while_waiting() {
    let h = harness();
    let memory = Arc::new(h.memory);
    let reader = {
        let memory = Arc::clone(&memory);
        thread::spawn(move || {
            memory
                .streams()
                .read_new("live", &observer("tail"), Duration::from_secs(5), 10)
                .unwrap()
        })
    };
    thread::sleep(Duration::from_millis(50));
    memory
        .streams()
        .append("live", json!("fresh"), &contributor("c"), None)
        .unwrap();

    let events = reader.join().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].data, json!("fresh"));
}

// --- Timelines ---

#[test]
fn timeline_window_is_inclusive_and_ordered_by_score() {
    let h = harness();
    let c = contributor("c");
    for score in [5.0, 1.0, 3.0, 2.0, 4.0] {
        assert!(h
            .memory
            .timelines()
            .add("deploys", &format!("e{score}"), json!(score), &c, Some(score))
            .unwrap());
    }

    let window = TimeWindow::between(2.0, 4.0);
    let events = h.memory.timelines().query("deploys", &c, &window).unwrap();
    let scores: Vec<f64> = events.iter().map(|e| e.timestamp).collect();
    assert_eq!(scores, vec![2.0, 3.0, 4.0]);
    assert_eq!(h.memory.timelines().count("deploys", &c, &window).unwrap(), 3);

    let paged = h
        .memory
        .timelines()
        .query("deploys", &c, &window.with_offset(1).with_limit(1))
        .unwrap();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].timestamp, 3.0);
}

#[test]
fn timeline_rejects_non_finite_timestamps_and_low_tiers() {
    let h = harness();
    assert!(matches!(
        h.memory
            .timelines()
            .add("t", "e", json!(1), &contributor("c"), Some(f64::NAN))
            .unwrap_err(),
        MemoryError::ValidationError(_)
    ));
    assert!(matches!(
        h.memory
            .timelines()
            .add("t", "e", json!(1), &observer("o"), Some(1.0))
            .unwrap_err(),
        MemoryError::PermissionDenied { .. }
    ));
    assert!(h.store.is_empty().unwrap());
}

#[test]
fn timeline_readd_records_another_occurrence() {
    let h = harness();
    let c = contributor("c");
    let t = h.memory.timelines();
    assert!(t.add("builds", "b1", json!("ok"), &c, Some(1.0)).unwrap());
    assert!(!t.add("builds", "b1", json!("ok"), &c, Some(1.0)).unwrap());
    assert!(t.add("builds", "b1", json!("ok"), &c, Some(2.0)).unwrap());

    let events = t.query("builds", &c, &TimeWindow::all()).unwrap();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.event_id == "b1"));
}

// --- Sessions ---

#[test]
fn session_membership_is_idempotent() {
    let h = harness();
    let owner = contributor("owner");
    let guest = observer("guest");
    let sessions = h.memory.sessions();
    assert!(sessions
        .create_session("s1", &owner, Some(json!({"topic": "refactor"})))
        .unwrap());

    assert!(sessions.join_session("s1", &guest).unwrap());
    assert!(sessions.join_session("s1", &guest).unwrap());
    let session = sessions.get_session("s1", &guest).unwrap().unwrap();
    assert_eq!(session.participants, vec!["owner", "guest"]);
    assert_eq!(session.metadata["topic"], "refactor");

    assert!(sessions.leave_session("s1", &guest).unwrap());
    assert!(sessions.leave_session("s1", &guest).unwrap());
    let session = sessions.get_session("s1", &guest).unwrap().unwrap();
    assert_eq!(session.participants, vec!["owner"]);

    assert!(!sessions.join_session("missing", &guest).unwrap());
    assert!(!sessions.leave_session("missing", &guest).unwrap());
}

#[test]
fn session_creation_validates_tier_and_metadata() {
    let h = harness();
    assert!(matches!(
        h.memory
            .sessions()
            .create_session("s1", &observer("o"), None)
            .unwrap_err(),
        MemoryError::PermissionDenied { .. }
    ));
    assert!(matches!(
        h.memory
            .sessions()
            .create_session("s1", &contributor("c"), Some(json!([1, 2])))
            .unwrap_err(),
        MemoryError::ValidationError(_)
    ));
    assert!(h.store.is_empty().unwrap());
}

#[test]
fn concurrent_joins_all_land() {
    let h = harness();
    h.memory
        .sessions()
        .create_session("s1", &contributor("owner"), None)
        .unwrap();
    let memory = Arc::new(h.memory);
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let memory = Arc::clone(&memory);
            thread::spawn(move || {
                memory
                    .sessions()
                    .join_session("s1", &observer(&format!("a{i}")))
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
    let session = memory
        .sessions()
        .get_session("s1", &observer("x"))
        .unwrap()
        .unwrap();
    assert_eq!(session.participants.len(), 5);
}

#[test]
fn sessions_are_listed_and_expire() {
    let h = harness();
    let c = contributor("c");
    h.memory.sessions().create_session("b", &c, None).unwrap();
    h.memory.sessions().create_session("a", &c, None).unwrap();
    assert_eq!(h.memory.sessions().list_sessions(&c).unwrap(), vec!["a", "b"]);

    h.clock.advance(TtlStrategy::Session.default_duration());
    assert!(h.memory.sessions().list_sessions(&c).unwrap().is_empty());
}

// --- Conflicts ---

fn positions() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("a1".to_string(), "X".to_string()),
        ("a2".to_string(), "Y".to_string()),
    ])
}

fn interests() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([
        ("a1".to_string(), vec!["speed".to_string()]),
        ("a2".to_string(), vec!["cost".to_string()]),
    ])
}

#[test]
fn conflict_is_created_then_resolved() {
    let h = harness();
    let a1 = contributor("a1");
    let conflicts = h.memory.conflicts();
    assert!(conflicts
        .create_conflict_context("c1", positions(), interests(), &a1, None)
        .unwrap());

    let open = conflicts.get_conflict_context("c1", &a1).unwrap().unwrap();
    assert!(!open.resolved);
    assert_eq!(open.parties(), vec!["a1", "a2"]);

    assert!(conflicts
        .resolve_conflict("c1", "Chose X", &validator("judge"))
        .unwrap());
    let closed = conflicts.get_conflict_context("c1", &a1).unwrap().unwrap();
    assert!(closed.resolved);
    assert_eq!(closed.resolution.as_deref(), Some("Chose X"));
    assert_eq!(closed.resolved_by.as_deref(), Some("judge"));
}

#[test]
fn resolving_requires_validator_and_an_existing_conflict() {
    let h = harness();
    let a1 = contributor("a1");
    h.memory
        .conflicts()
        .create_conflict_context("c1", positions(), interests(), &a1, Some("defer".into()))
        .unwrap();

    assert!(matches!(
        h.memory
            .conflicts()
            .resolve_conflict("c1", "Chose Y", &a1)
            .unwrap_err(),
        MemoryError::PermissionDenied { .. }
    ));
    assert!(!h
        .memory
        .conflicts()
        .resolve_conflict("nope", "Chose Y", &validator("v"))
        .unwrap());
    assert!(matches!(
        h.memory
            .conflicts()
            .create_conflict_context("c2", positions(), interests(), &observer("o"), None)
            .unwrap_err(),
        MemoryError::PermissionDenied { .. }
    ));
}

#[test]
fn active_conflicts_exclude_resolved_ones() {
    let h = harness();
    let a1 = contributor("a1");
    for id in ["c1", "c2", "c3"] {
        h.memory
            .conflicts()
            .create_conflict_context(id, positions(), interests(), &a1, None)
            .unwrap();
    }
    h.memory
        .conflicts()
        .resolve_conflict("c2", "merged", &validator("v"))
        .unwrap();

    let active: Vec<String> = h
        .memory
        .conflicts()
        .list_active_conflicts(&a1)
        .unwrap()
        .into_iter()
        .map(|c| c.conflict_id)
        .collect();
    assert_eq!(active, vec!["c1", "c3"]);
}

// --- Signals ---

#[test]
fn signals_reach_their_target_and_broadcasts_reach_everyone_else() {
    let h = harness();
    let a = contributor("a");
    let b = contributor("b");
    let c = contributor("c");
    let signals = h.memory.signals();

    assert!(signals.send_signal("ready", json!({"step": 1}), &a, Some("b")).unwrap());
    assert!(signals.send_signal("halt", json!(null), &a, None).unwrap());

    let for_b = signals.receive_signals(&b, None).unwrap();
    assert_eq!(
        for_b.iter().map(|s| s.signal_type.as_str()).collect::<Vec<_>>(),
        vec!["ready", "halt"]
    );

    let for_c = signals.receive_signals(&c, None).unwrap();
    assert_eq!(for_c.len(), 1);
    assert_eq!(for_c[0].signal_type, "halt");
    assert!(for_c[0].target_agent.is_none());

    assert!(signals.receive_signals(&a, None).unwrap().is_empty());
    assert_eq!(signals.receive_signals(&b, Some("ready")).unwrap().len(), 1);
}

#[test]
fn signals_expire_with_coordination_ttl() {
    let h = harness();
    h.memory
        .signals()
        .send_signal("ping", json!(1), &contributor("a"), None)
        .unwrap();
    h.clock.advance(TtlStrategy::Coordination.default_duration());
    assert!(h
        .memory
        .signals()
        .receive_signals(&contributor("b"), None)
        .unwrap()
        .is_empty());
}

#[test]
fn observers_cannot_send_signals() {
    let h = harness();
    assert!(matches!(
        h.memory
            .signals()
            .send_signal("ping", json!(1), &observer("o"), None)
            .unwrap_err(),
        MemoryError::PermissionDenied { .. }
    ));
}
