use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use empathy_core::errors::StoreError;
use empathy_core::models::StreamId;
use empathy_core::traits::{IKeyValueStore, StoreOp, TxOutcome};
use empathy_store::{InMemoryStore, ManualClock};
use proptest::prelude::*;

fn store_with_clock() -> (InMemoryStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    (InMemoryStore::with_clock(clock.clone()), clock)
}

fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// --- Strings & TTL ---

#[test]
fn set_get_delete() {
    let store = InMemoryStore::new();
    assert!(store.set("a", "1", None).unwrap());
    assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    assert!(store.exists("a").unwrap());
    assert!(store.delete("a").unwrap());
    assert!(!store.delete("a").unwrap());
    assert_eq!(store.get("a").unwrap(), None);
}

#[test]
fn keys_expire_after_ttl() {
    let (store, clock) = store_with_clock();
    store.set("short", "v", Some(Duration::from_secs(2))).unwrap();
    store.set("forever", "v", None).unwrap();

    clock.advance(Duration::from_millis(1_999));
    assert!(store.exists("short").unwrap());

    clock.advance(Duration::from_millis(1));
    assert_eq!(store.get("short").unwrap(), None);
    assert_eq!(store.keys("*").unwrap(), vec!["forever".to_string()]);
    assert_eq!(store.purge_expired().unwrap(), 1);
}

#[test]
fn overwrite_resets_ttl() {
    let (store, clock) = store_with_clock();
    store.set("k", "old", Some(Duration::from_secs(1))).unwrap();
    store.set("k", "new", None).unwrap();
    clock.advance(Duration::from_secs(5));
    assert_eq!(store.get("k").unwrap().as_deref(), Some("new"));
}

#[test]
fn expire_applies_to_lists_and_missing_keys() {
    let (store, clock) = store_with_clock();
    store.rpush("q", "job").unwrap();
    assert!(store.expire("q", Duration::from_secs(10)).unwrap());
    assert!(!store.expire("absent", Duration::from_secs(10)).unwrap());

    clock.advance(Duration::from_secs(10));
    assert_eq!(store.llen("q").unwrap(), 0);
    assert_eq!(store.lpop("q").unwrap(), None);
}

#[test]
fn keys_match_glob_patterns() {
    let store = InMemoryStore::new();
    for key in ["working:a1:x", "working:a2:y", "queue:jobs", "working:a1:z"] {
        store.set(key, "v", None).unwrap();
    }
    assert_eq!(
        store.keys("working:a1:*").unwrap(),
        vec!["working:a1:x".to_string(), "working:a1:z".to_string()]
    );
    assert_eq!(store.keys("working:a?:y").unwrap().len(), 1);
    assert!(store.keys("nothing*").unwrap().is_empty());
}

#[test]
fn mget_reads_missing_and_non_string_as_none() {
    let store = InMemoryStore::new();
    store.set("a", "1", None).unwrap();
    store.rpush("list", "x").unwrap();
    let got = store
        .mget(&["a".into(), "missing".into(), "list".into()])
        .unwrap();
    assert_eq!(got, vec![Some("1".to_string()), None, None]);
}

#[test]
fn string_read_of_list_is_wrong_type() {
    let store = InMemoryStore::new();
    store.rpush("q", "x").unwrap();
    assert!(matches!(store.get("q"), Err(StoreError::WrongType { key }) if key == "q"));
    store.set("s", "v", None).unwrap();
    assert!(matches!(store.rpush("s", "x"), Err(StoreError::WrongType { .. })));
}

// --- Pipelines ---

#[test]
fn pipeline_reports_per_op_results() {
    let store = InMemoryStore::new();
    store.set("gone", "v", None).unwrap();
    let results = store
        .pipeline_execute(&[
            StoreOp::set("a", "1", None),
            StoreOp::delete("gone"),
            StoreOp::delete("never"),
        ])
        .unwrap();
    assert_eq!(results, vec![true, true, false]);
    assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
}

#[test]
fn pipeline_is_observed_all_at_once() {
    let store = Arc::new(InMemoryStore::new());
    let ops: Vec<StoreOp> = (0..200)
        .map(|i| StoreOp::set(format!("batch:{i:03}"), "v", None))
        .collect();

    let reader = {
        let store = store.clone();
        thread::spawn(move || {
            let mut seen = BTreeSet::new();
            for _ in 0..200 {
                seen.insert(store.keys("batch:*").unwrap().len());
            }
            seen
        })
    };
    store.pipeline_execute(&ops).unwrap();
    let seen = reader.join().unwrap();
    assert!(seen.iter().all(|n| *n == 0 || *n == 200), "partial batch seen: {seen:?}");
}

// --- Scan ---

#[test]
fn scan_zero_cursor_ends() {
    let store = InMemoryStore::new();
    let (cursor, keys) = store.scan(0, "*", 10).unwrap();
    assert_eq!(cursor, 0);
    assert!(keys.is_empty());
}

proptest! {
    #[test]
    fn scan_visits_every_matching_key_once(n in 0usize..60, count in 1usize..17) {
        let store = InMemoryStore::new();
        for i in 0..n {
            store.set(&format!("staged:{i}"), "v", None).unwrap();
            store.set(&format!("other:{i}"), "v", None).unwrap();
        }
        let mut cursor = 0u64;
        let mut seen = Vec::new();
        loop {
            let (next, keys) = store.scan(cursor, "staged:*", count).unwrap();
            prop_assert!(keys.len() <= count);
            seen.extend(keys);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        let unique: BTreeSet<_> = seen.iter().cloned().collect();
        prop_assert_eq!(unique.len(), seen.len());
        prop_assert_eq!(seen.len(), n);
    }
}

// --- Lists ---

#[test]
fn rpush_lpop_is_fifo() {
    let store = InMemoryStore::new();
    for v in ["a", "b", "c"] {
        store.rpush("q", v).unwrap();
    }
    assert_eq!(store.llen("q").unwrap(), 3);
    assert_eq!(store.lpop("q").unwrap().as_deref(), Some("a"));
    assert_eq!(store.lpop("q").unwrap().as_deref(), Some("b"));
    assert_eq!(store.lpop("q").unwrap().as_deref(), Some("c"));
    assert_eq!(store.lpop("q").unwrap(), None);
    assert!(!store.exists("q").unwrap());
}

#[test]
fn lpush_inserts_at_head() {
    let store = InMemoryStore::new();
    store.rpush("q", "tail").unwrap();
    assert_eq!(store.lpush("q", "head").unwrap(), 2);
    assert_eq!(store.lrange("q", 0, -1).unwrap(), vec!["head", "tail"]);
}

#[test]
fn lrange_handles_negative_and_out_of_range_indexes() {
    let store = InMemoryStore::new();
    for v in ["a", "b", "c", "d"] {
        store.rpush("l", v).unwrap();
    }
    assert_eq!(store.lrange("l", 1, 2).unwrap(), vec!["b", "c"]);
    assert_eq!(store.lrange("l", -2, -1).unwrap(), vec!["c", "d"]);
    assert_eq!(store.lrange("l", 0, 100).unwrap().len(), 4);
    assert!(store.lrange("l", 3, 1).unwrap().is_empty());
    assert!(store.lrange("missing", 0, -1).unwrap().is_empty());
}

#[test]
fn blpop_times_out_on_empty_list() {
    let store = InMemoryStore::new();
    let started = Instant::now();
    assert_eq!(store.blpop("q", Duration::from_millis(50)).unwrap(), None);
    assert!(started.elapsed() >= Duration::from_millis(50));
}

#[test]
fn blpop_zero_timeout_does_not_wait() {
    let store = InMemoryStore::new();
    let started = Instant::now();
    assert_eq!(store.blpop("q", Duration::ZERO).unwrap(), None);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn blpop_wakes_on_push_from_another_thread() {
    let store = Arc::new(InMemoryStore::new());
    let waiter = {
        let store = store.clone();
        thread::spawn(move || store.blpop("q", Duration::from_secs(5)).unwrap())
    };
    thread::sleep(Duration::from_millis(30));
    store.rpush("q", "job").unwrap();
    assert_eq!(waiter.join().unwrap().as_deref(), Some("job"));
}

// --- Sorted sets ---

#[test]
fn zrangebyscore_orders_and_pages() {
    let store = InMemoryStore::new();
    assert!(store.zadd("z", "c", 3.0).unwrap());
    assert!(store.zadd("z", "a", 1.0).unwrap());
    assert!(store.zadd("z", "b", 2.0).unwrap());
    assert!(store.zadd("z", "b2", 2.0).unwrap());
    assert!(!store.zadd("z", "a", 1.5).unwrap());

    let all = store
        .zrangebyscore("z", f64::NEG_INFINITY, f64::INFINITY, 0, None)
        .unwrap();
    let names: Vec<_> = all.iter().map(|(m, _)| m.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "b2", "c"]);
    assert_eq!(all[0].1, 1.5);

    let window = store.zrangebyscore("z", 1.5, 2.0, 1, Some(2)).unwrap();
    let names: Vec<_> = window.iter().map(|(m, _)| m.as_str()).collect();
    assert_eq!(names, vec!["b", "b2"]);

    assert_eq!(store.zcount("z", 2.0, 3.0).unwrap(), 3);
    assert_eq!(store.zcount("missing", 0.0, 1.0).unwrap(), 0);
}

// --- Streams ---

#[test]
fn stream_ids_strictly_increase() {
    let store = InMemoryStore::new();
    let mut last = StreamId::ZERO;
    for i in 0..50 {
        let id = store
            .xadd("s", &fields(&[("n", &i.to_string())]), None)
            .unwrap();
        assert!(id > last);
        last = id;
    }
}

#[test]
fn xadd_trims_oldest_entries() {
    let store = InMemoryStore::new();
    for i in 0..10 {
        store
            .xadd("s", &fields(&[("n", &i.to_string())]), Some(3))
            .unwrap();
    }
    let entries = store.xrange("s", StreamId::ZERO, 100).unwrap();
    let ns: Vec<_> = entries.iter().filter_map(|e| e.field("n")).collect();
    assert_eq!(ns, vec!["7", "8", "9"]);
}

#[test]
fn xrange_is_exclusive_of_after() {
    let store = InMemoryStore::new();
    let first = store.xadd("s", &fields(&[("n", "1")]), None).unwrap();
    store.xadd("s", &fields(&[("n", "2")]), None).unwrap();
    store.xadd("s", &fields(&[("n", "3")]), None).unwrap();

    let rest = store.xrange("s", first, 100).unwrap();
    assert_eq!(rest.len(), 2);
    assert_eq!(rest[0].field("n"), Some("2"));
    assert_eq!(store.xrange("s", first, 1).unwrap().len(), 1);
}

#[test]
fn xread_from_tail_sees_only_new_entries() {
    let store = Arc::new(InMemoryStore::new());
    store.xadd("s", &fields(&[("n", "old")]), None).unwrap();

    let reader = {
        let store = store.clone();
        thread::spawn(move || {
            store
                .xread("s", None, Some(Duration::from_secs(5)), 10)
                .unwrap()
        })
    };
    thread::sleep(Duration::from_millis(30));
    store.xadd("s", &fields(&[("n", "new")]), None).unwrap();

    let entries = reader.join().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].field("n"), Some("new"));
}

#[test]
fn xread_without_block_returns_immediately() {
    let store = InMemoryStore::new();
    assert!(store.xread("s", None, None, 10).unwrap().is_empty());
    let started = Instant::now();
    assert!(store
        .xread("s", Some(StreamId::ZERO), Some(Duration::from_millis(20)), 10)
        .unwrap()
        .is_empty());
    assert!(started.elapsed() >= Duration::from_millis(20));
}

// --- Watched transactions ---

#[test]
fn watched_transaction_commits_when_untouched() {
    let store = InMemoryStore::new();
    store.set("p", "v1", None).unwrap();
    let mut tx = store.watch(&["p"]).unwrap();
    assert_eq!(tx.get("p").unwrap().as_deref(), Some("v1"));
    let outcome = tx
        .exec(&[StoreOp::delete("p"), StoreOp::set("promoted", "v1", None)])
        .unwrap();
    assert_eq!(outcome, TxOutcome::Committed(vec![true, true]));
    drop(tx);
    assert!(!store.exists("p").unwrap());
}

#[test]
fn watched_transaction_conflicts_on_concurrent_write() {
    let store = InMemoryStore::new();
    store.set("p", "v1", None).unwrap();
    let mut tx = store.watch(&["p"]).unwrap();
    store.set("p", "v2", None).unwrap();
    assert_eq!(
        tx.exec(&[StoreOp::delete("p")]).unwrap(),
        TxOutcome::Conflict
    );
    drop(tx);
    assert_eq!(store.get("p").unwrap().as_deref(), Some("v2"));
}

#[test]
fn watch_sees_delete_of_missing_key_as_unchanged() {
    let store = InMemoryStore::new();
    let mut tx = store.watch(&["nothing"]).unwrap();
    assert_eq!(tx.get("nothing").unwrap(), None);
    assert_eq!(
        tx.exec(&[StoreOp::set("nothing", "now", None)]).unwrap(),
        TxOutcome::Committed(vec![true])
    );
}

#[test]
fn ping_and_backend_name() {
    let store = InMemoryStore::new();
    assert!(store.ping().unwrap());
    assert_eq!(store.backend_name(), "memory");
    assert!(store.is_empty().unwrap());
}
