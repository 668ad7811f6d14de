//! End-to-end invalidation flow
//!
//! Readers run queries against a snapshot, record their read traces into
//! private indexes and merge them into a shared index. A mutation hashes the
//! traces it touched and asks the shared index which subscribers to rerun.
//! The next snapshot's cache is seeded from the previous one minus the
//! changed entries.

use std::sync::{Arc, Mutex};
use std::thread;

use entitrace_cache::{InvalidationListener, SnapshotCacheConfig, TracedSnapshotCache};
use entitrace_common::{init_logging, LogLevel};
use entitrace_index::{
    hash_traces, EntityId, ReadTrace, ReadTraceIndex, ReadTracker, SharedReadTraceIndex,
    SubscriberId,
};

const MODULE_TYPE: u32 = 1;
const LIBRARY_TYPE: u32 = 2;

/// Reads one subscriber performs against the storage
fn reads_of(subscriber: u64) -> Vec<ReadTrace> {
    match subscriber % 3 {
        0 => vec![ReadTrace::entities_of_type(MODULE_TYPE)],
        1 => vec![
            ReadTrace::resolve(format!("module:m{}", subscriber)),
            ReadTrace::field_access(EntityId::new(MODULE_TYPE, subscriber as u32), "dependencies"),
        ],
        _ => vec![
            ReadTrace::entities_of_type(LIBRARY_TYPE),
            ReadTrace::referrers_of("library:junit", MODULE_TYPE),
        ],
    }
}

fn run_reader(shared: SharedReadTraceIndex<SubscriberId>, subscribers: Vec<u64>) {
    let mut scratch = ReadTraceIndex::new();
    for subscriber in subscribers {
        let mut tracker = ReadTracker::new();
        for read in reads_of(subscriber) {
            tracker.record(&read);
        }
        scratch.set(tracker.into_traces(), SubscriberId(subscriber));
    }
    shared.pull_from(&scratch);
}

#[test]
fn concurrent_readers_then_mutation() {
    init_logging(LogLevel::Debug);

    let shared: SharedReadTraceIndex<SubscriberId> = SharedReadTraceIndex::new();
    let handles: Vec<_> = (0..3u64)
        .map(|reader| {
            let shared = shared.clone();
            let subscribers = (0..30u64).filter(|s| s % 3 == reader).collect();
            thread::spawn(move || run_reader(shared, subscribers))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(shared.consumer_count(), 30);
    shared.check_consistency().unwrap();

    // Adding a module invalidates every subscriber that listed modules
    let changed = hash_traces(&[ReadTrace::entities_of_type(MODULE_TYPE)]);
    let affected = shared.get_many(&changed);
    assert_eq!(affected.len(), 10);
    assert!(affected.iter().all(|id| id.0 % 3 == 0));

    // Renaming one module reaches exactly its resolver
    let changed = hash_traces(&[ReadTrace::resolve("module:m4")]);
    let affected: Vec<_> = shared.get_many(&changed).into_iter().collect();
    assert_eq!(affected, vec![SubscriberId(4)]);

    // A rerun subscriber that no longer reads anything drops out
    shared.set(Default::default(), SubscriberId(4));
    assert!(shared.get_many(&changed).is_empty());
    shared.check_consistency().unwrap();
}

#[derive(Default)]
struct RerunQueue {
    queries: Mutex<Vec<String>>,
}

impl InvalidationListener<String> for RerunQueue {
    fn on_invalidated(&self, queries: &[String]) -> entitrace_cache::Result<()> {
        self.queries.lock().unwrap().extend(queries.iter().cloned());
        Ok(())
    }
}

fn module_count(tracker: &mut ReadTracker, modules: &[&str]) -> usize {
    tracker.record(&ReadTrace::entities_of_type(MODULE_TYPE));
    modules.len()
}

fn junit_users(tracker: &mut ReadTracker, users: &[&str]) -> usize {
    tracker.record(&ReadTrace::referrers_of("library:junit", MODULE_TYPE));
    users.len()
}

#[test]
fn snapshot_cache_hand_over() {
    init_logging(LogLevel::Debug);

    let config = SnapshotCacheConfig::from_toml_str("verify_consistency = true\n").unwrap();
    let mut first: TracedSnapshotCache<String, usize> = TracedSnapshotCache::with_config(config.clone());

    let modules = ["core", "app"];
    let junit = ["app"];
    assert_eq!(
        first
            .cached("module-count".to_string(), |t| module_count(t, &modules))
            .value,
        2
    );
    assert_eq!(
        first
            .cached("junit-users".to_string(), |t| junit_users(t, &junit))
            .value,
        1
    );

    // Builder adds a module; only the module listing changed
    let changes = hash_traces(&[ReadTrace::entities_of_type(MODULE_TYPE)]);
    let queue = Arc::new(RerunQueue::default());
    let mut second: TracedSnapshotCache<String, usize> = TracedSnapshotCache::with_config(config);
    second.add_listener("rerun-queue", 100, queue.clone());
    second.pull_cache(&first, &changes);

    assert_eq!(*queue.queries.lock().unwrap(), vec!["module-count".to_string()]);

    let users = second.cached("junit-users".to_string(), |_| unreachable!("still cached"));
    assert!(users.from_cache);

    let modules = ["core", "app", "tests"];
    let count = second.cached("module-count".to_string(), |t| module_count(t, &modules));
    assert!(!count.from_cache);
    assert_eq!(count.value, 3);

    // The first snapshot still answers with its own view
    assert_eq!(first.peek(&"module-count".to_string()), Some(&2));
}
