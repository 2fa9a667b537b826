//! Integration tests for storage-backed stores

#![allow(clippy::unwrap_used)]

use offerdesk_core::environment::StateStorage;
use offerdesk_core::persistence::{Persist, VersionCheck};
use offerdesk_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use offerdesk_runtime::{Hydration, Store, StoreConfig, StoreError};
use offerdesk_testing::{FailingStorage, InMemoryStorage};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
struct Counter {
    count: u32,
    /// Never persisted
    busy: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct CounterSnapshot {
    count: u32,
}

impl Persist for Counter {
    type Snapshot = CounterSnapshot;
    const KEY: &'static str = "counter";
    const VERSION: u32 = 2;

    fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot { count: self.count }
    }

    fn restore(base: Self, snapshot: CounterSnapshot) -> Self {
        Self {
            count: snapshot.count,
            ..base
        }
    }
}

#[derive(Debug, Clone)]
enum CounterAction {
    Increment,
    SetBusy(bool),
}

struct CounterReducer;

impl Reducer for CounterReducer {
    type State = Counter;
    type Action = CounterAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Counter,
        action: CounterAction,
        _env: &(),
    ) -> SmallVec<[Effect<CounterAction>; 4]> {
        match action {
            CounterAction::Increment => state.count += 1,
            CounterAction::SetBusy(busy) => state.busy = busy,
        }
        smallvec![Effect::None]
    }
}

type CounterStore = Store<Counter, CounterAction, (), CounterReducer>;

fn open(storage: &InMemoryStorage, config: &StoreConfig) -> CounterStore {
    offerdesk_testing::init_test_tracing();
    let storage: Arc<dyn StateStorage> = Arc::new(storage.clone());
    Store::with_persistence(Counter::default(), CounterReducer, (), storage, config)
}

#[test]
fn every_commit_writes_the_whitelisted_projection() {
    let storage = InMemoryStorage::new();
    let store = open(&storage, &StoreConfig::default());

    store.send(CounterAction::Increment).unwrap();
    store.send(CounterAction::SetBusy(true)).unwrap();

    let stored = storage.json("counter").unwrap();
    assert_eq!(stored["version"], 2);
    assert_eq!(stored["state"]["count"], 1);
    assert!(stored["state"].get("busy").is_none());
}

#[test]
fn construction_merges_snapshot_over_defaults() {
    let storage = InMemoryStorage::with_entry("counter", r#"{"version":2,"state":{"count":5}}"#);
    let store = open(&storage, &StoreConfig::default());

    assert_eq!(store.snapshot(), Counter { count: 5, busy: false });
    assert_eq!(store.rehydrate(), Hydration::Restored(VersionCheck::Current));
}

#[test]
fn version_mismatch_still_merges() {
    let storage = InMemoryStorage::with_entry(
        "counter",
        r#"{"version":1,"state":{"count":3,"legacy":true}}"#,
    );
    let store = open(&storage, &StoreConfig::default());

    assert_eq!(store.state(|s| s.count), 3);
    assert_eq!(
        store.rehydrate(),
        Hydration::Restored(VersionCheck::Mismatch { stored: 1, current: 2 })
    );
}

#[test]
fn unreadable_snapshot_falls_back_to_defaults() {
    let storage = InMemoryStorage::with_entry("counter", "{not json");
    let store = open(&storage, &StoreConfig::default());

    assert_eq!(store.snapshot(), Counter::default());
    assert_eq!(store.rehydrate(), Hydration::Fallback);
}

#[test]
fn empty_storage_reports_empty() {
    let store = open(&InMemoryStorage::new(), &StoreConfig::default());
    assert_eq!(store.rehydrate(), Hydration::Empty);
}

#[test]
fn storage_key_can_be_overridden() {
    let storage = InMemoryStorage::new();
    let store = open(&storage, &StoreConfig::default().with_storage_key("counter-test"));

    store.send(CounterAction::Increment).unwrap();

    assert!(storage.contains_key("counter-test"));
    assert!(!storage.contains_key("counter"));
}

#[test]
fn deferred_writes_happen_on_flush_and_shutdown() {
    let storage = InMemoryStorage::new();
    let store = open(&storage, &StoreConfig::default().with_persist_on_commit(false));

    store.send(CounterAction::Increment).unwrap();
    assert!(!storage.contains_key("counter"));

    store.flush().unwrap();
    assert_eq!(storage.json("counter").unwrap()["state"]["count"], 1);

    store.send(CounterAction::Increment).unwrap();
    store.shutdown().unwrap();
    assert_eq!(storage.json("counter").unwrap()["state"]["count"], 2);
}

#[test]
fn write_failures_do_not_block_commits() {
    offerdesk_testing::init_test_tracing();
    let storage: Arc<dyn StateStorage> = Arc::new(FailingStorage);
    let store = Store::with_persistence(
        Counter::default(),
        CounterReducer,
        (),
        storage,
        &StoreConfig::default(),
    );

    store.send(CounterAction::Increment).unwrap();

    assert_eq!(store.state(|s| s.count), 1);
    assert!(matches!(store.flush(), Err(StoreError::Storage(_))));
    assert_eq!(store.rehydrate(), Hydration::Fallback);
}

#[test]
fn rehydrate_picks_up_external_writes_and_notifies() {
    let storage = InMemoryStorage::new();
    let store = open(&storage, &StoreConfig::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let _subscription = store.subscribe(move |current: &Counter, previous: &Counter| {
        assert_eq!((previous.count, current.count), (0, 9));
        counter.fetch_add(1, Ordering::SeqCst);
    });

    storage.save("counter", r#"{"version":2,"state":{"count":9}}"#).unwrap();

    assert_eq!(store.rehydrate(), Hydration::Restored(VersionCheck::Current));
    assert_eq!(store.state(|s| s.count), 9);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
