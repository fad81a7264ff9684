//! Integration tests for Estimator

use std::convert::Infallible;
use std::io;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use estimator::{
    Error, FileStorage, Item, ItemStore, KeyValue, MemoryStorage, SequentialIds, STORAGE_KEY,
};
use proptest::prelude::*;
use tempfile::TempDir;

fn memory_store() -> ItemStore<MemoryStorage> {
    ItemStore::with_ids(MemoryStorage::new(), Box::new(SequentialIds::new())).unwrap()
}

fn persisted<S: KeyValue>(store: &ItemStore<S>) -> Vec<Item> {
    let json = store.storage().get(STORAGE_KEY).unwrap().unwrap();
    serde_json::from_str(&json).unwrap()
}

/// Storage whose writes can be switched to fail.
#[derive(Default)]
struct FlakyStorage {
    inner: MemoryStorage,
    failing: AtomicBool,
}

impl KeyValue for FlakyStorage {
    type Error = io::Error;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let value: Result<_, Infallible> = self.inner.get(key);
        Ok(value.unwrap_or_else(|never| match never {}))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(io::Error::other("quota exceeded"));
        }
        let result: Result<(), Infallible> = self.inner.set(key, value);
        Ok(result.unwrap_or_else(|never| match never {}))
    }
}

#[test]
fn add_order_check() {
    let store = memory_store();

    store.add("Wood", 5.0).unwrap();
    store.add("Glue", 2.0).unwrap();

    let items = store.items();
    let summary: Vec<(&str, f64)> = items
        .iter()
        .map(|item| (item.name.as_str(), item.price))
        .collect();
    assert_eq!(summary, vec![("Glue", 2.0), ("Wood", 5.0)]);
    assert_ne!(items[0].id, items[1].id);
}

#[test]
fn default_ids_are_unique_for_rapid_adds() {
    let store = ItemStore::open(MemoryStorage::new()).unwrap();

    for i in 0..200 {
        store.add(format!("item {i}"), 1.0).unwrap();
    }

    let mut ids: Vec<u64> = store.items().iter().map(|item| item.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 200);
}

#[test]
fn edit_in_place() {
    let store = memory_store();
    let wood = store.add("Wood", 5.0).unwrap();
    let glue = store.add("Glue", 2.0).unwrap();
    let tape = store.add("Tape", 1.0).unwrap();

    assert!(store.edit(glue, "Nails", 3.0).unwrap());

    assert_eq!(
        store.items(),
        vec![
            Item::new(tape, "Tape", 1.0),
            Item::new(glue, "Nails", 3.0),
            Item::new(wood, "Wood", 5.0),
        ]
    );

    let before = store.items();
    assert!(!store.edit(4242, "Nails", 3.0).unwrap());
    assert_eq!(store.items(), before);
}

#[test]
fn delete_row_removes_exactly_one() {
    let store = memory_store();
    let wood = store.add("Wood", 5.0).unwrap();
    let glue = store.add("Glue", 2.0).unwrap();
    let tape = store.add("Tape", 1.0).unwrap();

    assert!(store.delete_row(glue).unwrap());
    assert_eq!(
        store.items(),
        vec![Item::new(tape, "Tape", 1.0), Item::new(wood, "Wood", 5.0)]
    );

    assert!(!store.delete_row(glue).unwrap());
    assert_eq!(store.len(), 2);
}

#[test]
fn snapshot_round_trips_after_every_mutation() {
    let store = memory_store();

    let wood = store.add("Wood", 5.0).unwrap();
    assert_eq!(persisted(&store), store.items());
    let glue = store.add("Glue", 2.25).unwrap();
    assert_eq!(persisted(&store), store.items());
    store.edit(wood, "Oak", 12.5).unwrap();
    assert_eq!(persisted(&store), store.items());
    store.delete_row(glue).unwrap();
    assert_eq!(persisted(&store), store.items());
}

#[test]
fn opens_existing_snapshot() {
    let storage = MemoryStorage::with_entry(STORAGE_KEY, r#"[{"id":1,"name":"Wood","price":5}]"#);

    let store = ItemStore::open(storage).unwrap();

    assert_eq!(store.items(), vec![Item::new(1, "Wood", 5.0)]);
}

#[test]
fn malformed_snapshot_fails_to_open() {
    let storage = MemoryStorage::with_entry(STORAGE_KEY, r#"[{"id":"one"}]"#);

    match ItemStore::open(storage) {
        Err(Error::Corrupt { key, .. }) => assert_eq!(key, STORAGE_KEY),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("malformed snapshot was accepted"),
    }
}

#[test]
fn observers_follow_every_mutation() {
    let store = memory_store();
    let first = Arc::new(Mutex::new(Vec::new()));
    let second = Arc::new(AtomicUsize::new(0));

    let _first = store.subscribe({
        let first = first.clone();
        move |items| first.lock().unwrap().push(items.to_vec())
    });
    let _second = store.subscribe({
        let second = second.clone();
        move |_| {
            second.fetch_add(1, Ordering::SeqCst);
        }
    });

    let wood = store.add("Wood", 5.0).unwrap();
    store.edit(wood, "Oak", 6.0).unwrap();
    store.delete_row(wood).unwrap();

    let first = first.lock().unwrap();
    assert_eq!(
        *first,
        vec![
            vec![],
            vec![Item::new(wood, "Wood", 5.0)],
            vec![Item::new(wood, "Oak", 6.0)],
            vec![],
        ]
    );
    assert_eq!(second.load(Ordering::SeqCst), 4);
}

#[test]
fn unsubscribed_observer_hears_nothing_more() {
    let store = memory_store();
    let calls = Arc::new(AtomicUsize::new(0));

    let subscription = store.subscribe({
        let calls = calls.clone();
        move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
        }
    });
    store.add("Wood", 5.0).unwrap();
    subscription.unsubscribe();
    store.add("Glue", 2.0).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn failed_write_leaves_list_and_observers_untouched() {
    let store = ItemStore::with_ids(FlakyStorage::default(), Box::new(SequentialIds::new())).unwrap();
    let wood = store.add("Wood", 5.0).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let _subscription = store.subscribe({
        let calls = calls.clone();
        move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
        }
    });

    store.storage().failing.store(true, Ordering::SeqCst);

    assert!(matches!(store.add("Glue", 2.0), Err(Error::Storage(_))));
    assert!(matches!(store.edit(wood, "Oak", 9.0), Err(Error::Storage(_))));
    assert!(matches!(store.delete_row(wood), Err(Error::Storage(_))));

    assert_eq!(store.items(), vec![Item::new(wood, "Wood", 5.0)]);
    assert_eq!(persisted(&store), store.items());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn non_finite_price_is_refused_and_slot_stays_loadable() {
    let store = memory_store();
    let wood = store.add("Wood", 5.0).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let _subscription = store.subscribe({
        let calls = calls.clone();
        move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
        }
    });

    assert!(matches!(
        store.add("Glue", f64::INFINITY),
        Err(Error::NonFinitePrice { .. })
    ));
    assert!(matches!(
        store.edit(wood, "Oak", f64::NAN),
        Err(Error::NonFinitePrice { id, .. }) if id == wood
    ));

    assert_eq!(store.items(), vec![Item::new(wood, "Wood", 5.0)]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let reopened = ItemStore::open(store.into_storage()).unwrap();
    assert_eq!(reopened.items(), vec![Item::new(wood, "Wood", 5.0)]);
}

#[test]
fn file_storage_survives_reopen() {
    let dir = TempDir::new().unwrap();

    let (wood, glue) = {
        let store = ItemStore::open(FileStorage::open(dir.path()).unwrap()).unwrap();
        let wood = store.add("Wood", 5.0).unwrap();
        let glue = store.add("Glue", 2.0).unwrap();
        (wood, glue)
    };

    let store = ItemStore::open(FileStorage::open(dir.path()).unwrap()).unwrap();
    assert_eq!(
        store.items(),
        vec![Item::new(glue, "Glue", 2.0), Item::new(wood, "Wood", 5.0)]
    );

    let tape = store.add("Tape", 1.0).unwrap();
    assert!(tape > glue);
}

#[test]
fn reopening_shared_storage() {
    let store = memory_store();
    store.add("Wood", 5.0).unwrap();
    let items = store.items();

    let reopened = ItemStore::open(store.into_storage()).unwrap();

    assert_eq!(reopened.items(), items);
}

proptest! {
    #[test]
    fn adds_are_most_recent_first(names in proptest::collection::vec("[a-z]{1,8}", 0..40)) {
        let store = memory_store();

        for name in &names {
            store.add(name.clone(), 1.0).unwrap();
        }

        let stored: Vec<String> = store.items().into_iter().map(|item| item.name).collect();
        let expected: Vec<String> = names.iter().rev().cloned().collect();
        prop_assert_eq!(stored, expected);
    }
}
