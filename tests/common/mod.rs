#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use subtrack_core::{
    services::FixedClock,
    storage::{JsonFileStore, MemoryStore},
    BillingCycle, SubscriptionDraft, SubscriptionStore,
};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn today() -> NaiveDate {
    date(2025, 1, 20)
}

/// Store over an in-memory backend, with the clock pinned to [`today`].
pub fn memory_store() -> (SubscriptionStore, Arc<MemoryStore>) {
    let backend = Arc::new(MemoryStore::new());
    let store = SubscriptionStore::with_clock(backend.clone(), Arc::new(FixedClock::on(today())));
    (store, backend)
}

/// Store over a JSON file inside a fresh temp directory.
pub fn file_store() -> (SubscriptionStore, JsonFileStore) {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().join("subscriptions.json");
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let backend = JsonFileStore::new(path).expect("create json file store");
    let store = SubscriptionStore::with_clock(
        Arc::new(backend.clone()),
        Arc::new(FixedClock::on(today())),
    );
    (store, backend)
}

pub fn netflix() -> SubscriptionDraft {
    SubscriptionDraft::new("Netflix", 15.99, "Streaming", date(2025, 1, 1))
        .with_currency("USD")
        .with_cycle(BillingCycle::Monthly)
}

pub fn spotify() -> SubscriptionDraft {
    SubscriptionDraft::new("Spotify", 9.99, "Music", date(2025, 1, 15))
        .with_currency("USD")
        .with_cycle(BillingCycle::Monthly)
}
