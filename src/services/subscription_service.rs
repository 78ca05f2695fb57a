//! Canonical owner of the subscription collection.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    domain::{Subscription, SubscriptionDraft},
    errors::{StorageError, SubscriptionError},
    services::{
        history::{SpendHistory, HISTORY_KEY},
        metrics::MetricsAggregator,
        time::Clock,
        SystemClock,
    },
    storage::KeyValueStore,
};

pub const SUBSCRIPTIONS_KEY: &str = "@subscriptions";
/// Raw text of a collection slot that was not a JSON array.
pub const QUARANTINE_KEY: &str = "@subscriptions.corrupt";
/// JSON array of individual records that could not be read.
pub const REJECTED_KEY: &str = "@subscriptions.rejected";

pub type StoreResult<T> = Result<T, SubscriptionError>;

/// Result of reading the collection slot.
enum Snapshot {
    Parsed {
        subscriptions: Vec<Subscription>,
        /// Array entries that do not decode as a subscription.
        rejected: Vec<Value>,
    },
    /// The slot held text that is not a JSON array.
    Corrupt(String),
}

/// Collection loaded ahead of a rewrite, plus unreadable content that is
/// set aside in the same write.
struct Loaded {
    subscriptions: Vec<Subscription>,
    set_aside: Vec<(&'static str, String)>,
}

/// Create/read/update/delete access to subscriptions persisted under a
/// single key. Every mutation rewrites the whole collection while holding
/// the store's write lock.
pub struct SubscriptionStore {
    backend: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl SubscriptionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(backend, Arc::new(SystemClock))
    }

    pub fn with_clock(backend: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.backend
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Returns every readable record in insertion order. Unreadable records
    /// are skipped; an unreadable collection yields an empty list.
    pub fn list(&self) -> Vec<Subscription> {
        match self.read_snapshot() {
            Ok(Snapshot::Parsed { subscriptions, rejected }) => {
                if !rejected.is_empty() {
                    warn!(skipped = rejected.len(), "skipping unreadable subscription records");
                }
                debug!(count = subscriptions.len(), "loaded subscriptions");
                subscriptions
            }
            Ok(Snapshot::Corrupt(_)) => {
                warn!("subscription data is corrupt; treating collection as empty");
                Vec::new()
            }
            Err(err) => {
                warn!(error = %err, "failed to read subscriptions; treating collection as empty");
                Vec::new()
            }
        }
    }

    pub fn get_by_id(&self, id: &str) -> Option<Subscription> {
        self.list().into_iter().find(|sub| sub.id == id)
    }

    /// Like [`get_by_id`](Self::get_by_id) but reports an absent id as an error.
    pub fn require(&self, id: &str) -> StoreResult<Subscription> {
        self.get_by_id(id)
            .ok_or_else(|| SubscriptionError::NotFound(id.to_string()))
    }

    pub fn create(&self, draft: SubscriptionDraft) -> StoreResult<Subscription> {
        let subscription = draft.into_subscription(Uuid::new_v4().to_string())?;
        let _guard = self.lock()?;
        let mut loaded = self.load_for_write()?;
        loaded.subscriptions.push(subscription.clone());
        self.persist(loaded)?;
        info!(id = %subscription.id, name = %subscription.name, "subscription created");
        Ok(subscription)
    }

    /// Replaces the stored record with the same id. The renewal date is
    /// re-derived from the record's start date and billing cycle.
    pub fn update(&self, mut record: Subscription) -> StoreResult<()> {
        record.normalize()?;
        let id = record.id.clone();
        let _guard = self.lock()?;
        let mut loaded = self.load_for_write()?;
        let slot = loaded
            .subscriptions
            .iter_mut()
            .find(|sub| sub.id == id)
            .ok_or_else(|| SubscriptionError::NotFound(id.clone()))?;
        *slot = record;
        self.persist(loaded)?;
        info!(id = %id, "subscription updated");
        Ok(())
    }

    /// Removes the record if present. Deleting an unknown id is a no-op.
    pub fn delete(&self, id: &str) -> StoreResult<()> {
        let _guard = self.lock()?;
        let mut loaded = self.load_for_write()?;
        let before = loaded.subscriptions.len();
        loaded.subscriptions.retain(|sub| sub.id != id);
        if loaded.subscriptions.len() == before {
            debug!(id, "delete skipped; subscription not present");
            return Ok(());
        }
        self.persist(loaded)?;
        info!(id, "subscription deleted");
        Ok(())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(|_| {
            SubscriptionError::Storage(StorageError::Backend("store write lock poisoned".into()))
        })
    }

    fn read_snapshot(&self) -> Result<Snapshot, StorageError> {
        let Some(raw) = self.backend.get(SUBSCRIPTIONS_KEY)? else {
            return Ok(Snapshot::Parsed {
                subscriptions: Vec::new(),
                rejected: Vec::new(),
            });
        };
        let Ok(entries) = serde_json::from_str::<Vec<Value>>(&raw) else {
            return Ok(Snapshot::Corrupt(raw));
        };
        let mut subscriptions = Vec::with_capacity(entries.len());
        let mut rejected = Vec::new();
        for entry in entries {
            match Subscription::deserialize(&entry) {
                Ok(subscription) => subscriptions.push(subscription),
                Err(err) => {
                    debug!(error = %err, "unreadable subscription record");
                    rejected.push(entry);
                }
            }
        }
        Ok(Snapshot::Parsed {
            subscriptions,
            rejected,
        })
    }

    /// Reads the collection ahead of a rewrite. Read failures are surfaced
    /// so that a transient error can never cause the data to be overwritten.
    /// Corrupt content and unreadable records are moved aside rather than
    /// dropped.
    fn load_for_write(&self) -> StoreResult<Loaded> {
        match self.read_snapshot()? {
            Snapshot::Parsed {
                subscriptions,
                rejected,
            } if rejected.is_empty() => Ok(Loaded {
                subscriptions,
                set_aside: Vec::new(),
            }),
            Snapshot::Parsed {
                subscriptions,
                rejected,
            } => {
                warn!(
                    key = REJECTED_KEY,
                    count = rejected.len(),
                    "moving unreadable subscription records aside"
                );
                let mut kept = self.previously_rejected()?;
                kept.extend(rejected);
                let json = serde_json::to_string(&kept).map_err(StorageError::from)?;
                Ok(Loaded {
                    subscriptions,
                    set_aside: vec![(REJECTED_KEY, json)],
                })
            }
            Snapshot::Corrupt(raw) => {
                warn!(key = QUARANTINE_KEY, "quarantining corrupt subscription data");
                Ok(Loaded {
                    subscriptions: Vec::new(),
                    set_aside: vec![(QUARANTINE_KEY, raw)],
                })
            }
        }
    }

    fn previously_rejected(&self) -> StoreResult<Vec<Value>> {
        let Some(raw) = self.backend.get(REJECTED_KEY)? else {
            return Ok(Vec::new());
        };
        Ok(serde_json::from_str(&raw).unwrap_or_else(|_| vec![Value::String(raw)]))
    }

    /// Writes the collection, anything set aside, and this month's spend
    /// total in one backend call.
    fn persist(&self, loaded: Loaded) -> StoreResult<()> {
        let json = serde_json::to_string(&loaded.subscriptions).map_err(StorageError::from)?;
        let history = self.next_history(&loaded.subscriptions);

        let mut entries: Vec<(&str, &str)> = loaded
            .set_aside
            .iter()
            .map(|(key, value)| (*key, value.as_str()))
            .collect();
        entries.push((SUBSCRIPTIONS_KEY, json.as_str()));
        if let Some(history) = &history {
            entries.push((HISTORY_KEY, history.as_str()));
        }
        self.backend.set_all(&entries)?;
        Ok(())
    }

    fn next_history(&self, subscriptions: &[Subscription]) -> Option<String> {
        let mut history = SpendHistory::load(&*self.backend);
        history.record(self.clock.today(), MetricsAggregator::total_cost(subscriptions));
        match history.to_json() {
            Ok(json) => Some(json),
            Err(err) => {
                warn!(error = %err, "failed to record spend history");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;

    /// Backend whose reads always fail while writes are recorded.
    #[derive(Default)]
    struct UnreadableStore {
        inner: MemoryStore,
    }

    impl KeyValueStore for UnreadableStore {
        fn get(&self, _key: &str) -> crate::storage::Result<Option<String>> {
            Err(StorageError::Backend("medium unavailable".into()))
        }
        fn set(&self, key: &str, value: &str) -> crate::storage::Result<()> {
            self.inner.set(key, value)
        }
        fn remove(&self, key: &str) -> crate::storage::Result<()> {
            self.inner.remove(key)
        }
        fn keys(&self) -> crate::storage::Result<Vec<String>> {
            self.inner.keys()
        }
        fn clear(&self) -> crate::storage::Result<()> {
            self.inner.clear()
        }
    }

    fn draft(name: &str) -> SubscriptionDraft {
        SubscriptionDraft::new(name, 4.5, "Misc", NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
    }

    #[test]
    fn corrupt_slot_is_quarantined_before_rewrite() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(SUBSCRIPTIONS_KEY, "[{\"broken\":").unwrap();
        let store = SubscriptionStore::new(backend.clone());

        assert!(store.list().is_empty());
        store.create(draft("Fresh")).expect("create over corrupt data");

        assert_eq!(
            backend.get(QUARANTINE_KEY).unwrap().as_deref(),
            Some("[{\"broken\":")
        );
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn read_failure_degrades_list_but_blocks_writes() {
        let backend = Arc::new(UnreadableStore::default());
        let store = SubscriptionStore::new(backend.clone());

        assert!(store.list().is_empty());
        assert!(store.get_by_id("anything").is_none());

        let err = store.create(draft("Blocked")).unwrap_err();
        assert!(matches!(err, SubscriptionError::Storage(_)));
        assert!(backend.inner.get(SUBSCRIPTIONS_KEY).unwrap().is_none());
    }

    #[test]
    fn mutations_record_monthly_history() {
        let backend = Arc::new(MemoryStore::new());
        let clock = Arc::new(crate::services::FixedClock::on(
            NaiveDate::from_ymd_opt(2025, 4, 18).unwrap(),
        ));
        let store = SubscriptionStore::with_clock(backend.clone(), clock);
        store.create(draft("One")).unwrap();
        store.create(draft("Two")).unwrap();

        let history = SpendHistory::load(&*backend);
        assert_eq!(history.points().len(), 1);
        assert_eq!(history.points()[0].total, 9.0);
        assert!(backend.get(HISTORY_KEY).unwrap().is_some());
    }

    #[test]
    fn unreadable_records_are_skipped_then_moved_aside() {
        let backend = Arc::new(MemoryStore::new());
        let good = draft("Kept").into_subscription("1700000000000".into()).unwrap();
        let mut bad = serde_json::to_value(&good).unwrap();
        bad["id"] = "1700000000001".into();
        bad["renewalDate"] = "Invalid date".into();
        let blob = serde_json::to_string(&vec![serde_json::to_value(&good).unwrap(), bad.clone()])
            .unwrap();
        backend.set(SUBSCRIPTIONS_KEY, &blob).unwrap();
        let store = SubscriptionStore::new(backend.clone());

        assert_eq!(store.list(), vec![good.clone()]);

        store.create(draft("Added")).unwrap();
        let rejected: Vec<Value> =
            serde_json::from_str(&backend.get(REJECTED_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(rejected, vec![bad]);
        assert_eq!(store.list().len(), 2);
        assert_eq!(store.list()[0], good);

        store.create(draft("Another")).unwrap();
        let rejected: Vec<Value> =
            serde_json::from_str(&backend.get(REJECTED_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(rejected.len(), 1);
    }
}
