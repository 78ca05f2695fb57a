mod common;

use std::{fs, sync::Arc};

use common::{date, file_store, netflix, spotify, today};
use subtrack_core::{
    export,
    services::{
        history::HISTORY_KEY,
        subscription_service::{QUARANTINE_KEY, REJECTED_KEY, SUBSCRIPTIONS_KEY},
        FixedClock,
    },
    storage::{JsonFileStore, KeyValueStore},
    SubscriptionStore,
};

#[test]
fn records_survive_reopening_the_file() {
    let (store, backend) = file_store();
    let created = store.create(netflix()).unwrap();
    store.create(spotify()).unwrap();

    let reopened = JsonFileStore::new(backend.path()).unwrap();
    let store = SubscriptionStore::with_clock(Arc::new(reopened), Arc::new(FixedClock::on(today())));
    assert_eq!(store.list().len(), 2);
    assert_eq!(store.get_by_id(&created.id).unwrap(), created);
}

#[test]
fn stored_layout_uses_camel_case_fields() {
    let (store, backend) = file_store();
    store.create(netflix()).unwrap();

    let raw = backend.get(SUBSCRIPTIONS_KEY).unwrap().expect("collection written");
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let record = &value[0];
    assert_eq!(record["billingCycle"], "monthly");
    assert_eq!(record["startDate"], "2025-01-01");
    assert_eq!(record["renewalDate"], "2025-02-01");
    assert!(record.get("notes").is_none());
}

#[test]
fn legacy_records_are_read_as_stored() {
    let (store, backend) = file_store();
    let legacy = r#"[{
        "id": "1735689600000",
        "name": "Hulu",
        "cost": 7.99,
        "currency": "USD",
        "billingCycle": "monthly",
        "category": "Streaming",
        "startDate": "2024-12-01",
        "renewalDate": "2025-01-01",
        "notes": ""
    }]"#;
    backend.set(SUBSCRIPTIONS_KEY, legacy).unwrap();

    let subs = store.list();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].id, "1735689600000");
    assert_eq!(subs[0].notes.as_deref(), Some(""));
    assert_eq!(subs[0].renewal_date, date(2025, 1, 1));
}

#[test]
fn corrupt_collection_is_quarantined_on_next_write() {
    let (store, backend) = file_store();
    backend.set(SUBSCRIPTIONS_KEY, "{not json").unwrap();

    assert!(store.list().is_empty());
    store.create(netflix()).unwrap();

    assert_eq!(
        backend.get(QUARANTINE_KEY).unwrap().as_deref(),
        Some("{not json")
    );
    assert_eq!(store.list().len(), 1);
}

#[test]
fn export_then_clear_removes_everything() {
    let (store, backend) = file_store();
    store.create(netflix()).unwrap();

    let bundle = export::export_all(&backend).unwrap();
    assert!(bundle.entries.contains_key(SUBSCRIPTIONS_KEY));
    let target = backend.path().with_file_name("export.json");
    bundle.write_to(&target).unwrap();
    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
    assert!(written[SUBSCRIPTIONS_KEY].is_string());

    export::clear_all(&backend).unwrap();
    assert!(backend.keys().unwrap().is_empty());
    assert!(store.list().is_empty());
}

#[test]
fn backup_holds_the_collection_before_the_last_mutation() {
    let (store, backend) = file_store();
    let first = store.create(netflix()).unwrap();
    store.create(spotify()).unwrap();

    let backup: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(backend.backup_path()).unwrap()).unwrap();
    let before: Vec<serde_json::Value> =
        serde_json::from_str(backup[SUBSCRIPTIONS_KEY].as_str().unwrap()).unwrap();
    assert_eq!(before.len(), 1);
    assert_eq!(before[0]["id"], first.id.as_str());
    assert!(backend.get(HISTORY_KEY).unwrap().is_some());
}

#[test]
fn one_bad_legacy_record_does_not_hide_the_others() {
    let (store, backend) = file_store();
    let legacy = r#"[
        {"id": "1", "name": "Hulu", "cost": 7.99, "currency": "USD",
         "billingCycle": "monthly", "category": "Streaming",
         "startDate": "2024-12-01", "renewalDate": "2025-01-01"},
        {"id": "2", "name": "Typo", "cost": 3.0, "currency": "USD",
         "billingCycle": "monthly", "category": "Misc",
         "startDate": "someday", "renewalDate": "Invalid date"}
    ]"#;
    backend.set(SUBSCRIPTIONS_KEY, legacy).unwrap();

    let names: Vec<_> = store.list().into_iter().map(|sub| sub.name).collect();
    assert_eq!(names, vec!["Hulu"]);

    store.create(netflix()).unwrap();
    assert_eq!(store.list().len(), 2);
    let rejected: serde_json::Value =
        serde_json::from_str(&backend.get(REJECTED_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(rejected[0]["name"], "Typo");
}
