use raidtracker_core::{
    KeyValueStore, MemoryKvStore, ParticipantRecord, RecordStore, StoreError, Tier, CATALOG,
    RECORDS_KEY,
};
use serde_json::{json, Value};

fn persisted(kv: &MemoryKvStore) -> Vec<ParticipantRecord> {
    let raw = kv.get(RECORDS_KEY).unwrap().expect("records should be persisted");
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn add_trims_name_and_starts_unmarked() {
    let kv = MemoryKvStore::new();
    let mut store = RecordStore::load(&kv).unwrap();

    let index = store.add("  Thrall  ").unwrap();
    assert_eq!(index, Some(0));

    let record = &store.records()[0];
    assert_eq!(record.name, "Thrall");
    assert_eq!(record.gear_score, "");
    assert_eq!(record.completion.marked_count(), 0);
    assert_eq!(record.completion.iter().count(), CATALOG.len());
    assert_eq!(persisted(&kv), store.records());
}

#[test]
fn add_with_blank_name_is_a_no_op() {
    let kv = MemoryKvStore::new();
    let mut store = RecordStore::load(&kv).unwrap();
    store.add("Jaina").unwrap();

    assert_eq!(store.add("").unwrap(), None);
    assert_eq!(store.add(" \t\n ").unwrap(), None);
    assert_eq!(store.len(), 1);
    assert_eq!(persisted(&kv).len(), 1);
}

#[test]
fn add_preserves_insertion_order() {
    let kv = MemoryKvStore::new();
    let mut store = RecordStore::load(&kv).unwrap();
    for name in ["Thrall", "Jaina", "Arthas"] {
        store.add(name).unwrap();
    }

    let names = store
        .records()
        .iter()
        .map(|r| r.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, ["Thrall", "Jaina", "Arthas"]);
}

#[test]
fn update_name_and_score_write_through() {
    let kv = MemoryKvStore::new();
    let mut store = RecordStore::load(&kv).unwrap();
    store.add("Thrall").unwrap();

    store.update_name(0, "").unwrap();
    store.update_score(0, "about 5.8k").unwrap();

    assert_eq!(store.records()[0].name, "");
    assert_eq!(store.records()[0].gear_score, "about 5.8k");
    let saved = persisted(&kv);
    assert_eq!(saved[0].name, "");
    assert_eq!(saved[0].gear_score, "about 5.8k");
}

#[test]
fn out_of_range_index_is_reported_and_changes_nothing() {
    let kv = MemoryKvStore::new();
    let mut store = RecordStore::load(&kv).unwrap();
    store.add("Thrall").unwrap();
    let before = kv.get(RECORDS_KEY).unwrap();

    let err = store.update_name(1, "Ghost").unwrap_err();
    assert!(matches!(err, StoreError::RecordNotFound { index: 1, len: 1 }));
    assert!(matches!(
        store.update_score(5, "1").unwrap_err(),
        StoreError::RecordNotFound { index: 5, .. }
    ));
    assert!(matches!(
        store.toggle_completion(9, "ICC", Tier::Ten).unwrap_err(),
        StoreError::RecordNotFound { .. }
    ));

    assert_eq!(store.records()[0].name, "Thrall");
    assert_eq!(kv.get(RECORDS_KEY).unwrap(), before);
}

#[test]
fn toggle_flips_exactly_one_mark() {
    let kv = MemoryKvStore::new();
    let mut store = RecordStore::load(&kv).unwrap();
    store.add("Thrall").unwrap();
    store.add("Jaina").unwrap();
    let untouched = store.records()[1].clone();

    assert!(store.toggle_completion(0, "ICC", Tier::TwentyFive).unwrap());

    let marks = &store.records()[0].completion;
    assert_eq!(marks.is_marked("ICC", Tier::TwentyFive), Some(true));
    assert_eq!(marks.is_marked("ICC", Tier::Ten), Some(false));
    assert_eq!(marks.marked_count(), 1);
    assert_eq!(store.records()[1], untouched);

    assert!(!store.toggle_completion(0, "ICC", Tier::TwentyFive).unwrap());
    assert_eq!(store.records()[0].completion.marked_count(), 0);
    assert_eq!(persisted(&kv), store.records());
}

#[test]
fn toggle_rejects_activity_outside_catalog() {
    let kv = MemoryKvStore::new();
    let mut store = RecordStore::load(&kv).unwrap();
    store.add("Thrall").unwrap();

    let err = store.toggle_completion(0, "Karazhan", Tier::Ten).unwrap_err();
    assert!(matches!(err, StoreError::UnknownActivity(ref id) if id == "Karazhan"));
}

#[test]
fn reset_all_clears_marks_and_keeps_everything_else() {
    let kv = MemoryKvStore::new();
    let mut store = RecordStore::load(&kv).unwrap();
    store.add("Thrall").unwrap();
    store.add("Jaina").unwrap();
    store.update_score(0, "5800").unwrap();
    store.toggle_completion(0, "VOA", Tier::Ten).unwrap();
    store.toggle_completion(0, "Naxx", Tier::TwentyFive).unwrap();
    store.toggle_completion(1, "Ulduar", Tier::Ten).unwrap();

    assert_eq!(store.reset_all().unwrap(), 3);

    let records = store.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Thrall");
    assert_eq!(records[0].gear_score, "5800");
    assert_eq!(records[1].name, "Jaina");
    assert!(records.iter().all(|r| r.completion.marked_count() == 0));
    assert_eq!(persisted(&kv), records);
}

#[test]
fn reset_all_leaves_no_true_mark_in_saved_raids() {
    let payload = json!([{
        "name": "Sylvanas",
        "gearScore": "",
        "raids": { "Onyxia": { "10": true, "25": true }, "RS": { "10": true, "25": false } }
    }]);
    let kv = MemoryKvStore::with_entries([(RECORDS_KEY, payload.to_string())]);
    let mut store = RecordStore::load(&kv).unwrap();

    store.reset_all().unwrap();

    let saved: Value = serde_json::from_str(&kv.get(RECORDS_KEY).unwrap().unwrap()).unwrap();
    let raids = saved[0]["raids"].as_object().unwrap();
    assert_eq!(raids.len(), CATALOG.len());
    assert!(!raids.contains_key("Onyxia"));
    for tiers in raids.values() {
        assert_eq!(tiers, &json!({ "10": false, "25": false }));
    }
    assert_eq!(saved[0]["name"], "Sylvanas");
}

#[test]
fn load_keeps_valid_records_next_to_non_objects() {
    let payload = json!([
        { "name": "Thrall", "gearScore": "5800", "raids": {} },
        5,
        null
    ]);
    let kv = MemoryKvStore::with_entries([(RECORDS_KEY, payload.to_string())]);
    let mut store = RecordStore::load(&kv).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.records()[0].name, "Thrall");

    store.add("Jaina").unwrap();

    let names = persisted(&kv)
        .iter()
        .map(|r| r.name.clone())
        .collect::<Vec<_>>();
    assert_eq!(names, ["Thrall", "Jaina"]);
    assert_eq!(persisted(&kv)[0].gear_score, "5800");
}

#[test]
fn load_migrates_stored_records() {
    let payload = json!([
        { "name": "Thrall", "gearScore": "5800", "raids": { "VOA": { "10": true, "25": false } } },
        { "name": "Jaina", "gearScore": "", "raids": null }
    ]);
    let kv = MemoryKvStore::with_entries([(RECORDS_KEY, payload.to_string())]);
    let store = RecordStore::load(&kv).unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(
        store.records()[0].completion.is_marked("VOA", Tier::Ten),
        Some(true)
    );
    assert_eq!(store.records()[1].completion.iter().count(), CATALOG.len());
}

#[test]
fn malformed_payload_loads_as_empty_store() {
    for payload in ["{not json", "null", "{\"name\":\"Thrall\"}", "[null]", "[1, 2]", ""] {
        let kv = MemoryKvStore::with_entries([(RECORDS_KEY, payload)]);
        let store = RecordStore::load(&kv).unwrap();
        assert!(store.is_empty(), "payload {payload:?} should load empty");
    }
}

#[test]
fn reloading_observes_every_write() {
    let kv = MemoryKvStore::new();
    {
        let mut store = RecordStore::load(&kv).unwrap();
        store.add("Thrall").unwrap();
        store.update_score(0, "5800").unwrap();
        store.toggle_completion(0, "TOC", Tier::Ten).unwrap();
    }

    let reloaded = RecordStore::load(&kv).unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.records()[0].gear_score, "5800");
    assert_eq!(
        reloaded.records()[0].completion.is_marked("TOC", Tier::Ten),
        Some(true)
    );
}
