// src/tests/store_tests.rs
use crate::domain::record::Match;
use crate::store::ListingStore;
use crate::tests::utils::{listing, scratch_dir};
use std::fs;

#[test]
fn missing_partition_loads_empty() {
    let dir = scratch_dir("store-missing");
    let store = ListingStore::open(&dir, "17744");
    assert!(store.is_empty());
}

#[test]
fn corrupt_partition_loads_empty() {
    let dir = scratch_dir("store-corrupt");
    fs::write(dir.join("17744.json"), "{not json").unwrap();
    let store = ListingStore::open(&dir, "17744");
    assert!(store.is_empty());
}

#[test]
fn save_and_reload_round_trip() {
    let dir = scratch_dir("store-roundtrip");
    let mut store = ListingStore::open(&dir, "17744");

    let unsearched = listing("100", Some(50.0), Some(2), "Bostadsrätt");

    let mut searched_empty = listing("200", None, None, "Villa");
    searched_empty.matches = Some(Vec::new());
    searched_empty.complete = true;
    searched_empty.try_count = 1;

    let mut matched = listing("300", Some(70.0), Some(5), "Bostadsrätt");
    matched.matches = Some(vec![Match {
        full_match: true,
        area: Some(70.0),
        floor: Some(5),
        apartment: Some("0502".to_string()),
        street_address: "Main St lgh 0502".to_string(),
        name: "Anna".to_string(),
        phone_numbers: vec!["070-1234567".to_string()],
        age: Some(44),
        gender: Some("K".to_string()),
        person_number: Some("19800101-1234".to_string()),
    }]);
    matched.complete = true;
    matched.try_count = 1;

    store.upsert(unsearched.clone());
    store.upsert(searched_empty.clone());
    store.upsert(matched.clone());
    store.save().unwrap();

    let reloaded = ListingStore::open(&dir, "17744");
    assert_eq!(reloaded.len(), 3);
    assert_eq!(reloaded.get("100"), Some(&unsearched));
    assert_eq!(reloaded.get("200"), Some(&searched_empty));
    assert_eq!(reloaded.get("300"), Some(&matched));

    // never-searched vs searched-with-zero-hits survives the round trip
    assert!(reloaded.get("100").unwrap().matches.is_none());
    assert_eq!(
        reloaded.get("200").unwrap().matches.as_ref().map(Vec::len),
        Some(0)
    );
}

#[test]
fn persisted_field_names_are_stable() {
    let dir = scratch_dir("store-fields");
    let mut store = ListingStore::open(&dir, "17744");
    store.upsert(listing("100", Some(50.0), Some(2), "Bostadsrätt"));
    store.save().unwrap();

    let text = fs::read_to_string(dir.join("17744.json")).unwrap();
    for field in [
        "\"id\"",
        "\"city\"",
        "\"street_address\"",
        "\"floor\"",
        "\"area\"",
        "\"extra_area\"",
        "\"house_type\"",
        "\"publication_date\"",
        "\"sold_date\"",
        "\"complete\"",
        "\"try_count\"",
    ] {
        assert!(text.contains(field), "missing field {field}");
    }
    assert!(text.contains("\"matches\": null"));
}

#[test]
fn save_leaves_no_staging_file() {
    let dir = scratch_dir("store-staging");
    let mut store = ListingStore::open(&dir, "17744");
    store.upsert(listing("100", None, None, ""));
    store.save().unwrap();

    let leftovers: Vec<String> = fs::read_dir(&dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "staging files left: {leftovers:?}");
}

#[test]
fn work_picker_takes_first_selectable_in_key_order() {
    let dir = scratch_dir("store-picker");
    let mut store = ListingStore::open(&dir, "17744");

    let mut complete = listing("a", None, None, "");
    complete.matches = Some(Vec::new());
    complete.complete = true;
    complete.try_count = 1;
    store.upsert(complete);

    let mut exhausted = listing("b", None, None, "");
    exhausted.try_count = 3;
    store.upsert(exhausted);

    store.upsert(listing("d", None, None, ""));
    store.upsert(listing("c", None, None, ""));

    assert_eq!(store.next_workable(3).map(|r| r.id.as_str()), Some("c"));
}

#[test]
fn work_picker_reports_no_work() {
    let dir = scratch_dir("store-idle");
    let mut store = ListingStore::open(&dir, "17744");

    let mut complete = listing("a", None, None, "");
    complete.matches = Some(Vec::new());
    complete.complete = true;
    complete.try_count = 1;
    store.upsert(complete);

    let mut exhausted = listing("b", None, None, "");
    exhausted.try_count = 3;
    store.upsert(exhausted);

    assert!(store.next_workable(3).is_none());
}

#[test]
fn ignored_ids_load_best_effort() {
    let dir = scratch_dir("store-ignored");
    assert!(ListingStore::load_ignored(&dir).is_empty());

    fs::write(dir.join("ignored.json"), r#"["111", "222"]"#).unwrap();
    let ignored = ListingStore::load_ignored(&dir);
    assert!(ignored.contains("111"));
    assert!(ignored.contains("222"));
    assert_eq!(ignored.len(), 2);
}
