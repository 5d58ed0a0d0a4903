// src/tests/export_tests.rs
use crate::domain::record::{ListingRecord, Match};
use crate::export::report_xlsx::{phone_columns, report_rows};
use crate::export::write_report;
use crate::tests::utils::{listing, scratch_dir};
use std::collections::BTreeMap;

fn match_with(apartment: Option<&str>, full_match: bool, phones: &[&str]) -> Match {
    Match {
        full_match,
        area: Some(50.0),
        floor: Some(1),
        apartment: apartment.map(str::to_string),
        street_address: "Storgatan 1 lgh 1102".to_string(),
        name: "Anna Svensson".to_string(),
        phone_numbers: phones.iter().map(|p| p.to_string()).collect(),
        age: Some(44),
        gender: Some("K".to_string()),
        person_number: Some("19800101-1234".to_string()),
    }
}

fn completed(id: &str, matches: Vec<Match>) -> ListingRecord {
    let mut record = listing(id, Some(50.0), Some(1), "Bostadsrätt");
    record.matches = Some(matches);
    record.complete = true;
    record.try_count = 1;
    record
}

#[test]
fn phone_columns_pad_to_six() {
    let padded = phone_columns(&["a".to_string(), "b".to_string()]);
    assert_eq!(padded[0], "a");
    assert_eq!(padded[1], "b");
    assert!(padded[2..].iter().all(|slot| slot.is_empty()));
}

#[test]
fn phone_columns_truncate_to_six() {
    let many: Vec<String> = (0..8).map(|i| i.to_string()).collect();
    let truncated = phone_columns(&many);
    assert_eq!(truncated.len(), 6);
    assert_eq!(truncated[5], "5");
}

#[test]
fn incomplete_or_matchless_records_contribute_no_rows() {
    let unsearched = listing("1", Some(50.0), Some(1), "Bostadsrätt");
    assert!(report_rows(&unsearched).is_empty());

    let searched_empty = completed("2", Vec::new());
    assert!(report_rows(&searched_empty).is_empty());
}

#[test]
fn rows_carry_record_context_and_match_fields() {
    let record = completed(
        "123",
        vec![
            match_with(Some("1102"), true, &["070-1", "070-2"]),
            match_with(None, false, &[]),
        ],
    );

    let rows = report_rows(&record);
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].id, "123");
    assert_eq!(rows[0].total_hits, 2);
    assert_eq!(rows[0].apartment, "lgh 1102");
    assert_eq!(rows[0].match_type, "Full");
    assert_eq!(rows[0].total_apartments, 1);
    assert_eq!(rows[0].phones[0], "070-1");
    assert_eq!(rows[0].phones[5], "");

    assert_eq!(rows[1].apartment, "");
    assert_eq!(rows[1].match_type, "Partial");
    assert_eq!(rows[1].total_apartments, 1);
}

#[test]
fn apartment_count_is_distinct_codes() {
    let record = completed(
        "123",
        vec![
            match_with(Some("1102"), true, &[]),
            match_with(Some("1202"), true, &[]),
            match_with(None, true, &[]),
        ],
    );

    let rows = report_rows(&record);
    assert_eq!(rows[0].total_apartments, 2);
    assert_eq!(rows[1].total_apartments, 2);
    // a match without an apartment stands for the whole address
    assert_eq!(rows[2].total_apartments, 1);
}

#[test]
fn noisy_records_are_dropped_wholesale() {
    let matches = (0..9).map(|_| match_with(Some("1102"), true, &[])).collect();
    let record = completed("123", matches);
    assert!(report_rows(&record).is_empty());
}

#[test]
fn writes_workbook_to_report_dir() {
    let dir = scratch_dir("export");
    let record = completed("123", vec![match_with(Some("1102"), true, &["070-1"])]);

    let mut records = BTreeMap::new();
    records.insert(record.id.clone(), record);

    let path = write_report(&records, "Stockholms län", &dir).unwrap();
    assert!(path.exists());
    assert_eq!(path.file_name().unwrap().to_string_lossy(), "Stockholms län.xlsx");
}
