// src/tests/address_tests.rs
use crate::domain::address::normalize;

#[test]
fn extracts_floor_and_strips_token() {
    let (address, floor) = normalize("Storgatan 12 3 tr, Vasastan");
    assert_eq!(address, "Storgatan 12");
    assert_eq!(floor, Some(3));
}

#[test]
fn two_digit_floor() {
    let (address, floor) = normalize("Hornsgatan 5 11 tr");
    assert_eq!(address, "Hornsgatan 5");
    assert_eq!(floor, Some(11));
}

#[test]
fn compact_floor_token() {
    let (address, floor) = normalize("Birger Jarlsgatan 2tr");
    assert_eq!(address, "Birger Jarlsgatan");
    assert_eq!(floor, Some(2));
}

#[test]
fn spelled_out_floor_word() {
    let (address, floor) = normalize("Kungsgatan 3 våning 4");
    assert_eq!(address, "Kungsgatan 3");
    assert_eq!(floor, Some(4));
}

#[test]
fn abbreviated_floor_word() {
    let (address, floor) = normalize("Sveavägen 10 vån 2");
    assert_eq!(address, "Sveavägen 10");
    assert_eq!(floor, Some(2));
}

#[test]
fn floor_token_after_comma_suffix_is_still_found() {
    let (address, floor) = normalize("Storgatan 1, 2 tr");
    assert_eq!(address, "Storgatan 1");
    assert_eq!(floor, Some(2));
}

#[test]
fn no_floor_token_leaves_street_line_unchanged() {
    let (address, floor) = normalize("Drottninggatan 71, Norrmalm");
    assert_eq!(address, "Drottninggatan 71");
    assert_eq!(floor, None);
}

#[test]
fn address_without_comma() {
    let (address, floor) = normalize("Lillgatan 2");
    assert_eq!(address, "Lillgatan 2");
    assert_eq!(floor, None);
}
