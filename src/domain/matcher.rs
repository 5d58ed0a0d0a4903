// src/domain/matcher.rs
//
// Decides whether a person-registry hit plausibly occupies a scraped
// listing, and how strongly. Checks run in a fixed order and short-circuit
// on the first disqualifier.

use crate::domain::address;
use crate::domain::record::{ListingRecord, Match};
use crate::registry::models::{PersonDetails, RegistryHit};
use crate::registry::PersonRegistry;
use log::{debug, warn};
use regex::Regex;
use std::sync::OnceLock;

/// Listing categories without apartment-level floor/area granularity.
/// Hits against these skip attribute screening entirely.
const DETACHED_HOUSE_TYPES: &[&str] = &["villa", "radhus", "kedjehus", "parhus", "fritidshus"];

static APARTMENT_CODE: OnceLock<Regex> = OnceLock::new();

fn apartment_code_pattern() -> &'static Regex {
    APARTMENT_CODE.get_or_init(|| Regex::new(r"\d{4}").unwrap())
}

#[derive(Debug, PartialEq, Eq)]
enum AreaScreen {
    Full,
    Partial,
    Disqualified,
}

/// The national apartment-numbering scheme puts the floor in the first digit
/// pair, offset so "11xx" is the first floor and "10xx" the ground floor.
/// Codes below "10xx" predate the offset convention; there the second digit
/// alone is the floor. Heuristic from observed data, not a verified rule.
fn floor_from_code(d1: i64, d2: i64) -> i64 {
    if d1 == 0 {
        d2
    } else {
        (d1 - 1) * 10 + d2
    }
}

/// Pulls the apartment-unit code and its encoded floor out of a registry
/// address like "Storgatan 1 lgh 1102". The code-derived floor is more
/// precise than text patterns and is preferred when present.
fn apartment_and_floor(street_address: &str) -> (Option<String>, Option<i64>) {
    let tail = match street_address.find("lgh") {
        Some(idx) => &street_address[idx..],
        None => return (None, None),
    };

    let code = match apartment_code_pattern().find(tail) {
        Some(m) => m.as_str(),
        None => return (None, None),
    };

    let digits: Vec<i64> = code
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(i64::from)
        .collect();

    let floor = match digits.as_slice() {
        [d1, d2, ..] => floor_from_code(*d1, *d2),
        _ => return (Some(code.to_string()), None),
    };

    (Some(code.to_string()), Some(floor))
}

/// First/middle/last concatenated with single spaces, absent parts omitted.
fn build_name(hit: &RegistryHit) -> String {
    [&hit.first_names, &hit.middle_names, &hit.last_names]
        .iter()
        .filter_map(|part| part.as_deref())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_detached(house_type: &str) -> bool {
    let house_type = house_type.trim().to_lowercase();
    DETACHED_HOUSE_TYPES.iter().any(|t| house_type == *t)
}

/// A listing without a known area can never be disqualified on area. A known
/// listing area against an area-less hit always disqualifies. With both
/// present: exact is a full match, the open ±1 band around the hit area is a
/// partial match, anything else disqualifies.
fn screen_area(listing_area: Option<f64>, hit_area: Option<f64>) -> AreaScreen {
    match (listing_area, hit_area) {
        (None, None) => AreaScreen::Full,
        (None, Some(_)) => AreaScreen::Partial,
        (Some(_), None) => AreaScreen::Disqualified,
        (Some(listing), Some(hit)) => {
            if listing == hit {
                AreaScreen::Full
            } else if hit - 1.0 < listing && listing < hit + 1.0 {
                AreaScreen::Partial
            } else {
                AreaScreen::Disqualified
            }
        }
    }
}

/// Floors only screen when the listing has one: a floor-less hit is out, and
/// the hit floor must land in the inclusive ±1 window. Floor distance never
/// affects match strength.
fn screen_floor(listing_floor: Option<i64>, hit_floor: Option<i64>) -> bool {
    let listing = match listing_floor {
        Some(floor) => floor,
        None => return true,
    };
    match hit_floor {
        Some(hit) => (hit - listing).abs() <= 1,
        None => false,
    }
}

/// Qualifies one registry hit against one listing. `None` means disqualified.
/// The returned match carries everything derivable from the hit itself;
/// supplementary person attributes are attached by `find_matches`.
pub fn evaluate(listing: &ListingRecord, hit: &RegistryHit) -> Option<Match> {
    let street_address = match hit.fbf_street_address.as_deref() {
        Some(addr) => addr,
        None => {
            debug!("registry hit without a street address, skipped");
            return None;
        }
    };

    let (apartment, code_floor) = apartment_and_floor(street_address);
    let floor = match code_floor {
        Some(floor) => Some(floor),
        None => address::find_floor(street_address).map(|token| token.floor),
    };

    let hit_area = hit.housing_info.as_ref().and_then(|info| info.area);

    let candidate = |full_match: bool| Match {
        full_match,
        area: hit_area,
        floor,
        apartment: apartment.clone(),
        street_address: street_address.to_string(),
        name: build_name(hit),
        phone_numbers: Vec::new(),
        age: None,
        gender: None,
        person_number: None,
    };

    if is_detached(&listing.house_type) {
        return Some(candidate(true));
    }

    let full_match = match screen_area(listing.area, hit_area) {
        AreaScreen::Full => true,
        AreaScreen::Partial => false,
        AreaScreen::Disqualified => return None,
    };

    if !screen_floor(listing.floor, floor) {
        return None;
    }

    Some(candidate(full_match))
}

/// Runs every hit through qualification and enriches the survivors from the
/// registry's detail endpoint. A fault on one hit never aborts its siblings.
pub fn find_matches<R: PersonRegistry + ?Sized>(
    registry: &mut R,
    listing: &ListingRecord,
    hits: &[RegistryHit],
) -> Vec<Match> {
    let mut matches = Vec::new();

    for hit in hits {
        let mut candidate = match evaluate(listing, hit) {
            Some(candidate) => candidate,
            None => continue,
        };

        let details = match hit.id.as_deref() {
            Some(id) => registry.fetch_detail(id),
            None => {
                warn!(
                    "qualifying hit for [{}] has no registry id, keeping without details",
                    listing.id
                );
                PersonDetails::default()
            }
        };

        candidate.phone_numbers = details.phone_numbers;
        candidate.age = details.age;
        candidate.gender = details.gender;
        candidate.person_number = details.person_number;

        matches.push(candidate);
    }

    matches
}
