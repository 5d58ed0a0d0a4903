// src/tests/utils.rs
use crate::domain::record::ListingRecord;
use crate::registry::models::{HousingInfo, PersonDetails, RegistryHit};
use crate::registry::PersonRegistry;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fresh scratch directory per test, under the system temp dir.
pub fn scratch_dir(label: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!(
        "bostadsmatch-test-{}-{label}-{n}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

/// Unsearched apartment listing with the given screening attributes.
pub fn listing(id: &str, area: Option<f64>, floor: Option<i64>, house_type: &str) -> ListingRecord {
    ListingRecord {
        id: id.to_string(),
        city: "Stockholm".to_string(),
        street_address: "Storgatan 1".to_string(),
        floor,
        area,
        extra_area: None,
        house_type: house_type.to_string(),
        publication_date: "2024-05-01".to_string(),
        sold_date: None,
        matches: None,
        complete: false,
        try_count: 0,
    }
}

/// Registry hit at the given address, with an optional registered area.
pub fn hit(address: &str, area: Option<f64>) -> RegistryHit {
    RegistryHit {
        id: Some("hit-1".to_string()),
        first_names: Some("Anna".to_string()),
        middle_names: None,
        last_names: Some("Svensson".to_string()),
        fbf_street_address: Some(address.to_string()),
        housing_info: Some(HousingInfo { area }),
    }
}

/// Scripted registry: pops one search outcome per call (an exhausted script
/// means failure) and records every query and detail fetch.
pub struct StubRegistry {
    pub responses: Vec<Option<Vec<RegistryHit>>>,
    pub details: PersonDetails,
    pub queries: Vec<String>,
    pub detail_calls: Vec<String>,
}

impl StubRegistry {
    pub fn new(responses: Vec<Option<Vec<RegistryHit>>>) -> Self {
        StubRegistry {
            responses,
            details: PersonDetails::default(),
            queries: Vec::new(),
            detail_calls: Vec::new(),
        }
    }
}

impl PersonRegistry for StubRegistry {
    fn search(&mut self, query: &str) -> Option<Vec<RegistryHit>> {
        self.queries.push(query.to_string());
        if self.responses.is_empty() {
            None
        } else {
            self.responses.remove(0)
        }
    }

    fn fetch_detail(&mut self, hit_id: &str) -> PersonDetails {
        self.detail_calls.push(hit_id.to_string());
        self.details.clone()
    }
}
