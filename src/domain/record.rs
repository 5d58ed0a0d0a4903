// src/domain/record.rs
use crate::domain::address;
use crate::portal::models::RawListing;
use serde::{Deserialize, Serialize};

/// One scraped listing and its reconciliation status, as persisted in the
/// partition cache. Field names are the on-disk contract; renaming one breaks
/// every existing cache file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: String,
    pub city: String,
    pub street_address: String,
    /// `None` means unknown; `Some(0)` is an explicitly parsed ground level.
    pub floor: Option<i64>,
    pub area: Option<f64>,
    pub extra_area: Option<f64>,
    /// Empty string when the portal gave no housing form.
    pub house_type: String,
    pub publication_date: String,
    pub sold_date: Option<String>,
    /// `None` = never searched; `Some(vec![])` = searched, zero qualifying hits.
    pub matches: Option<Vec<Match>>,
    pub complete: bool,
    pub try_count: u32,
}

/// A registry hit that passed qualification for a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// True iff the areas matched exactly (or both were absent). A hit inside
    /// the tolerance band but not exact qualifies with `full_match = false`.
    pub full_match: bool,
    pub area: Option<f64>,
    pub floor: Option<i64>,
    pub apartment: Option<String>,
    pub street_address: String,
    pub name: String,
    pub phone_numbers: Vec<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub person_number: Option<String>,
}

/// Reconciliation lifecycle of a record, derived from its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// Never searched.
    Unsearched,
    /// Registry calls failed so far; still inside the retry budget.
    Retryable,
    /// Retry budget exhausted without a decisive search. Kept for inspection,
    /// never selected again.
    Abandoned,
    /// A decisive search outcome (possibly zero matches) was recorded.
    Complete,
}

impl ListingRecord {
    /// Builds an unsearched record from a scraped listing, normalizing the
    /// address and deriving the floor on the way in.
    pub fn from_listing(raw: &RawListing) -> Self {
        let raw_address = raw.street_address.as_deref().unwrap_or("");
        let (street_address, floor) = address::normalize(raw_address);

        ListingRecord {
            id: raw.id.clone(),
            city: raw.location.clone().unwrap_or_default(),
            street_address,
            floor,
            area: raw.living_area,
            extra_area: raw.supplemental_area,
            house_type: raw.housing_form.clone().unwrap_or_default(),
            publication_date: raw.publication_date.clone().unwrap_or_default(),
            sold_date: None,
            matches: None,
            complete: false,
            try_count: 0,
        }
    }

    pub fn state(&self, max_retry: u32) -> RecordState {
        if self.complete || self.matches.is_some() {
            RecordState::Complete
        } else if self.try_count == 0 {
            RecordState::Unsearched
        } else if self.try_count < max_retry {
            RecordState::Retryable
        } else {
            RecordState::Abandoned
        }
    }

    /// A record is selectable while it has never had a decisive search and
    /// its retry budget is not exhausted.
    pub fn is_workable(&self, max_retry: u32) -> bool {
        self.matches.is_none() && self.try_count < max_retry
    }
}
