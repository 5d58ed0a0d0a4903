// src/portal/models.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel for a sold listing whose page carries no date.
pub const SOLD_DATE_NOT_FOUND: &str = "date not found";

/// One search-result item: the portal's stable listing id plus its page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRef {
    pub id: String,
    pub url: String,
}

/// Raw listing attributes from a listing page's dataLayer blob.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawListing {
    pub id: String,
    /// Locality/city name.
    pub location: Option<String>,
    pub street_address: Option<String>,
    pub living_area: Option<f64>,
    pub supplemental_area: Option<f64>,
    pub housing_form: Option<String>,
    pub publication_date: Option<String>,
}

impl RawListing {
    /// Reads the `property` object of a dataLayer entry. The id is the only
    /// required field.
    pub fn from_property(property: &Value) -> Option<RawListing> {
        let id = id_string(property.get("id")?)?;

        Some(RawListing {
            id,
            location: string_field(property, "location"),
            street_address: string_field(property, "street_address"),
            living_area: property["living_area"].as_f64(),
            supplemental_area: property["supplemental_area"].as_f64(),
            housing_form: string_field(property, "housing_form"),
            publication_date: string_field(property, "publication_date"),
        })
    }
}

/// Sold-listing resolution: the listing id plus its sold date (or the
/// sentinel). Persisted in the sold cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoldListing {
    pub id: String,
    pub date: String,
}

/// The portal serializes ids as either a number or a string.
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}
