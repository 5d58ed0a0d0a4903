// src/registry/models.rs
use serde::Deserialize;

// hit
//  ├── id
//  ├── firstNames / middleNames / lastNames
//  ├── fbfStreetAddress        ("Storgatan 1 lgh 1102")
//  └── housingInfo
//       └── area               (m²)

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

/// One element of the search response. Hits without an `individual` payload
/// (companies, redacted entries) carry nothing we can match on.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub individual: Option<RegistryHit>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryHit {
    pub id: Option<String>,

    #[serde(rename = "firstNames")]
    pub first_names: Option<String>,
    #[serde(rename = "middleNames")]
    pub middle_names: Option<String>,
    #[serde(rename = "lastNames")]
    pub last_names: Option<String>,

    #[serde(rename = "fbfStreetAddress")]
    pub fbf_street_address: Option<String>,

    #[serde(rename = "housingInfo")]
    pub housing_info: Option<HousingInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HousingInfo {
    pub area: Option<f64>,
}

/// Detail-endpoint payload wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct DetailResponse {
    pub individual: Option<DetailIndividual>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailIndividual {
    #[serde(rename = "phoneNumbers", default)]
    pub phone_numbers: Vec<PhoneNumber>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    #[serde(rename = "personalNumber")]
    pub personal_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhoneNumber {
    #[serde(rename = "phoneNumber")]
    pub phone_number: Option<String>,
}

/// Supplementary attributes for a qualifying hit. Every field is best-effort:
/// a failed detail fetch yields the all-defaults value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonDetails {
    pub phone_numbers: Vec<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub person_number: Option<String>,
}

impl From<DetailIndividual> for PersonDetails {
    fn from(individual: DetailIndividual) -> Self {
        PersonDetails {
            phone_numbers: individual
                .phone_numbers
                .into_iter()
                .filter_map(|p| p.phone_number)
                .collect(),
            age: individual.age,
            gender: individual.gender,
            person_number: individual.personal_number,
        }
    }
}
