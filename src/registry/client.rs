// src/registry/client.rs
use crate::registry::models::{
    DetailResponse, PersonDetails, RegistryHit, SearchResponse,
};
use crate::registry::{PersonRegistry, RegistryError};
use log::{error, info, warn};
use rand::Rng;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, ORIGIN, REFERER};
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, Instant};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/86.0.4240.75 Safari/537.36";

const SEARCH_URL: &str = "https://www.faktakontroll.se/app/api/search";
const ENTITY_URL: &str = "https://www.faktakontroll.se/app/api/search/entity";
const SUBSCRIPTION_REF: &str = "20.750.025.01";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
    /// Lifetime in seconds.
    #[serde(rename = "validFor")]
    valid_for: u64,
}

/// Cached access token with its expiry. Owned by the client; refreshed
/// in place when a request finds it expired.
#[derive(Debug)]
struct TokenCache {
    access_token: Option<String>,
    valid_until: Instant,
}

impl TokenCache {
    fn new() -> Self {
        TokenCache {
            access_token: None,
            valid_until: Instant::now(),
        }
    }

    fn current(&self) -> Option<String> {
        match &self.access_token {
            Some(token) if Instant::now() < self.valid_until => Some(token.clone()),
            _ => None,
        }
    }
}

pub struct RegistryClient {
    http: Client,
    api_key: String,
    token_endpoint: String,
    token: TokenCache,
}

impl RegistryClient {
    pub fn new(token_endpoint: &str, api_key: &str) -> Result<Self, RegistryError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RegistryError::Network(e.to_string()))?;

        Ok(RegistryClient {
            http,
            api_key: api_key.to_string(),
            token_endpoint: token_endpoint.trim_end_matches('/').to_string(),
            token: TokenCache::new(),
        })
    }

    fn token(&mut self) -> Result<String, RegistryError> {
        if let Some(token) = self.token.current() {
            return Ok(token);
        }

        let resp = self
            .http
            .post(format!("{}/getToken", self.token_endpoint))
            .header("api-key", self.api_key.as_str())
            .send()
            .map_err(|e| RegistryError::Token(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RegistryError::Token(format!("HTTP {status}")));
        }

        let data: TokenResponse = resp
            .json()
            .map_err(|e| RegistryError::Token(e.to_string()))?;

        self.token.valid_until = Instant::now() + Duration::from_secs(data.valid_for);
        self.token.access_token = Some(data.access_token.clone());
        info!("registry access token updated. valid for: {}s", data.valid_for);

        Ok(data.access_token)
    }

    fn request_headers(&self, token: &str) -> Result<HeaderMap, RegistryError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json;charset=UTF-8"),
        );
        headers.insert(ORIGIN, HeaderValue::from_static("https://www.faktakontroll.se"));
        headers.insert(
            REFERER,
            HeaderValue::from_static("https://www.faktakontroll.se/app/sok"),
        );
        headers.insert(
            "x-initialized-at",
            HeaderValue::from_str(&chrono::Utc::now().timestamp_millis().to_string())
                .map_err(|e| RegistryError::Token(e.to_string()))?,
        );
        headers.insert(
            "x-auth-token",
            HeaderValue::from_str(token).map_err(|e| RegistryError::Token(e.to_string()))?,
        );
        Ok(headers)
    }

    fn try_search(&mut self, query: &str) -> Result<Vec<RegistryHit>, RegistryError> {
        let token = self.token()?;

        let resp = self
            .http
            .post(SEARCH_URL)
            .headers(self.request_headers(&token)?)
            .json(&json!({
                "searchString": query,
                "filterType": "p",
                "subscriptionRefNo": SUBSCRIPTION_REF,
            }))
            .send()
            .map_err(|e| RegistryError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RegistryError::Status(status.as_u16()));
        }

        let data: SearchResponse = resp
            .json()
            .map_err(|e| RegistryError::JsonParse(e.to_string()))?;

        Ok(data.hits.into_iter().filter_map(|hit| hit.individual).collect())
    }

    fn try_fetch_detail(&mut self, hit_id: &str) -> Result<PersonDetails, RegistryError> {
        let token = self.token()?;

        let resp = self
            .http
            .get(format!("{ENTITY_URL}/{hit_id}"))
            .headers(self.request_headers(&token)?)
            .query(&[("subscriptionRefNo", SUBSCRIPTION_REF)])
            .send()
            .map_err(|e| RegistryError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RegistryError::Status(status.as_u16()));
        }

        let data: DetailResponse = resp
            .json()
            .map_err(|e| RegistryError::JsonParse(e.to_string()))?;

        Ok(data.individual.map(PersonDetails::from).unwrap_or_default())
    }
}

impl PersonRegistry for RegistryClient {
    /// One bounded retry with a short jittered pause; `None` only after both
    /// attempts failed.
    fn search(&mut self, query: &str) -> Option<Vec<RegistryHit>> {
        const MAX_ATTEMPTS: u32 = 2;

        for attempt in 1..=MAX_ATTEMPTS {
            match self.try_search(query) {
                Ok(hits) => return Some(hits),
                Err(e) if attempt < MAX_ATTEMPTS => {
                    warn!("registry search failed (attempt {attempt}): {e}. retrying...");
                    let pause = rand::thread_rng().gen_range(2..=5);
                    std::thread::sleep(Duration::from_secs(pause));
                }
                Err(e) => {
                    error!("registry search failed: {e}");
                }
            }
        }
        None
    }

    fn fetch_detail(&mut self, hit_id: &str) -> PersonDetails {
        // Pace the detail endpoint; it rate-limits harder than search.
        let pause = rand::thread_rng().gen_range(2..=5);
        std::thread::sleep(Duration::from_secs(pause));

        match self.try_fetch_detail(hit_id) {
            Ok(details) => details,
            Err(e) => {
                warn!("could not fetch registry details for [{hit_id}]: {e}");
                PersonDetails::default()
            }
        }
    }
}
