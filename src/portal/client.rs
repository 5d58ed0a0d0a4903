// src/portal/client.rs
use crate::config::LocationConfig;
use crate::portal::models::{id_string, ListingRef, RawListing, SoldListing, SOLD_DATE_NOT_FOUND};
use crate::portal::PortalError;
use log::{debug, error, info, warn};
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use scraper::{Html, Selector};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::OnceLock;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/86.0.4240.75 Safari/537.36";

const BASE_URL: &str = "https://www.hemnet.se";
const MAX_PAGES: u32 = 50;
const MAX_CONSECUTIVE_FAILURES: u32 = 3;

static DATALAYER: OnceLock<Regex> = OnceLock::new();
static RESULT_ITEM: OnceLock<Selector> = OnceLock::new();
static ANCHOR: OnceLock<Selector> = OnceLock::new();
static SOLD_LINK: OnceLock<Selector> = OnceLock::new();

fn datalayer_pattern() -> &'static Regex {
    DATALAYER.get_or_init(|| Regex::new(r"(?s)dataLayer\s*=\s*(\[.*?\])\s*;").unwrap())
}

fn result_item_selector() -> &'static Selector {
    RESULT_ITEM.get_or_init(|| Selector::parse("li.normal-results__hit.js-normal-list-item").unwrap())
}

fn anchor_selector() -> &'static Selector {
    ANCHOR.get_or_init(|| Selector::parse("a").unwrap())
}

fn sold_link_selector() -> &'static Selector {
    SOLD_LINK.get_or_init(|| Selector::parse("a.sold-property-listing").unwrap())
}

pub struct PortalClient {
    http: Client,
}

impl PortalClient {
    pub fn new() -> Result<Self, PortalError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
        );
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
        headers.insert("dnt", HeaderValue::from_static("1"));

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| PortalError::Network(e.to_string()))?;

        Ok(PortalClient { http })
    }

    /// Pages through the listing search for one location, newest first.
    /// Stops at the first empty page, or after three pages failing in a row.
    /// Ids in `ignore` (manual ignore list plus already-cached listings) are
    /// dropped.
    pub fn search(&self, location: &LocationConfig, ignore: &HashSet<String>) -> Vec<ListingRef> {
        let mut results = Vec::new();
        let mut consecutive_failures = 0;

        for page_num in 1..=MAX_PAGES {
            info!("{}: page {page_num}", location.name);

            match self.fetch_search_page(&location.id, page_num) {
                Ok(html) => {
                    consecutive_failures = 0;
                    let (refs, items_on_page) = Self::parse_search_page(&html, ignore);
                    results.extend(refs);
                    if items_on_page == 0 {
                        break;
                    }
                }
                Err(e) => {
                    consecutive_failures += 1;
                    warn!("{}: page {page_num} failed: {e}", location.name);
                    if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                        error!("{}: too many failed pages, stopping search", location.name);
                        break;
                    }
                }
            }
        }

        results
    }

    /// Fetches one listing page and extracts its property attributes.
    /// Not-found or an unrecognizable page is a logged `None`, never an abort.
    pub fn fetch_details(&self, listing: &ListingRef) -> Option<RawListing> {
        let html = match self.get_text(&listing.url) {
            Ok(html) => html,
            Err(e) => {
                error!("could not get data for [{}]. error: {e}", listing.url);
                return None;
            }
        };

        match Self::parse_listing_page(&html) {
            Some(raw) => Some(raw),
            None => {
                error!("property not found for [{}]", listing.url);
                None
            }
        }
    }

    /// Crawls the sold-listings pages for one location and returns the
    /// listing page URLs. Unlike the live search this always walks the full
    /// page range; sold pages keep their position for weeks.
    pub fn search_sold(&self, location: &LocationConfig) -> Vec<String> {
        let mut links = Vec::new();

        for page_num in 1..=MAX_PAGES {
            if page_num % 10 == 0 {
                debug!("{} sold listings: page {page_num}", location.name);
            }

            match self.fetch_sold_page(&location.id, page_num) {
                Ok(html) => links.extend(Self::parse_sold_page(&html)),
                Err(e) => warn!("{}: sold page {page_num} failed: {e}", location.name),
            }
        }

        links
    }

    /// Resolves the sold date for one sold-listing page.
    pub fn fetch_sold_date(&self, url: &str) -> Option<SoldListing> {
        let html = match self.get_text(url) {
            Ok(html) => html,
            Err(e) => {
                warn!("could not get sold listing [{url}]. error: {e}");
                return None;
            }
        };
        Self::parse_sold_listing(&html)
    }

    fn fetch_search_page(&self, location_id: &str, page: u32) -> Result<String, PortalError> {
        let params: Vec<(&str, String)> = vec![
            ("by", "creation".to_string()),
            ("housing_form_groups[]", "houses".to_string()),
            ("housing_form_groups[]", "row_houses".to_string()),
            ("housing_form_groups[]", "apartments".to_string()),
            ("location_ids[]", location_id.to_string()),
            ("order", "desc".to_string()),
            ("page", page.to_string()),
            ("preferred_sorting", "true".to_string()),
            ("new_construction", "exclude".to_string()),
        ];

        let resp = self
            .http
            .get(format!("{BASE_URL}/bostader"))
            .query(&params)
            .send()
            .map_err(|e| PortalError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PortalError::Status(status.as_u16()));
        }

        resp.text().map_err(|e| PortalError::Network(e.to_string()))
    }

    fn fetch_sold_page(&self, location_id: &str, page: u32) -> Result<String, PortalError> {
        let params: Vec<(&str, String)> = vec![
            ("housing_form_groups[]", "houses".to_string()),
            ("housing_form_groups[]", "row_houses".to_string()),
            ("housing_form_groups[]", "apartments".to_string()),
            ("location_ids[]", location_id.to_string()),
            ("page", page.to_string()),
        ];

        let resp = self
            .http
            .get(format!("{BASE_URL}/salda/bostader"))
            .query(&params)
            .send()
            .map_err(|e| PortalError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PortalError::Status(status.as_u16()));
        }

        resp.text().map_err(|e| PortalError::Network(e.to_string()))
    }

    fn get_text(&self, url: &str) -> Result<String, PortalError> {
        let resp = self
            .http
            .get(url)
            .send()
            .map_err(|e| PortalError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PortalError::Status(status.as_u16()));
        }

        resp.text().map_err(|e| PortalError::Network(e.to_string()))
    }

    /// Parses one search-results page. Returns the accepted refs plus the
    /// total result-item count, which the pagination loop uses as its stop
    /// signal. A malformed item is logged and skipped.
    pub(crate) fn parse_search_page(
        html: &str,
        ignore: &HashSet<String>,
    ) -> (Vec<ListingRef>, usize) {
        let document = Html::parse_document(html);

        let mut refs = Vec::new();
        let mut items_on_page = 0;

        for item in document.select(result_item_selector()) {
            items_on_page += 1;

            let id = item
                .value()
                .attr("data-gtm-item-info")
                .and_then(|info| serde_json::from_str::<Value>(info).ok())
                .and_then(|info| info.get("id").and_then(id_string));

            let href = item
                .select(anchor_selector())
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string);

            match (id, href) {
                (Some(id), Some(href)) => {
                    if ignore.contains(&id) {
                        continue;
                    }
                    match Self::absolute_url(&href) {
                        Some(url) => refs.push(ListingRef { id, url }),
                        None => warn!("could not resolve listing link: {href}"),
                    }
                }
                _ => warn!("could not get link for a search result item"),
            }
        }

        (refs, items_on_page)
    }

    pub(crate) fn parse_listing_page(html: &str) -> Option<RawListing> {
        let datalayer = Self::extract_datalayer(html)?;
        let property = datalayer
            .as_array()?
            .iter()
            .find_map(|entry| entry.get("property").filter(|p| p.is_object()))?;

        RawListing::from_property(property)
    }

    pub(crate) fn parse_sold_page(html: &str) -> Vec<String> {
        let document = Html::parse_document(html);

        document
            .select(sold_link_selector())
            .filter_map(|a| a.value().attr("href"))
            .filter_map(Self::absolute_url)
            .collect()
    }

    /// A sold page's dataLayer carries the listing id under `property` and
    /// the date under `sold_property`; the id is required, the date falls
    /// back to the sentinel.
    pub(crate) fn parse_sold_listing(html: &str) -> Option<SoldListing> {
        let datalayer = Self::extract_datalayer(html)?;

        let mut id = None;
        let mut date = None;

        for entry in datalayer.as_array()? {
            if let Some(value) = entry.get("property").and_then(|p| p.get("id")) {
                id = id_string(value);
            }
            if let Some(value) = entry
                .get("sold_property")
                .and_then(|sp| sp.get("sold_at_date"))
                .and_then(Value::as_str)
            {
                date = Some(value.to_string());
            }
        }

        Some(SoldListing {
            id: id?,
            date: date.unwrap_or_else(|| SOLD_DATE_NOT_FOUND.to_string()),
        })
    }

    fn extract_datalayer(html: &str) -> Option<Value> {
        let caps = datalayer_pattern().captures(html)?;
        serde_json::from_str(caps.get(1)?.as_str()).ok()
    }

    fn absolute_url(href: &str) -> Option<String> {
        Url::parse(BASE_URL)
            .ok()?
            .join(href)
            .ok()
            .map(|url| url.to_string())
    }
}
