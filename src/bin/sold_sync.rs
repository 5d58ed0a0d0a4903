// Sold-listing sync: crawls the sold pages for the next location in the
// rotation, resolves sold dates for links not seen before, and backfills
// `sold_date` on the cached records.

use bostadsmatch::config::Config;
use bostadsmatch::portal::models::SoldListing;
use bostadsmatch::portal::PortalClient;
use bostadsmatch::store::ListingStore;
use bostadsmatch::worker::{LocationRotation, SOLD_CURSOR_FILE};
use log::{debug, error, info};
use std::collections::{BTreeMap, HashMap};
use std::fs;

const SOLD_CACHE_FILE: &str = "sold-cache.json";

fn main() {
    env_logger::init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".to_string());

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("could not load config: {e}");
            std::process::exit(1);
        }
    };

    if config.locations.is_empty() {
        eprintln!("no locations configured");
        std::process::exit(1);
    }

    let rotation = LocationRotation::new(
        &config.cache_dir,
        SOLD_CURSOR_FILE,
        config.locations.len(),
    );
    let location = &config.locations[rotation.advance()];

    let portal = match PortalClient::new() {
        Ok(portal) => portal,
        Err(e) => {
            eprintln!("could not build portal client: {e}");
            std::process::exit(1);
        }
    };

    // url -> resolved sold listing, shared across all locations.
    let sold_cache_path = config.cache_dir.join(SOLD_CACHE_FILE);
    let mut sold_cache: BTreeMap<String, SoldListing> = fs::read_to_string(&sold_cache_path)
        .ok()
        .and_then(|text| serde_json::from_str(&text).ok())
        .unwrap_or_default();

    info!("getting list of sold listings for: {}", location.name);
    let links = portal.search_sold(location);

    let new_links: Vec<&String> = links
        .iter()
        .filter(|link| !sold_cache.contains_key(*link))
        .collect();
    info!("{} sold listings found. {} new", links.len(), new_links.len());

    for (i, link) in new_links.iter().enumerate() {
        if let Some(sold) = portal.fetch_sold_date(link) {
            debug!("({}/{}) {}: {}", i + 1, new_links.len(), sold.id, sold.date);
            sold_cache.insert((*link).clone(), sold);
        }
    }

    match serde_json::to_vec_pretty(&sold_cache) {
        Ok(blob) => match fs::write(&sold_cache_path, blob) {
            Ok(()) => info!("saved sold listing cache"),
            Err(e) => error!("could not save sold listing cache: {e}"),
        },
        Err(e) => error!("could not serialize sold listing cache: {e}"),
    }

    let sold_by_id: HashMap<&String, &String> = sold_cache
        .values()
        .map(|sold| (&sold.id, &sold.date))
        .collect();

    let mut store = ListingStore::open(&config.cache_dir, &location.id);
    let ids: Vec<String> = store.records().keys().cloned().collect();
    for id in ids {
        if let Some(date) = sold_by_id.get(&id) {
            if let Some(record) = store.get_mut(&id) {
                record.sold_date = Some((*date).clone());
            }
        }
    }

    if let Err(e) = store.save() {
        error!("could not save partition {}: {e}", store.partition());
        std::process::exit(1);
    }
}
