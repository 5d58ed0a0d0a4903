// Listing harvester: advances the location rotation one step, pages through
// that location's live listings, fetches details for anything new, and seeds
// unsearched records into the partition store.

use bostadsmatch::config::Config;
use bostadsmatch::domain::record::ListingRecord;
use bostadsmatch::portal::PortalClient;
use bostadsmatch::store::ListingStore;
use bostadsmatch::worker::{LocationRotation, HARVEST_CURSOR_FILE};
use log::{error, info};

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
        HARVEST_CURSOR_FILE,
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

    let mut store = ListingStore::open(&config.cache_dir, &location.id);

    // Skip the manual ignore list and everything already cached.
    let mut ignore = ListingStore::load_ignored(&config.cache_dir);
    ignore.extend(store.records().keys().cloned());

    let refs = portal.search(location, &ignore);
    info!("{} new results found for: {}", refs.len(), location.name);

    for (i, listing_ref) in refs.iter().enumerate() {
        if (i + 1) % 10 == 0 || i + 1 == refs.len() {
            info!("{} of {} listings fetched", i + 1, refs.len());
        }

        if let Some(raw) = portal.fetch_details(listing_ref) {
            store.upsert(ListingRecord::from_listing(&raw));
        }
    }

    if let Err(e) = store.save() {
        error!("could not save partition {}: {e}", store.partition());
        std::process::exit(1);
    }
}
