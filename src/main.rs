// Reconciliation worker: round-robins over the configured locations, picks
// the next unsearched listing, queries the person registry, and records the
// qualifying occupant matches. One record per cycle, paced to stay polite.

use bostadsmatch::config::Config;
use bostadsmatch::export;
use bostadsmatch::registry::RegistryClient;
use bostadsmatch::store::ListingStore;
use bostadsmatch::worker::{AttemptOutcome, ReconciliationWorker};
use log::{debug, error, info};
use rand::Rng;
use std::time::Duration;

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

    let api_key = match config.api_key() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let registry = match RegistryClient::new(&config.token_endpoint, &api_key) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("could not build registry client: {e}");
            std::process::exit(1);
        }
    };

    let mut worker = ReconciliationWorker::new(registry, config.max_retry);

    info!(
        "reconciliation worker started ({} locations, max_retry {})",
        config.locations.len(),
        config.max_retry
    );

    let mut location_index = 0usize;

    loop {
        if !Config::is_dev() {
            let [min, max] = config.idle_sleep_secs;
            let pause = rand::thread_rng().gen_range(min..=max.max(min));
            debug!("sleeping for {pause} sec");
            std::thread::sleep(Duration::from_secs(pause));
        }

        run_cycle(&config, &mut location_index, &mut worker);
    }
}

/// One worker cycle: rotate through the locations until one has a selectable
/// record, run a single reconciliation attempt against it, and refresh that
/// location's report when the attempt produced matches.
fn run_cycle(
    config: &Config,
    location_index: &mut usize,
    worker: &mut ReconciliationWorker<RegistryClient>,
) {
    for _ in 0..config.locations.len() {
        *location_index = (*location_index + 1) % config.locations.len();
        let location = &config.locations[*location_index];

        let mut store = ListingStore::open(&config.cache_dir, &location.id);

        match worker.run_attempt(&mut store) {
            AttemptOutcome::Idle => continue,
            AttemptOutcome::RegistryFailed { .. } => return,
            AttemptOutcome::Completed { matches_found, .. } => {
                if matches_found > 0 {
                    if let Err(e) =
                        export::write_report(store.records(), &location.name, &config.report_dir)
                    {
                        error!("could not export report for {}: {e}", location.name);
                    }
                }
                return;
            }
        }
    }

    info!("no workable records in any location");
}
