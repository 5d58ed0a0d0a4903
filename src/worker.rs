// src/worker.rs
use crate::domain::matcher;
use crate::domain::record::RecordState;
use crate::registry::PersonRegistry;
use crate::store::ListingStore;
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Cursor file for the harvester's location round-robin.
pub const HARVEST_CURSOR_FILE: &str = "last_loc.txt";
/// Cursor file for the sold-listing sync's round-robin.
pub const SOLD_CURSOR_FILE: &str = "last_sold_loc.txt";

/// Result of one reconciliation attempt against a partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// No selectable record in this partition.
    Idle,
    /// The registry call itself failed. The record's budget was spent by one
    /// and it stays selectable until the budget runs out.
    RegistryFailed { record_id: String, try_count: u32 },
    /// A decisive search outcome was recorded; zero matches still completes.
    Completed {
        record_id: String,
        matches_found: usize,
    },
}

pub struct ReconciliationWorker<R: PersonRegistry> {
    registry: R,
    max_retry: u32,
}

impl<R: PersonRegistry> ReconciliationWorker<R> {
    pub fn new(registry: R, max_retry: u32) -> Self {
        ReconciliationWorker { registry, max_retry }
    }

    /// Picks the next workable record, queries the registry, matches, and
    /// persists. Exactly one record is touched per call; `Idle` means the
    /// partition has nothing selectable.
    pub fn run_attempt(&mut self, store: &mut ListingStore) -> AttemptOutcome {
        let record = match store.next_workable(self.max_retry) {
            Some(record) => record.clone(),
            None => return AttemptOutcome::Idle,
        };

        let query = format!("{}, {}", record.street_address, record.city);
        info!("searching registry ({}): {}", store.partition(), query);

        let outcome = match self.registry.search(&query) {
            Some(hits) => {
                let matches = matcher::find_matches(&mut self.registry, &record, &hits);
                info!("{} matches found for [{}]", matches.len(), record.id);

                if let Some(stored) = store.get_mut(&record.id) {
                    let matches_found = matches.len();
                    stored.matches = Some(matches);
                    stored.complete = true;
                    stored.try_count += 1;
                    AttemptOutcome::Completed {
                        record_id: record.id.clone(),
                        matches_found,
                    }
                } else {
                    AttemptOutcome::Idle
                }
            }
            None => {
                warn!(
                    "registry search failed for [{}] (query: {})",
                    record.id, query
                );

                if let Some(stored) = store.get_mut(&record.id) {
                    stored.try_count += 1;
                    if stored.state(self.max_retry) == RecordState::Abandoned {
                        warn!(
                            "retry budget exhausted for [{}] after {} attempts",
                            record.id, stored.try_count
                        );
                    }
                    AttemptOutcome::RegistryFailed {
                        record_id: record.id.clone(),
                        try_count: stored.try_count,
                    }
                } else {
                    AttemptOutcome::Idle
                }
            }
        };

        if let Err(e) = store.save() {
            error!("could not persist partition {}: {e}", store.partition());
        }

        outcome
    }
}

/// Round-robin cursor over the configured locations, persisted to a file so
/// successive runs and sibling binaries continue where the last one left off.
pub struct LocationRotation {
    path: PathBuf,
    len: usize,
}

impl LocationRotation {
    pub fn new(cache_dir: &Path, file_name: &str, len: usize) -> Self {
        LocationRotation {
            path: cache_dir.join(file_name),
            len,
        }
    }

    /// Reads the last index, advances modulo the location count, writes the
    /// new index back. An unreadable cursor restarts at zero.
    pub fn advance(&self) -> usize {
        let last = fs::read_to_string(&self.path)
            .ok()
            .and_then(|text| text.trim().parse::<usize>().ok());

        let next = match last {
            Some(index) if self.len > 0 => (index + 1) % self.len,
            _ => 0,
        };

        if let Some(dir) = self.path.parent() {
            let _ = fs::create_dir_all(dir);
        }
        if let Err(e) = fs::write(&self.path, next.to_string()) {
            warn!("could not persist location cursor {}: {e}", self.path.display());
        }

        next
    }
}
