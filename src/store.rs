// src/store.rs
//
// One store per location partition: the whole record map is loaded into
// memory, mutated, and rewritten as a single JSON blob. Other worker
// processes may write the same partition, so writes go through an atomic
// replace with a bounded jittered retry instead of locking.

use crate::domain::record::ListingRecord;
use log::{info, warn};
use rand::Rng;
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAX_SAVE_ATTEMPTS: u32 = 3;

#[derive(Debug)]
pub enum StoreError {
    Serialize(String),
    Write(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Serialize(msg) => write!(f, "Serialize error: {msg}"),
            StoreError::Write(msg) => write!(f, "Write error: {msg}"),
        }
    }
}

impl Error for StoreError {}

pub struct ListingStore {
    partition: String,
    path: PathBuf,
    records: BTreeMap<String, ListingRecord>,
}

impl ListingStore {
    /// Loads the partition blob. A missing or unreadable cache is not fatal;
    /// the partition restarts from empty.
    pub fn open(cache_dir: &Path, partition: &str) -> Self {
        let path = cache_dir.join(format!("{partition}.json"));

        let records = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(records) => records,
                Err(e) => {
                    warn!("could not parse {}. starting empty. error: {e}", path.display());
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };

        ListingStore {
            partition: partition.to_string(),
            path,
            records,
        }
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }

    pub fn records(&self) -> &BTreeMap<String, ListingRecord> {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ListingRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ListingRecord> {
        self.records.get_mut(id)
    }

    /// Insert-or-replace by id.
    pub fn upsert(&mut self, record: ListingRecord) {
        self.records.insert(record.id.clone(), record);
    }

    /// First record in key order that has never had a decisive search and
    /// still has retry budget. `None` means no work in this partition.
    pub fn next_workable(&self, max_retry: u32) -> Option<&ListingRecord> {
        self.records
            .values()
            .find(|record| record.is_workable(max_retry))
    }

    /// Serializes the full map and writes it with up to three attempts,
    /// pausing a jittered few seconds between them since another process may
    /// hold the file. After the last failure the in-memory state is kept and
    /// the error returned for the caller to log; the next cycle retries.
    pub fn save(&self) -> Result<(), StoreError> {
        let blob = serde_json::to_vec_pretty(&self.records)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| StoreError::Write(e.to_string()))?;
        }

        let mut last_err = None;
        for attempt in 1..=MAX_SAVE_ATTEMPTS {
            match self.write_atomic(&blob) {
                Ok(()) => {
                    info!("cache saved as: {}", self.path.display());
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        "could not save {} (attempt {attempt}): {e}",
                        self.path.display()
                    );
                    last_err = Some(e);
                    if attempt < MAX_SAVE_ATTEMPTS {
                        let pause = rand::thread_rng().gen_range(3..=10);
                        std::thread::sleep(Duration::from_secs(pause));
                    }
                }
            }
        }

        Err(StoreError::Write(
            last_err.map(|e| e.to_string()).unwrap_or_default(),
        ))
    }

    /// Listing ids that must never be harvested, maintained by hand as a
    /// JSON array next to the partition files. Missing or unreadable means
    /// empty.
    pub fn load_ignored(cache_dir: &Path) -> HashSet<String> {
        let path = cache_dir.join("ignored.json");
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(_) => return HashSet::new(),
        };
        match serde_json::from_str(&text) {
            Ok(ids) => ids,
            Err(e) => {
                warn!("could not parse {}: {e}", path.display());
                HashSet::new()
            }
        }
    }

    /// Write the blob next to the target, then rename over it. The rename
    /// either lands whole or not at all, so a crashed or interrupted run
    /// leaves the previous blob intact. The temp name carries the pid so
    /// concurrent writers don't trample each other's staging file.
    fn write_atomic(&self, blob: &[u8]) -> std::io::Result<()> {
        let tmp = self
            .path
            .with_extension(format!("json.{}.tmp", std::process::id()));
        fs::write(&tmp, blob)?;
        fs::rename(&tmp, &self.path)
    }
}
