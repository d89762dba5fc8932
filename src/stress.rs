//! Concurrent reader/writer exercise for [`TrieStore`]
//!
//! One writer thread applies a fixed sequence of puts and removes while
//! reader threads poll the store. Every value the writer puts encodes the
//! step that wrote it, so a reader can tell whether an observed value was
//! ever published for that key.

use crate::store::TrieStore;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Parameters for a stress run
#[derive(Clone, Copy, Debug)]
pub struct StressConfig {
    /// Number of reader threads
    pub readers: usize,
    /// Number of writer operations
    pub writes: u64,
    /// Number of distinct keys the writer cycles through
    pub keys: u64,
}

impl Default for StressConfig {
    fn default() -> Self {
        StressConfig {
            readers: 4,
            writes: 1000,
            keys: 16,
        }
    }
}

/// Summary of a stress run
#[derive(Clone, Debug, Serialize)]
pub struct StressReport {
    pub readers: usize,
    pub writes: u64,
    /// Versions the store published
    pub versions: u64,
    /// Total reads issued
    pub reads: u64,
    /// Reads that found a value
    pub hits: u64,
    /// Reads that returned a value no writer put for that key
    pub invalid_reads: u64,
    /// Times a reader saw the version number go backwards
    pub version_regressions: u64,
    /// Whether the final store equals the writes applied in order
    pub final_state_matches: bool,
}

impl StressReport {
    /// True when no anomaly was observed
    pub fn is_consistent(&self) -> bool {
        self.invalid_reads == 0 && self.version_regressions == 0 && self.final_state_matches
    }
}

impl fmt::Display for StressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} readers, {} writes: {} versions published, {} reads ({} hits), \
             {} invalid reads, {} version regressions, final state {}",
            self.readers,
            self.writes,
            self.versions,
            self.reads,
            self.hits,
            self.invalid_reads,
            self.version_regressions,
            if self.final_state_matches { "matches" } else { "differs" }
        )
    }
}

/// Key written at a given step
pub fn key_for(step: u64, keys: u64) -> String {
    format!("key{}", step % keys)
}

/// Every third step removes instead of putting
fn is_remove(step: u64) -> bool {
    step % 3 == 2
}

/// Run the stress scenario on a fresh store
pub fn run(config: StressConfig) -> Result<StressReport> {
    if config.keys == 0 {
        return Err(Error::InvalidConfig("keys must be at least 1".into()));
    }

    let store = TrieStore::new();
    let done = AtomicBool::new(false);
    let reads = AtomicU64::new(0);
    let hits = AtomicU64::new(0);
    let invalid_reads = AtomicU64::new(0);
    let version_regressions = AtomicU64::new(0);

    info!(
        readers = config.readers,
        writes = config.writes,
        keys = config.keys,
        "starting stress run"
    );

    std::thread::scope(|s| {
        for reader in 0..config.readers {
            let (store, done) = (&store, &done);
            let (reads, hits, invalid_reads, version_regressions) =
                (&reads, &hits, &invalid_reads, &version_regressions);

            s.spawn(move || {
                let mut last_version = 0;
                let mut step = reader as u64;
                loop {
                    // Check before reading so at least one pass runs after the writer finishes
                    let finished = done.load(Ordering::Acquire);

                    let version = store.version();
                    if version < last_version {
                        version_regressions.fetch_add(1, Ordering::Relaxed);
                    }
                    last_version = version;

                    let key_index = step % config.keys;
                    if let Some(guard) = store.get::<u64>(key_for(key_index, config.keys)) {
                        hits.fetch_add(1, Ordering::Relaxed);
                        let value = *guard;
                        if value % config.keys != key_index || value >= config.writes || is_remove(value) {
                            invalid_reads.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                    reads.fetch_add(1, Ordering::Relaxed);
                    step += 1;

                    if finished {
                        break;
                    }
                }
                debug!(reader, "reader finished");
            });
        }

        for step in 0..config.writes {
            let key = key_for(step, config.keys);
            if is_remove(step) {
                store.remove(&key);
            } else {
                store.put(&key, step);
            }
        }
        done.store(true, Ordering::Release);
    });

    let final_state_matches = final_state(&store) == expected_state(config);
    let report = StressReport {
        readers: config.readers,
        writes: config.writes,
        versions: store.version(),
        reads: reads.into_inner(),
        hits: hits.into_inner(),
        invalid_reads: invalid_reads.into_inner(),
        version_regressions: version_regressions.into_inner(),
        final_state_matches,
    };

    if report.is_consistent() {
        info!(versions = report.versions, reads = report.reads, "stress run consistent");
    } else {
        warn!(?report, "stress run observed anomalies");
    }

    Ok(report)
}

/// State after applying the writer's steps one by one
pub fn expected_state(config: StressConfig) -> BTreeMap<String, u64> {
    let mut state = BTreeMap::new();
    for step in 0..config.writes {
        let key = key_for(step, config.keys);
        if is_remove(step) {
            state.remove(&key);
        } else {
            state.insert(key, step);
        }
    }
    state
}

fn final_state(store: &TrieStore) -> BTreeMap<String, u64> {
    let snapshot = store.snapshot();
    snapshot
        .list_prefix("")
        .into_iter()
        .filter_map(|(key, value)| {
            let value = value.downcast_ref::<u64>()?;
            Some((String::from_utf8_lossy(&key).into_owned(), *value))
        })
        .collect()
}
