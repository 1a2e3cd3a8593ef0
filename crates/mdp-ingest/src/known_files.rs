//! Persisted known-file set
//!
//! The locally persisted record of basenames already seen in prior cycles.
//! New arrivals are detected by pure set difference against a fresh listing;
//! the set only ever grows (the union with the current listing is committed
//! back each cycle), so files deleted remotely stay "known" permanently.
//!
//! Storage sits behind the [`KnownFileStore`] trait so the backend is
//! swappable; the default [`JsonFileStore`] keeps a flat JSON array of strings
//! on local disk. Loads fail open: a missing or corrupt file yields the
//! built-in seed set rather than an error. There is no cross-process locking;
//! two racing writers are a last-writer-wins hazard by design.

use mdp_common::Result;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default tickers assumed known by pre-existing deployments that never
/// persisted a set of their own
const SEED_FILES: &[&str] = &[
    "aapl.csv", "amzn.csv", "ba.csv", "baba.csv", "cost.csv", "gme.csv", "lmt.csv", "meta.csv",
    "msft.csv", "nflx.csv", "nvda.csv", "pltr.csv", "tsla.csv", "uber.csv", "wmt.csv",
];

/// The built-in seed set
pub fn seed_set() -> HashSet<String> {
    SEED_FILES.iter().map(|s| s.to_string()).collect()
}

/// Filenames present in `current` but not yet known
///
/// Case-sensitive, exact-match set difference; a file already marked known is
/// never re-reported even if its content changed.
pub fn diff(known: &HashSet<String>, current: &HashSet<String>) -> HashSet<String> {
    current.difference(known).cloned().collect()
}

/// Storage backend for the known-file set
pub trait KnownFileStore {
    /// Load the persisted set, falling back to the seed set on any failure
    fn load(&self) -> HashSet<String>;

    /// Overwrite the persisted set
    fn commit(&self, set: &HashSet<String>) -> Result<()>;
}

/// Known-file set persisted as a JSON array on local disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store over the given path (conventionally `known_files.json`)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the persisted file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KnownFileStore for JsonFileStore {
    fn load(&self) -> HashSet<String> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!(
                    "No persisted known-file set at {} ({}), using seed set",
                    self.path.display(),
                    e
                );
                return seed_set();
            },
        };

        match serde_json::from_str::<Vec<String>>(&content) {
            Ok(names) => names.into_iter().collect(),
            Err(e) => {
                warn!(
                    "Corrupt known-file set at {}: {}. Falling back to seed set",
                    self.path.display(),
                    e
                );
                seed_set()
            },
        }
    }

    fn commit(&self, set: &HashSet<String>) -> Result<()> {
        let names: Vec<&String> = set.iter().collect();
        let json = serde_json::to_string(&names)?;

        // Write-then-rename so a crash mid-write never truncates the set
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        debug!("Committed {} known files to {}", set.len(), self.path.display());
        Ok(())
    }
}
