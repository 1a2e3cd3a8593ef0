//! Ingestion pipeline
//!
//! One end-to-end ingestion cycle: list the remote directories, diff the
//! upload listing against the persisted known-file set, fetch every regular
//! file over a single session, normalize the payloads into one table, and
//! commit the union back to the store.
//!
//! Remote-side trouble never fails the cycle. A listing that cannot be taken
//! degrades to "nothing new", a file that cannot be fetched or parsed is
//! recorded in the report and skipped. The caller always gets a
//! [`CycleReport`] and decides whether partial success is acceptable.

use anyhow::Result;
use mdp_common::types::DataTable;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::IngestConfig;
use crate::known_files::{diff, JsonFileStore, KnownFileStore};
use crate::normalize::CsvNormalizer;
use crate::remote::{FetchOutcome, FetchedFile, FtpSession, RemoteSource};

/// Why one file was left out of the normalized table
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: String,
    pub reason: String,
}

/// Everything one ingestion cycle produced
///
/// `table` concatenates the rows of every file that fetched and parsed;
/// `new_files` are the basenames not present in the known-file set before this
/// cycle; `failures` name the files that were listed but contributed nothing.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Newly arrived basenames, sorted
    pub new_files: Vec<String>,
    /// The unified table of all successfully ingested rows
    pub table: DataTable,
    /// Per-file failure reasons
    pub failures: Vec<FileFailure>,
}

impl CycleReport {
    /// An empty report: no new files, no rows, no failures
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Runs ingestion cycles against a configured remote endpoint
pub struct IngestionPipeline {
    config: IngestConfig,
}

impl IngestionPipeline {
    /// Create a pipeline for the given configuration
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    /// Run one full ingestion cycle
    ///
    /// Opens one remote session for the whole cycle and closes it on every
    /// exit path. A connection or login failure degrades to an empty report
    /// with a warning; it is not an error.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let config = self.config.clone();

        tokio::task::spawn_blocking(move || run_cycle_blocking(&config))
            .await
            .map_err(|e| anyhow::anyhow!("Ingestion task panicked: {}", e))
    }
}

fn run_cycle_blocking(config: &IngestConfig) -> CycleReport {
    let store = JsonFileStore::new(&config.known_files_path);

    match FtpSession::connect(config) {
        Ok(mut session) => {
            let report = run_cycle_with(&mut session, &store, config);
            session.quit();
            report
        },
        Err(e) => {
            warn!("Could not reach {}: {:#}. Reporting zero new files", config.server_addr(), e);
            CycleReport::empty()
        },
    }
}

/// The cycle logic, over any remote source and store
///
/// Separated from session management so tests can drive it with an in-memory
/// remote double.
pub fn run_cycle_with(
    source: &mut dyn RemoteSource,
    store: &dyn KnownFileStore,
    config: &IngestConfig,
) -> CycleReport {
    // Root listing is diagnostic only
    match source.list_dir(&config.root_dir) {
        Ok(entries) => {
            info!("{} entries in {}", entries.len(), config.root_dir);
            for entry in &entries {
                info!("  {}", entry.path);
            }
        },
        Err(e) => {
            warn!("Could not list {}: {:#}", config.root_dir, e);
        },
    }

    // Operative listing; a failure here means "nothing new", not "error"
    let entries = match source.list_dir(&config.upload_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Could not list {}: {:#}. Reporting zero new files", config.upload_dir, e);
            return CycleReport::empty();
        },
    };

    // Dotfiles are server-side bookkeeping, never ingested
    let entries: Vec<_> = entries
        .into_iter()
        .filter(|e| !e.name().starts_with('.'))
        .collect();

    if entries.is_empty() {
        info!("{} is empty, nothing to ingest", config.upload_dir);
        return CycleReport::empty();
    }

    let (mut files, directories): (Vec<_>, Vec<_>) =
        entries.into_iter().partition(|e| !e.is_directory);

    for dir in &directories {
        // Reported but never descended into
        info!("Skipping directory {}", dir.path);
    }

    // Deterministic fetch order for a fixed remote state
    files.sort_by(|a, b| a.path.cmp(&b.path));

    // Diff the current basenames against the persisted known set
    let known = store.load();
    let current = files.iter().map(|e| e.name().to_string()).collect();
    let mut new_files: Vec<String> = diff(&known, &current).into_iter().collect();
    new_files.sort();

    for name in &new_files {
        info!("Here is a new file: {}", name);
    }

    // Fetch everything over the one session; a bad file never blocks the rest
    let mut fetched = Vec::with_capacity(files.len());
    let mut failures = Vec::new();

    for entry in &files {
        match source.fetch(entry) {
            FetchOutcome::Content(content) => {
                fetched.push(FetchedFile {
                    path: entry.path.clone(),
                    content,
                });
            },
            outcome => {
                warn!("Skipping {}: {}", entry.path, outcome.label());
                failures.push(FileFailure {
                    path: entry.path.clone(),
                    reason: match outcome {
                        FetchOutcome::Transport(detail) => format!("transport error: {}", detail),
                        other => other.label().to_string(),
                    },
                });
            },
        }
    }

    let table = CsvNormalizer::new().normalize(&fetched);
    info!(
        "Ingested {} rows across {} columns from {} files",
        table.row_count(),
        table.column_count(),
        fetched.len()
    );

    // Union, never pruned: files deleted remotely stay known
    let union: std::collections::HashSet<String> = known.union(&current).cloned().collect();
    if let Err(e) = store.commit(&union) {
        warn!("Failed to persist known-file set: {}", e);
    }

    CycleReport {
        new_files,
        table,
        failures,
    }
}
