//! New-file sensor
//!
//! The sensor answers one question for the host orchestrator: has anything
//! new landed in the upload directory since the last cycle? It lists the
//! directory, diffs the basenames against the persisted known-file set, and
//! reports. It never commits the set; marking files as known is the
//! ingestion cycle's job, so the sensor keeps firing until ingestion runs.
//!
//! Like the pipeline, the sensor degrades on remote trouble: an unreachable
//! server means "nothing new", never a failed check.

use anyhow::Result;
use tracing::{info, warn};

use crate::config::IngestConfig;
use crate::known_files::{diff, JsonFileStore, KnownFileStore};
use crate::remote::{FtpSession, RemoteSource};

/// Checks the upload directory for files not yet in the known set
pub struct NewFileSensor {
    config: IngestConfig,
}

impl NewFileSensor {
    /// Create a sensor for the given configuration
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    /// True when at least one new file is waiting in the upload directory
    pub async fn check(&self) -> Result<bool> {
        let config = self.config.clone();

        tokio::task::spawn_blocking(move || {
            let store = JsonFileStore::new(&config.known_files_path);

            match FtpSession::connect(&config) {
                Ok(mut session) => {
                    let result = check_with(&mut session, &store, &config);
                    session.quit();
                    result
                },
                Err(e) => {
                    warn!("Could not reach {}: {:#}. Sensor reports no new files", config.server_addr(), e);
                    false
                },
            }
        })
        .await
        .map_err(|e| anyhow::anyhow!("Sensor task panicked: {}", e))
    }
}

/// The sensor logic, over any remote source and store
pub fn check_with(
    source: &mut dyn RemoteSource,
    store: &dyn KnownFileStore,
    config: &IngestConfig,
) -> bool {
    let entries = match source.list_dir(&config.upload_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Could not list {}: {:#}. Sensor reports no new files", config.upload_dir, e);
            return false;
        },
    };

    let known = store.load();
    let current = entries
        .iter()
        .filter(|e| !e.is_directory && !e.name().starts_with('.'))
        .map(|e| e.name().to_string())
        .collect();

    let mut new_files: Vec<String> = diff(&known, &current).into_iter().collect();
    new_files.sort();

    for name in &new_files {
        info!("Here is a new file: {}", name);
    }

    !new_files.is_empty()
}
