//! MDP Ingest Library
//!
//! Remote-file ingestion blocks for the market data pipeline: listing an
//! upload directory, detecting newly arrived files against a persisted
//! known-file set, fetching CSV payloads, and normalizing them into one
//! unified table.
//!
//! # Example
//!
//! ```no_run
//! use mdp_ingest::config::IngestConfig;
//! use mdp_ingest::pipeline::IngestionPipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = IngestConfig::from_env();
//!     let report = IngestionPipeline::new(config).run_cycle().await?;
//!     println!("{} new files, {} rows", report.new_files.len(), report.table.row_count());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod known_files;
pub mod normalize;
pub mod pipeline;
pub mod remote;
pub mod sensor;
