//! MDP CLI - Market data pipeline blocks as subcommands

use anyhow::{Context, Result};
use clap::Parser;
use mdp_analysis::report::build_reports;
use mdp_analysis::stats::DEFAULT_RISK_FREE_RATE;
use mdp_common::logging::{init_logging, LogConfig, LogLevel};
use mdp_ingest::config::IngestConfig;
use mdp_ingest::normalize::{write_csv, CsvNormalizer};
use mdp_ingest::pipeline::IngestionPipeline;
use mdp_ingest::remote::FetchedFile;
use mdp_ingest::sensor::NewFileSensor;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "mdp")]
#[command(author, version, about = "Market data pipeline blocks")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Run one ingestion cycle against the remote upload directory
    Ingest {
        /// Write the normalized table as CSV to this path
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Check whether new files are waiting in the upload directory
    ///
    /// Exits 0 when at least one new file exists, 1 otherwise, so shell
    /// orchestration can branch on the status.
    Sensor,

    /// Compute per-symbol summary statistics from a local stock CSV
    Report {
        /// Input CSV file
        input: PathBuf,

        /// Annual risk-free rate for the Sharpe ratio
        #[arg(long, default_value_t = DEFAULT_RISK_FREE_RATE)]
        risk_free_rate: f64,

        /// Symbol whose returns serve as the market index for beta
        #[arg(long, default_value = "SPY")]
        market_symbol: String,

        /// Write the JSON report to this path instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env if present; credentials come through the environment
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("mdp-cli".to_string())
        .build();

    // An explicit LOG_LEVEL in the environment takes precedence over the flag
    let log_config = if std::env::var_os("LOG_LEVEL").is_some() {
        LogConfig::from_env().unwrap_or(log_config)
    } else {
        log_config
    };

    if let Err(e) = init_logging(&log_config) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(2);
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Ingest { out } => {
            let config = IngestConfig::from_env();
            let report = IngestionPipeline::new(config).run_cycle().await?;

            info!(
                "Cycle complete: {} new files, {} rows, {} failures",
                report.new_files.len(),
                report.table.row_count(),
                report.failures.len()
            );
            for failure in &report.failures {
                info!("  failed: {} ({})", failure.path, failure.reason);
            }

            if let Some(path) = out {
                let file = std::fs::File::create(&path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                write_csv(&report.table, file)?;
                info!("Wrote normalized table to {}", path.display());
            }

            Ok(ExitCode::SUCCESS)
        },

        Command::Sensor => {
            let config = IngestConfig::from_env();
            let has_new = NewFileSensor::new(config).check().await?;

            info!("New files waiting: {}", has_new);
            if has_new {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        },

        Command::Report {
            input,
            risk_free_rate,
            market_symbol,
            out,
        } => {
            let content = std::fs::read(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;

            let files = [FetchedFile {
                path: input.display().to_string(),
                content,
            }];
            let table = CsvNormalizer::new().normalize(&files);
            anyhow::ensure!(!table.is_empty(), "{} yielded no rows", input.display());

            let reports = build_reports(&table, risk_free_rate, Some(&market_symbol))?;
            let json = serde_json::to_string_pretty(&reports)?;

            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Wrote {} symbol reports to {}", reports.len(), path.display());
                },
                None => println!("{}", json),
            }

            Ok(ExitCode::SUCCESS)
        },
    }
}
