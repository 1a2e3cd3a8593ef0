//! OHLCV bar extraction
//!
//! Builds typed daily bars out of the untyped [`DataTable`] the ingestion
//! blocks produce. Column names are matched case-insensitively (upstream
//! vendors disagree on casing); rows with missing or unparseable essential
//! values are dropped rather than failing the whole extraction.

use chrono::NaiveDate;
use mdp_common::types::DataTable;
use mdp_common::{MdpError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One daily OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

const ESSENTIAL_COLUMNS: &[&str] = &["date", "open", "high", "low", "close", "volume"];

/// Distinct values of the `symbol` column, sorted
///
/// Returns an empty vector when the table has no symbol column; callers then
/// treat the whole table as one unnamed series.
pub fn symbols(table: &DataTable) -> Vec<String> {
    let Some(idx) = table.column_index_ignore_case("symbol") else {
        return Vec::new();
    };

    let mut symbols: Vec<String> = table
        .rows()
        .iter()
        .filter_map(|row| row.get(idx).and_then(|c| c.clone()))
        .collect();
    symbols.sort();
    symbols.dedup();
    symbols
}

/// Extract bars from the table, sorted by date
///
/// When `symbol` is given, only rows whose `symbol` column matches are used.
/// Errors only when an essential column is missing from the schema entirely;
/// individual bad rows are skipped.
pub fn parse_bars(table: &DataTable, symbol: Option<&str>) -> Result<Vec<Bar>> {
    let mut indices = [0usize; 6];
    for (i, name) in ESSENTIAL_COLUMNS.iter().enumerate() {
        indices[i] = table
            .column_index_ignore_case(name)
            .ok_or_else(|| MdpError::MissingColumn(name.to_string()))?;
    }
    let symbol_idx = table.column_index_ignore_case("symbol");

    let mut bars = Vec::new();
    let mut skipped = 0usize;

    for row in table.rows() {
        if let (Some(want), Some(idx)) = (symbol, symbol_idx) {
            let matches = row
                .get(idx)
                .and_then(|c| c.as_deref())
                .is_some_and(|s| s == want);
            if !matches {
                continue;
            }
        }

        match parse_row(row, &indices) {
            Some(bar) => bars.push(bar),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("Skipped {} rows with missing or unparseable values", skipped);
    }

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

fn parse_row(row: &[Option<String>], indices: &[usize; 6]) -> Option<Bar> {
    let cell = |i: usize| row.get(indices[i]).and_then(|c| c.as_deref());

    let date = NaiveDate::parse_from_str(cell(0)?.trim(), "%Y-%m-%d").ok()?;
    let num = |i: usize| cell(i)?.trim().parse::<f64>().ok();

    Some(Bar {
        date,
        open: num(1)?,
        high: num(2)?,
        low: num(3)?,
        close: num(4)?,
        volume: num(5)?,
    })
}
