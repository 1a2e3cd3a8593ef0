//! CSV normalization
//!
//! Parses heterogeneous CSV payloads into one [`DataTable`]. Each payload's
//! header row declares its own schema; the table's columns are the union of
//! every schema actually encountered, in first-seen order. Ragged rows are
//! tolerated: fields beyond a file's declared header are truncated, missing
//! fields become explicit nulls.
//!
//! A payload that cannot be decoded as UTF-8 or parsed as CSV contributes
//! zero rows; the failure is logged and the remaining payloads still land.
//! Zero parseable payloads yield a structurally valid empty table.

use anyhow::{Context, Result};
use mdp_common::types::DataTable;
use tracing::{debug, warn};

use crate::remote::FetchedFile;

/// Normalizes fetched CSV payloads into a unified table
pub struct CsvNormalizer;

impl CsvNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Concatenate all parseable payloads, in the order given
    pub fn normalize(&self, files: &[FetchedFile]) -> DataTable {
        let mut table = DataTable::new();

        for file in files {
            match parse_payload(&file.content) {
                Ok((columns, records)) => {
                    let row_count = records.len();
                    merge_into(&mut table, &columns, records);
                    debug!("Normalized {} rows from {}", row_count, file.path);
                },
                Err(e) => {
                    warn!("Dropping {}: {:#}", file.path, e);
                },
            }
        }

        table
    }
}

impl Default for CsvNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one payload into its declared schema and raw rows
///
/// The whole payload is parsed before anything is merged, so a failure midway
/// through a file never leaves a partial contribution in the table.
fn parse_payload(bytes: &[u8]) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let text = std::str::from_utf8(bytes).context("Payload is not valid UTF-8")?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to read CSV record")?;
        records.push(record.iter().map(|f| f.to_string()).collect());
    }

    Ok((columns, records))
}

/// Merge one file's rows into the unified table under its declared schema
fn merge_into(table: &mut DataTable, columns: &[String], records: Vec<Vec<String>>) {
    let indices: Vec<usize> = columns.iter().map(|c| table.ensure_column(c)).collect();

    for record in records {
        let mut row: Vec<Option<String>> = vec![None; table.column_count()];
        // Fields beyond the declared header are dropped (ragged-line tolerance)
        for (i, value) in record.into_iter().enumerate().take(indices.len()) {
            row[indices[i]] = Some(value);
        }
        table.push_row(row);
    }
}

/// Write a table back out as CSV, nulls rendered as empty fields
pub fn write_csv<W: std::io::Write>(table: &DataTable, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    out.write_record(table.columns())
        .context("Failed to write CSV header")?;

    for row in table.rows() {
        out.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))
            .context("Failed to write CSV row")?;
    }

    out.flush().context("Failed to flush CSV output")?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn fetched(path: &str, content: &[u8]) -> FetchedFile {
        FetchedFile {
            path: path.to_string(),
            content: content.to_vec(),
        }
    }

    #[test]
    fn test_single_file() {
        let files = vec![fetched("/upload/x.csv", b"date,close\n2026-01-02,10.0\n2026-01-03,10.5\n")];
        let table = CsvNormalizer::new().normalize(&files);

        assert_eq!(table.columns(), ["date", "close"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(1, "close"), Some("10.5"));
    }

    #[test]
    fn test_schema_union_across_files() {
        let files = vec![
            fetched("/upload/a.csv", b"date,close\n2026-01-02,10.0\n"),
            fetched("/upload/b.csv", b"date,volume\n2026-01-02,5000\n"),
        ];
        let table = CsvNormalizer::new().normalize(&files);

        assert_eq!(table.columns(), ["date", "close", "volume"]);
        assert_eq!(table.row_count(), 2);
        // First file has no volume column; second has no close
        assert_eq!(table.cell(0, "volume"), None);
        assert_eq!(table.cell(1, "close"), None);
        assert_eq!(table.cell(1, "volume"), Some("5000"));
    }

    #[test]
    fn test_ragged_rows_truncated_and_padded() {
        let files = vec![fetched(
            "/upload/r.csv",
            b"date,close\n2026-01-02,10.0,EXTRA\n2026-01-03\n",
        )];
        let table = CsvNormalizer::new().normalize(&files);

        assert_eq!(table.row_count(), 2);
        // Extra field truncated to the declared schema
        assert_eq!(table.cell(0, "close"), Some("10.0"));
        // Short row padded with nulls
        assert_eq!(table.cell(1, "date"), Some("2026-01-03"));
        assert_eq!(table.cell(1, "close"), None);
    }

    #[test]
    fn test_undecodable_file_dropped_others_kept() {
        let files = vec![
            fetched("/upload/x.csv", b"date,close\n1,2\n3,4\n5,6\n"),
            fetched("/upload/y.csv", &[0xff, 0xfe, 0x00, 0x80]),
        ];
        let table = CsvNormalizer::new().normalize(&files);

        // Exactly the three rows from the decodable file
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.columns(), ["date", "close"]);
    }

    #[test]
    fn test_zero_files_yields_valid_empty_table() {
        let table = CsvNormalizer::new().normalize(&[]);
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn test_rows_preserve_file_then_row_order() {
        let files = vec![
            fetched("/upload/a.csv", b"v\n1\n2\n"),
            fetched("/upload/b.csv", b"v\n3\n"),
        ];
        let table = CsvNormalizer::new().normalize(&files);

        let values: Vec<_> = (0..table.row_count()).map(|r| table.cell(r, "v")).collect();
        assert_eq!(values, [Some("1"), Some("2"), Some("3")]);
    }

    #[test]
    fn test_write_csv_renders_nulls_as_empty() {
        let files = vec![
            fetched("/upload/a.csv", b"date,close\n2026-01-02,10.0\n"),
            fetched("/upload/b.csv", b"date,volume\n2026-01-03,5000\n"),
        ];
        let table = CsvNormalizer::new().normalize(&files);

        let mut buf = Vec::new();
        write_csv(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(text, "date,close,volume\n2026-01-02,10.0,\n2026-01-03,,5000\n");
    }
}
