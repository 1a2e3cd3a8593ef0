//! Common types used across MDP
//!
//! The central type is [`DataTable`], the unified tabular result produced by
//! the ingestion blocks and consumed by the analysis blocks. It is deliberately
//! untyped (string cells) because upstream CSV payloads are heterogeneous;
//! typed views are built downstream.

use serde::{Deserialize, Serialize};

/// A simple column-oriented schema with row-oriented storage.
///
/// Columns are identified by name; cells are optional strings so that rows
/// shorter than the schema can carry explicit missing values. The table is
/// always structurally valid: an empty table has zero columns and zero rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl DataTable {
    /// Create an empty table with no columns
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with the given column schema
    pub fn with_columns(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Column names, in schema order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows, each padded to the column count
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Index of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of a column, matching case-insensitively
    pub fn column_index_ignore_case(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Append a column to the schema, backfilling existing rows with None
    ///
    /// Returns the index of the column. If a column with the same name already
    /// exists, its index is returned and the schema is unchanged.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(None);
        }
        self.columns.len() - 1
    }

    /// Append a row, truncating or padding it to the current column count
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) {
        row.truncate(self.columns.len());
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    /// Cell value at (row, column name), if the column exists and the cell is set
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }
}
