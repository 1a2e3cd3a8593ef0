//! MDP Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the MDP project.
//!
//! # Overview
//!
//! This crate provides common functionality used across all MDP workspace members:
//!
//! - **Error Handling**: Custom error types and result types
//! - **Logging**: Centralized tracing initialization
//! - **Types**: Shared tabular data structures
//!
//! # Example
//!
//! ```no_run
//! use mdp_common::{Result, MdpError};
//! use mdp_common::types::DataTable;
//!
//! fn row_count(table: &DataTable) -> Result<usize> {
//!     Ok(table.row_count())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{MdpError, Result};
