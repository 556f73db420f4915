//! Typed errors raised while ingesting source tables.
//!
//! Every variant is fatal: the dashboard refuses to start with partially
//! loaded data. Callers above the loader wrap these in `anyhow` context.

use std::path::PathBuf;

use thiserror::Error;

/// A date string that matched neither accepted encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a date in DD-MM-YYYY or DD/MM/YYYY form")]
pub struct MalformedDateError {
    pub value: String,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Source {0:?} does not exist")]
    MissingSource(PathBuf),
    #[error("Source '{source_name}' has no column for '{field}' (accepted headers: {accepted})")]
    MissingColumn {
        source_name: String,
        field: &'static str,
        accepted: String,
    },
    #[error("Row {row} of '{source_name}': invalid {field} value '{value}'")]
    InvalidValue {
        source_name: String,
        row: usize,
        field: &'static str,
        value: String,
    },
    #[error("Row {row} of '{source_name}': field {field}: {error}")]
    MalformedDate {
        source_name: String,
        row: usize,
        field: &'static str,
        error: MalformedDateError,
    },
}
