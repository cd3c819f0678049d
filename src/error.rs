//! Error taxonomy for the sheet-to-report pipeline.
//!
//! [`PipelineError`] covers failures that stop a stage. [`Warning`] covers
//! recoverable problems that are surfaced to the reader instead of aborting.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Network failure, non-success HTTP status, or unreadable local file.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// The fetched content is not valid CSV.
    #[error("Malformed source: {0}")]
    MalformedSource(String),

    /// The expected header row or columns are absent.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
}

impl PipelineError {
    /// Blocking errors leave nothing to render; schema problems degrade.
    pub fn is_blocking(&self) -> bool {
        !matches!(self, PipelineError::SchemaMismatch(_))
    }
}

/// A recoverable problem found while building a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A cell in a numeric column did not parse and was treated as missing.
    ValueCoercion {
        row: usize,
        column: String,
        raw: String,
    },
    /// A configured numeric column is not present in the sheet.
    MissingColumn { column: String },
    /// The sheet layout did not match; the report is empty.
    SchemaMismatch { message: String },
    /// No curriculum course survived filtering; ratios fall back to 0.
    NoCourseData,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ValueCoercion { row, column, raw } => {
                write!(f, "row {row}: '{raw}' in column '{column}' is not a valid number")
            }
            Warning::MissingColumn { column } => write!(f, "column '{column}' not found"),
            Warning::SchemaMismatch { message } => write!(f, "schema mismatch: {message}"),
            Warning::NoCourseData => write!(f, "no curriculum courses found in the sheet"),
        }
    }
}
