//! CSV parser for published sheet exports.

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::PipelineError;

/// Rows of untyped cells exactly as exported. Rows may differ in length.
pub type RawGrid = Vec<Vec<String>>;

/// Decodes CSV bytes into a [`RawGrid`].
///
/// No row is treated as a header here; header promotion belongs to the
/// normalizer. Blank lines are skipped by the reader.
///
/// # Errors
///
/// Returns [`PipelineError::MalformedSource`] if the bytes are not UTF-8 or
/// not valid CSV.
pub fn parse_grid(bytes: &[u8]) -> Result<RawGrid, PipelineError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut grid = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| PipelineError::MalformedSource(e.to_string()))?;
        grid.push(record.iter().map(str::to_string).collect());
    }

    debug!(rows = grid.len(), "Sheet export parsed");
    Ok(grid)
}
