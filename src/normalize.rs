//! Turns a raw sheet grid into a typed table.
//!
//! Sheet exports carry a label row or two above the real header, trailing
//! blank columns, and free-text cells in numeric columns. The normalizer
//! strips the noise according to a [`SheetLayout`] and keeps a record of
//! every cell it could not coerce.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::config::SheetLayout;
use crate::error::{PipelineError, Warning};
use crate::parser::RawGrid;

/// A single typed cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Missing,
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NormalizedRow {
    /// 1-based line of the row in the raw export.
    pub line: usize,
    pub cells: Vec<Cell>,
    /// Trimmed sheet text behind each cell, for warnings raised downstream.
    pub raw: Vec<String>,
}

impl NormalizedRow {
    pub fn raw_text(&self, idx: usize) -> &str {
        self.raw.get(idx).map(String::as_str).unwrap_or("")
    }
}

/// Canonically named columns and their typed rows.
#[derive(Debug, Clone, Default)]
pub struct NormalizedTable {
    pub columns: Vec<String>,
    pub rows: Vec<NormalizedRow>,
}

impl NormalizedTable {
    /// Position of the first column called `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Normalizes `grid` according to `layout`.
///
/// Returns the table along with one warning per numeric cell that failed
/// coercion and per configured numeric column that is absent.
///
/// # Errors
///
/// [`PipelineError::SchemaMismatch`] when there is no row at
/// `header_row_index` or when every column is blank.
pub fn normalize(
    grid: &RawGrid,
    layout: &SheetLayout,
) -> Result<(NormalizedTable, Vec<Warning>), PipelineError> {
    let header_row = grid.get(layout.header_row_index).ok_or_else(|| {
        PipelineError::SchemaMismatch(format!(
            "header row {} not present, sheet has {} rows",
            layout.header_row_index,
            grid.len()
        ))
    })?;

    let kept = non_blank_columns(grid);
    if kept.is_empty() {
        return Err(PipelineError::SchemaMismatch(
            "no non-empty columns in sheet".to_string(),
        ));
    }

    let aliases: HashMap<&str, &str> = layout
        .column_aliases
        .iter()
        .map(|(raw, canonical)| (raw.trim(), canonical.as_str()))
        .collect();

    let columns: Vec<String> = kept
        .iter()
        .map(|&j| {
            let name = header_row.get(j).map(|s| s.trim()).unwrap_or("");
            aliases.get(name).copied().unwrap_or(name).to_string()
        })
        .collect();

    let mut warnings = Vec::new();
    for numeric in &layout.numeric_columns {
        if !columns.contains(numeric) {
            warn!(column = %numeric, "Numeric column missing from sheet");
            warnings.push(Warning::MissingColumn {
                column: numeric.clone(),
            });
        }
    }

    let numeric: Vec<bool> = columns
        .iter()
        .map(|c| layout.numeric_columns.contains(c))
        .collect();

    let mut rows = Vec::new();
    for (i, raw_row) in grid.iter().enumerate().skip(layout.data_start_index) {
        let line = i + 1;
        let raw: Vec<String> = kept
            .iter()
            .map(|&j| raw_row.get(j).map(|s| s.trim()).unwrap_or("").to_string())
            .collect();
        let cells = raw
            .iter()
            .zip(&columns)
            .zip(&numeric)
            .map(|((text, column), &is_numeric)| {
                if !is_numeric {
                    return Cell::Text(text.clone());
                }
                match parse_number(text) {
                    Ok(Some(n)) => Cell::Number(n),
                    Ok(None) => Cell::Missing,
                    Err(()) => {
                        debug!(line, column = %column, raw = %text, "Numeric coercion failed");
                        warnings.push(Warning::ValueCoercion {
                            row: line,
                            column: column.clone(),
                            raw: text.clone(),
                        });
                        Cell::Missing
                    }
                }
            })
            .collect();
        rows.push(NormalizedRow { line, cells, raw });
    }

    debug!(
        columns = columns.len(),
        dropped = grid_width(grid) - kept.len(),
        rows = rows.len(),
        "Sheet normalized"
    );

    Ok((NormalizedTable { columns, rows }, warnings))
}

/// Digit groups of three separated by commas, with an optional fraction.
static GROUPED_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(,\d{3})+(\.\d+)?$").expect("valid regex"));

/// Parses a sheet cell as a non-negative number.
///
/// Blank cells are `Ok(None)`. A comma is only accepted as a thousands
/// separator (`1,250`, `12,000.5`); `1,5` is an error rather than 15.
/// Anything else that is not a finite, non-negative number is an error.
pub fn parse_number(raw: &str) -> Result<Option<f64>, ()> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let plain = if trimmed.contains(',') {
        if !GROUPED_NUMBER.is_match(trimmed) {
            return Err(());
        }
        trimmed.replace(',', "")
    } else {
        trimmed.to_string()
    };
    match plain.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => Ok(Some(n)),
        _ => Err(()),
    }
}

fn grid_width(grid: &RawGrid) -> usize {
    grid.iter().map(Vec::len).max().unwrap_or(0)
}

fn non_blank_columns(grid: &RawGrid) -> Vec<usize> {
    (0..grid_width(grid))
        .filter(|&j| {
            grid.iter()
                .any(|row| row.get(j).is_some_and(|cell| !cell.trim().is_empty()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> RawGrid {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn layout(header: usize, data: usize) -> SheetLayout {
        SheetLayout {
            header_row_index: header,
            data_start_index: data,
            ..SheetLayout::default()
        }
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("12"), Ok(Some(12.0)));
        assert_eq!(parse_number(" 7.5 "), Ok(Some(7.5)));
        assert_eq!(parse_number("1,250"), Ok(Some(1250.0)));
        assert_eq!(parse_number("12,345,678"), Ok(Some(12_345_678.0)));
        assert_eq!(parse_number("1,200.50"), Ok(Some(1200.5)));
        assert_eq!(parse_number(""), Ok(None));
        assert_eq!(parse_number("   "), Ok(None));
        assert_eq!(parse_number("tbd"), Err(()));
        assert_eq!(parse_number("-3"), Err(()));
        assert_eq!(parse_number("NaN"), Err(()));
        assert_eq!(parse_number("inf"), Err(()));
    }

    #[test]
    fn test_parse_number_rejects_misplaced_separators() {
        assert_eq!(parse_number("1,5"), Err(()));
        assert_eq!(parse_number("12,34"), Err(()));
        assert_eq!(parse_number("1,2345"), Err(()));
        assert_eq!(parse_number(",100"), Err(()));
        assert_eq!(parse_number("1,000,"), Err(()));
        assert_eq!(parse_number("1_0"), Err(()));
    }

    #[test]
    fn test_rows_keep_trimmed_raw_text() {
        let g = grid(&[
            &["Course", "Book Pages"],
            &[" Space Power ", " 1,200.50 "],
        ]);
        let (table, _) = normalize(&g, &layout(0, 1)).unwrap();
        assert_eq!(table.rows[0].cells[1], Cell::Number(1200.5));
        assert_eq!(table.rows[0].raw_text(1), "1,200.50");
        assert_eq!(table.rows[0].raw_text(7), "");
    }

    #[test]
    fn test_promotes_header_and_skips_metadata_rows() {
        let g = grid(&[
            &["SAASS Tracker", "", ""],
            &["Course Title", "Required Days", "Completed Days"],
            &["Space Power", "8", "0"],
        ]);
        let (table, warnings) = normalize(&g, &layout(1, 2)).unwrap();

        assert_eq!(table.columns, vec!["Course", "Required Days", "Completed Days"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].line, 3);
        assert_eq!(table.rows[0].cells[0], Cell::Text("Space Power".into()));
        assert_eq!(table.rows[0].cells[1], Cell::Number(8.0));
        // Completed Books and Book Pages are configured but absent.
        assert_eq!(warnings.len(), 2);
        assert!(warnings.contains(&Warning::MissingColumn {
            column: "Book Pages".into()
        }));
    }

    #[test]
    fn test_drops_blank_columns_and_trims_headers() {
        let g = grid(&[
            &["", " Course ", "", "Required Days ", "  "],
            &["", "Irregular Warfare", "", "10", ""],
            &["", "Space Power", " ", "8"],
        ]);
        let (table, _) = normalize(&g, &layout(0, 1)).unwrap();

        assert_eq!(table.columns, vec!["Course", "Required Days"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].cells[1], Cell::Number(8.0));
    }

    #[test]
    fn test_blank_header_cell_becomes_empty_name() {
        let g = grid(&[&["Course", ""], &["Space Power", "note"]]);
        let (table, _) = normalize(&g, &layout(0, 1)).unwrap();
        assert_eq!(table.columns, vec!["Course", ""]);
    }

    #[test]
    fn test_short_rows_read_as_blank() {
        let g = grid(&[&["Course", "Required Days"], &["Space Power"]]);
        let (table, warnings) = normalize(&g, &layout(0, 1)).unwrap();
        assert_eq!(table.rows[0].cells[1], Cell::Missing);
        assert!(!warnings
            .iter()
            .any(|w| matches!(w, Warning::ValueCoercion { .. })));
    }

    #[test]
    fn test_coercion_failure_is_missing_with_warning() {
        let g = grid(&[&["Course", "Completed Days"], &["Space Power", "n/a"]]);
        let (table, warnings) = normalize(&g, &layout(0, 1)).unwrap();

        assert_eq!(table.rows[0].cells[1], Cell::Missing);
        assert!(warnings.contains(&Warning::ValueCoercion {
            row: 2,
            column: "Completed Days".into(),
            raw: "n/a".into(),
        }));
    }

    #[test]
    fn test_alias_keys_match_after_trimming() {
        let mut l = layout(0, 1);
        l.column_aliases.insert(" Pages ".into(), "Book Pages".into());
        let g = grid(&[&["Pages", "Course"], &["300", "Space Power"]]);
        let (table, _) = normalize(&g, &l).unwrap();
        assert_eq!(table.column_index("Book Pages"), Some(0));
        assert_eq!(table.rows[0].cells[0], Cell::Number(300.0));
    }

    #[test]
    fn test_missing_header_row_is_schema_mismatch() {
        let g = grid(&[&["only one row"]]);
        let result = normalize(&g, &layout(2, 3));
        assert!(matches!(result, Err(PipelineError::SchemaMismatch(_))));
    }

    #[test]
    fn test_all_blank_columns_is_schema_mismatch() {
        let g = grid(&[&["", " "], &["", ""]]);
        let result = normalize(&g, &layout(0, 1));
        assert!(matches!(result, Err(PipelineError::SchemaMismatch(_))));
    }
}
