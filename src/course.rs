//! Typed course records built from a normalized table.

use serde::Serialize;
use tracing::debug;

use crate::analyzers::status::{Status, classify};
use crate::config::MissingPolicy;
use crate::error::{PipelineError, Warning};
use crate::normalize::{Cell, NormalizedTable};

/// Canonical column names every later stage refers to.
pub mod columns {
    pub const COURSE: &str = "Course";
    pub const COURSE_NUMBER: &str = "Course Number";
    pub const REQUIRED_DAYS: &str = "Required Days";
    pub const COMPLETED_DAYS: &str = "Completed Days";
    pub const COMPLETED_BOOKS: &str = "Completed Books";
    pub const BOOK_PAGES: &str = "Book Pages";
}

/// Largest book or page count taken at face value. Anything bigger is a
/// typo or an exponent (`1e20`) and is read as a coercion failure.
pub const MAX_COUNT: f64 = 1e12;

/// One course row. `None` means the sheet had no usable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseRecord {
    pub course_name: String,
    pub course_number: Option<String>,
    pub required_days: Option<f64>,
    pub completed_days: Option<f64>,
    pub completed_books: Option<u64>,
    pub book_pages: Option<u64>,
}

impl CourseRecord {
    /// Builds a record from day counts alone, mostly for callers that have
    /// no sheet at hand.
    pub fn new(course_name: &str, required_days: f64, completed_days: f64) -> Self {
        Self {
            course_name: course_name.trim().to_string(),
            course_number: None,
            required_days: Some(required_days),
            completed_days: Some(completed_days),
            completed_books: None,
            book_pages: None,
        }
    }

    /// Derived every time from the two day counts; missing counts as 0.
    pub fn status(&self) -> Status {
        classify(
            self.required_days.unwrap_or(0.0),
            self.completed_days.unwrap_or(0.0),
        )
    }

    /// Share of required days completed, clamped to `[0, 1]`.
    ///
    /// With no required days the course reads full once any day is logged,
    /// and empty otherwise.
    pub fn progress(&self) -> f64 {
        let required = self.required_days.unwrap_or(0.0);
        let completed = self.completed_days.unwrap_or(0.0);
        if required <= 0.0 {
            return if completed > 0.0 { 1.0 } else { 0.0 };
        }
        (completed / required).clamp(0.0, 1.0)
    }

    /// Day counts as seen under `policy`, or `None` if the record is excluded.
    pub fn day_counts(&self, policy: MissingPolicy) -> Option<(f64, f64)> {
        match policy {
            MissingPolicy::Zero => Some((
                self.required_days.unwrap_or(0.0),
                self.completed_days.unwrap_or(0.0),
            )),
            MissingPolicy::Exclude => self.required_days.zip(self.completed_days),
        }
    }

    /// Reads every row of `table` into a record.
    ///
    /// Book and page counts must be whole numbers no larger than
    /// [`MAX_COUNT`]; other values are reported as coercion warnings with
    /// the cell's sheet text and read as missing.
    ///
    /// # Errors
    ///
    /// [`PipelineError::SchemaMismatch`] if the table has no course column.
    pub fn from_table(
        table: &NormalizedTable,
    ) -> Result<(Vec<CourseRecord>, Vec<Warning>), PipelineError> {
        let course_idx = table.column_index(columns::COURSE).ok_or_else(|| {
            PipelineError::SchemaMismatch(format!("column '{}' not found", columns::COURSE))
        })?;
        let number_idx = table.column_index(columns::COURSE_NUMBER);
        let required_idx = table.column_index(columns::REQUIRED_DAYS);
        let completed_idx = table.column_index(columns::COMPLETED_DAYS);
        let books_idx = table.column_index(columns::COMPLETED_BOOKS);
        let pages_idx = table.column_index(columns::BOOK_PAGES);

        let mut warnings = Vec::new();
        let mut records = Vec::with_capacity(table.rows.len());

        for row in &table.rows {
            let text = |idx: Option<usize>| {
                idx.and_then(|i| row.cells.get(i))
                    .and_then(Cell::as_text)
                    .map(str::trim)
            };
            let number = |idx: Option<usize>| {
                idx.and_then(|i| row.cells.get(i)).and_then(Cell::as_number)
            };
            let mut count = |idx: Option<usize>, column: &str| {
                let i = idx?;
                let value = row.cells.get(i).and_then(Cell::as_number)?;
                if value.fract() == 0.0 && value <= MAX_COUNT {
                    Some(value as u64)
                } else {
                    warnings.push(Warning::ValueCoercion {
                        row: row.line,
                        column: column.to_string(),
                        raw: row.raw_text(i).to_string(),
                    });
                    None
                }
            };

            let completed_books = count(books_idx, columns::COMPLETED_BOOKS);
            let book_pages = count(pages_idx, columns::BOOK_PAGES);

            records.push(CourseRecord {
                course_name: text(Some(course_idx)).unwrap_or("").to_string(),
                course_number: text(number_idx)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
                required_days: number(required_idx),
                completed_days: number(completed_idx),
                completed_books,
                book_pages,
            });
        }

        debug!(records = records.len(), "Course records read");
        Ok((records, warnings))
    }
}
