//! Fetch → normalize → filter → classify → aggregate, in one call.

use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::analyzers::aggregate::{status_breakdown, summarize};
use crate::analyzers::types::{ProgramSummary, StatusCount};
use crate::config::DashboardConfig;
use crate::course::CourseRecord;
use crate::error::{PipelineError, Warning};
use crate::fetch::{HttpClient, load_source};
use crate::filter::{Curriculum, filter_curriculum};
use crate::normalize::normalize;
use crate::parser::{RawGrid, parse_grid};

/// Everything a presenter needs for one run.
#[derive(Debug, Clone)]
pub struct Report {
    pub records: Vec<CourseRecord>,
    pub summary: ProgramSummary,
    pub warnings: Vec<Warning>,
}

impl Report {
    pub fn status_breakdown(&self) -> Vec<StatusCount> {
        status_breakdown(&self.records)
    }

    /// True when something was skipped or could not be read.
    pub fn is_degraded(&self) -> bool {
        self.summary.no_course_data || !self.warnings.is_empty()
    }
}

/// Fetches the configured source and builds a [`Report`] from it.
///
/// # Errors
///
/// Only blocking failures are returned: [`PipelineError::SourceUnavailable`]
/// and [`PipelineError::MalformedSource`]. Layout problems degrade into an
/// empty report with warnings.
#[tracing::instrument(skip(client, config), fields(source = %config.source_url))]
pub async fn run<C: HttpClient>(
    client: &C,
    config: &DashboardConfig,
    today: NaiveDate,
) -> Result<Report, PipelineError> {
    let bytes = load_source(client, &config.source_url).await?;
    let grid = parse_grid(&bytes)?;
    let report = build_report(&grid, config, today);

    info!(
        courses = report.summary.total_courses,
        warnings = report.warnings.len(),
        "Report built"
    );
    Ok(report)
}

/// Builds a [`Report`] from an already parsed grid. Never fails: schema
/// problems become warnings and an empty record set.
pub fn build_report(grid: &RawGrid, config: &DashboardConfig, today: NaiveDate) -> Report {
    let mut warnings = Vec::new();

    let records = match read_records(grid, config, &mut warnings) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "Sheet layout did not match, rendering without course data");
            warnings.push(Warning::SchemaMismatch {
                message: e.to_string(),
            });
            Vec::new()
        }
    };

    if records.is_empty() {
        warnings.push(Warning::NoCourseData);
    }

    for w in &warnings {
        warn!(warning = %w, "Report warning");
    }

    let summary = summarize(
        &records,
        &config.constants,
        config.missing_numeric,
        today,
    );

    Report {
        records,
        summary,
        warnings,
    }
}

/// Reads and filters the curriculum records. Coercion warnings from rows
/// the filter drops are discarded with them.
fn read_records(
    grid: &RawGrid,
    config: &DashboardConfig,
    warnings: &mut Vec<Warning>,
) -> Result<Vec<CourseRecord>, PipelineError> {
    let (table, mut sheet_warnings) = normalize(grid, &config.layout)?;
    let (records, record_warnings) = CourseRecord::from_table(&table)?;
    sheet_warnings.extend(record_warnings);

    let curriculum = Curriculum::new(&config.curriculum);
    let kept_lines: HashSet<usize> = table
        .rows
        .iter()
        .zip(&records)
        .filter(|(_, record)| curriculum.contains(&record.course_name))
        .map(|(row, _)| row.line)
        .collect();

    let before = sheet_warnings.len();
    sheet_warnings.retain(|w| match w {
        Warning::ValueCoercion { row, .. } => kept_lines.contains(row),
        _ => true,
    });
    if sheet_warnings.len() < before {
        debug!(
            dropped = before - sheet_warnings.len(),
            "Coercion warnings outside the curriculum dropped"
        );
    }
    warnings.extend(sheet_warnings);

    Ok(filter_curriculum(records, &config.curriculum))
}
