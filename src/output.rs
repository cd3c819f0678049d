//! Output formatting and persistence for reports.
//!
//! Supports a plain-text dashboard, JSON, a course table CSV, and appending
//! summary snapshots to a CSV file.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::analyzers::aggregate::milestone_slices;
use crate::analyzers::status::Status;
use crate::analyzers::types::ProgramSummary;
use crate::course::CourseRecord;
use crate::pipeline::Report;
use csv::WriterBuilder;
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::path::Path;

/// One line of the course table as shown to readers.
#[derive(Debug, Serialize)]
pub struct CourseRow<'a> {
    pub course: &'a str,
    pub course_number: Option<&'a str>,
    pub required_days: Option<f64>,
    pub completed_days: Option<f64>,
    pub completed_books: Option<u64>,
    pub book_pages: Option<u64>,
    pub status: Status,
    pub progress_pct: f64,
}

impl<'a> From<&'a CourseRecord> for CourseRow<'a> {
    fn from(r: &'a CourseRecord) -> Self {
        Self {
            course: &r.course_name,
            course_number: r.course_number.as_deref(),
            required_days: r.required_days,
            completed_days: r.completed_days,
            completed_books: r.completed_books,
            book_pages: r.book_pages,
            status: r.status(),
            progress_pct: (r.progress() * 1000.0).round() / 10.0,
        }
    }
}

/// Logs a summary using Rust's debug pretty-print format.
pub fn print_pretty(summary: &ProgramSummary) {
    debug!("{:#?}", summary);
}

/// Renders the full report as pretty-printed JSON.
pub fn to_json(report: &Report) -> Result<String> {
    let (theses, comps) = milestone_slices(&report.summary);
    let courses: Vec<CourseRow> = report.records.iter().map(CourseRow::from).collect();

    let value = serde_json::json!({
        "summary": report.summary,
        "courses": courses,
        "status_breakdown": report.status_breakdown(),
        "theses": theses,
        "comps": comps,
        "warnings": report.warnings,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Renders the report as a plain-text dashboard.
pub fn render_text(report: &Report) -> String {
    let s = &report.summary;
    let mut out = String::new();

    let _ = writeln!(out, "Summary Statistics");
    let _ = writeln!(out, "  Overall Program Progress  {}%", s.program_day_pct);
    let _ = writeln!(
        out,
        "  Course Completion         {} / {} ({}%)",
        s.completed_courses, s.total_courses, s.completed_courses_pct
    );
    let _ = writeln!(out, "  Books Completed           {}", s.total_books);
    let _ = writeln!(out, "  Pages Read                {}", s.total_pages);
    let _ = writeln!(
        out,
        "  Theses Completed          {} / {} ({}%)",
        s.theses_completed, s.theses_total, s.theses_pct
    );
    let _ = writeln!(
        out,
        "  Comps Completed           {} / {} ({}%)",
        s.comps_completed, s.comps_total, s.comps_pct
    );
    let _ = writeln!(out, "  Calendar Elapsed          {}%", s.calendar_pct_complete);
    let _ = writeln!(out, "  Days Remaining            {}", s.days_remaining);

    if !report.records.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Status Breakdown");
        for entry in report.status_breakdown() {
            let _ = writeln!(out, "  {:<12} {}", entry.status.label(), entry.count);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Course Table");
        let _ = writeln!(
            out,
            "  {:<40} {:<8} {:>8} {:>8} {:>6} {:>7}  {:<12} {:>6}",
            "Course", "Number", "Req", "Done", "Books", "Pages", "Status", "Prog%"
        );
        for record in &report.records {
            let row = CourseRow::from(record);
            let _ = writeln!(
                out,
                "  {:<40} {:<8} {:>8} {:>8} {:>6} {:>7}  {:<12} {:>6}",
                row.course,
                row.course_number.unwrap_or(""),
                cell(row.required_days),
                cell(row.completed_days),
                cell(row.completed_books),
                cell(row.book_pages),
                row.status.label(),
                row.progress_pct,
            );
        }
        let _ = writeln!(
            out,
            "  {:<40} {:<8} {:>8} {:>8} {:>6} {:>7}",
            "Total",
            "",
            s.total_required_days,
            s.total_completed_days,
            s.total_books,
            s.total_pages,
        );
    }

    if report.is_degraded() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Warnings");
        for w in &report.warnings {
            let _ = writeln!(out, "  ! {w}");
        }
    }

    out
}

fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Writes the course table to a CSV file, replacing any existing file.
pub fn write_course_table(path: &str, records: &[CourseRecord]) -> Result<()> {
    let mut writer = WriterBuilder::new().from_path(path)?;
    for record in records {
        writer.serialize(CourseRow::from(record))?;
    }
    writer.flush()?;
    debug!(path, rows = records.len(), "Course table written");
    Ok(())
}

/// Appends a [`ProgramSummary`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, summary: &ProgramSummary) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(summary)?;
    writer.flush()?;

    Ok(())
}
