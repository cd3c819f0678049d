//! Data types produced by the aggregation step.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyzers::status::Status;

/// Program-wide figures for one run.
///
/// Flat so that a snapshot can be appended to a CSV file as one row.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ProgramSummary {
    pub generated_at: DateTime<Utc>,

    // courses
    pub total_courses: usize,
    pub completed_courses: usize,
    pub in_progress_courses: usize,
    pub not_started_courses: usize,
    pub completed_courses_pct: f64,

    // reading
    pub total_books: u64,
    pub total_pages: u64,

    // days
    pub total_required_days: f64,
    pub total_completed_days: f64,
    pub program_day_pct: f64,

    // external milestones
    pub theses_total: u32,
    pub theses_completed: u32,
    pub theses_pct: f64,
    pub comps_total: u32,
    pub comps_completed: u32,
    pub comps_pct: f64,

    // calendar
    pub calendar_pct_complete: f64,
    pub days_remaining: i64,

    /// Set when no curriculum course was available; course ratios read 0.
    pub no_course_data: bool,
}

/// Number of courses in one status, for the status breakdown chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: Status,
    pub count: usize,
}

/// Completed vs remaining split of a milestone, for the theses and comps
/// charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletionSlice {
    pub completed: u32,
    pub remaining: u32,
}

impl CompletionSlice {
    pub fn new(completed: u32, total: u32) -> Self {
        Self {
            completed,
            remaining: total.saturating_sub(completed),
        }
    }
}
