use crate::analyzers::status::Status;
use crate::analyzers::types::{CompletionSlice, ProgramSummary, StatusCount};
use crate::analyzers::utility::{pct, round1};
use crate::config::{MissingPolicy, ProgramConstants};
use crate::course::CourseRecord;
use chrono::{NaiveDate, Utc};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Reduces the filtered course records and the program constants into a
/// [`ProgramSummary`].
///
/// Every ratio with a zero denominator reads 0 instead of failing. An empty
/// record set additionally sets `no_course_data`. The calendar percentage is
/// left unclamped, so it passes 100 once `program_end` is behind `today`.
pub fn summarize(
    records: &[CourseRecord],
    constants: &ProgramConstants,
    policy: MissingPolicy,
    today: NaiveDate,
) -> ProgramSummary {
    let total_courses = records.len();
    let counts = count_statuses(records);
    let count = |s: Status| counts.get(&s).copied().unwrap_or(0);
    let completed_courses = count(Status::Completed);

    let total_books = records
        .iter()
        .filter_map(|r| r.completed_books)
        .fold(0u64, u64::saturating_add);
    let total_pages = records
        .iter()
        .filter_map(|r| r.book_pages)
        .fold(0u64, u64::saturating_add);

    let (total_required_days, total_completed_days) = records
        .iter()
        .filter_map(|r| r.day_counts(policy))
        .fold((0.0, 0.0), |(req, done), (r, c)| (req + r, done + c));

    let excluded = records.iter().filter(|r| r.day_counts(policy).is_none()).count();
    if excluded > 0 {
        debug!(excluded, "Records without day counts left out of day totals");
    }

    if total_courses == 0 {
        warn!("No curriculum courses to aggregate");
    }

    let summary = ProgramSummary {
        generated_at: Utc::now(),
        total_courses,
        completed_courses,
        in_progress_courses: count(Status::InProgress),
        not_started_courses: count(Status::NotStarted),
        completed_courses_pct: round1(pct(completed_courses as f64, total_courses as f64)),
        total_books,
        total_pages,
        total_required_days,
        total_completed_days,
        program_day_pct: round1(pct(total_completed_days, total_required_days)),
        theses_total: constants.theses_total,
        theses_completed: constants.theses_completed,
        theses_pct: round1(pct(
            constants.theses_completed as f64,
            constants.theses_total as f64,
        )),
        comps_total: constants.comps_total,
        comps_completed: constants.comps_completed,
        comps_pct: round1(pct(
            constants.comps_completed as f64,
            constants.comps_total as f64,
        )),
        calendar_pct_complete: calendar_pct(constants, today),
        days_remaining: (constants.program_end - today).num_days(),
        no_course_data: total_courses == 0,
    };

    debug!(
        total_courses,
        completed_courses,
        program_day_pct = summary.program_day_pct,
        calendar_pct = summary.calendar_pct_complete,
        "Program summary computed"
    );
    summary
}

/// Elapsed share of the program calendar, in percent, one decimal.
///
/// Negative before `program_start`, above 100 after `program_end`, and 0
/// when the calendar is empty or inverted.
pub fn calendar_pct(constants: &ProgramConstants, today: NaiveDate) -> f64 {
    let span = (constants.program_end - constants.program_start).num_days();
    if span <= 0 {
        return 0.0;
    }
    let elapsed = (today - constants.program_start).num_days();
    round1(elapsed as f64 / span as f64 * 100.0)
}

/// Course count per status, in [`Status::ALL`] order, statuses with no
/// courses left out.
pub fn status_breakdown(records: &[CourseRecord]) -> Vec<StatusCount> {
    let counts = count_statuses(records);
    Status::ALL
        .iter()
        .filter_map(|s| {
            counts.get(s).map(|&count| StatusCount { status: *s, count })
        })
        .collect()
}

/// Completed/remaining splits for theses and comps.
pub fn milestone_slices(summary: &ProgramSummary) -> (CompletionSlice, CompletionSlice) {
    (
        CompletionSlice::new(summary.theses_completed, summary.theses_total),
        CompletionSlice::new(summary.comps_completed, summary.comps_total),
    )
}

fn count_statuses(records: &[CourseRecord]) -> BTreeMap<Status, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.status()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn constants() -> ProgramConstants {
        ProgramConstants {
            theses_total: 45,
            theses_completed: 4,
            comps_total: 45,
            comps_completed: 0,
            program_start: date(2025, 7, 1),
            program_end: date(2026, 7, 1),
        }
    }

    fn record(name: &str, required: f64, completed: f64, books: u64, pages: u64) -> CourseRecord {
        CourseRecord {
            completed_books: Some(books),
            book_pages: Some(pages),
            ..CourseRecord::new(name, required, completed)
        }
    }

    fn sample() -> Vec<CourseRecord> {
        vec![
            record("Irregular Warfare", 10.0, 10.0, 2, 300),
            record("Space Power", 8.0, 0.0, 0, 0),
            record("Coercion in Theory and Practice", 12.0, 6.0, 1, 150),
        ]
    }

    #[test]
    fn test_summarize_counts_and_sums() {
        let s = summarize(&sample(), &constants(), MissingPolicy::Zero, date(2026, 1, 1));

        assert_eq!(s.total_courses, 3);
        assert_eq!(s.completed_courses, 1);
        assert_eq!(s.in_progress_courses, 1);
        assert_eq!(s.not_started_courses, 1);
        assert_eq!(s.completed_courses_pct, 33.3);
        assert_eq!(s.total_books, 3);
        assert_eq!(s.total_pages, 450);
        assert_eq!(s.total_required_days, 30.0);
        assert_eq!(s.total_completed_days, 16.0);
        assert_eq!(s.program_day_pct, 53.3);
        assert_eq!(s.theses_pct, 8.9);
        assert_eq!(s.comps_pct, 0.0);
        assert!(!s.no_course_data);
    }

    #[test]
    fn test_summarize_empty_records_is_degraded_not_error() {
        let s = summarize(&[], &constants(), MissingPolicy::Zero, date(2026, 1, 1));

        assert_eq!(s.total_courses, 0);
        assert_eq!(s.completed_courses_pct, 0.0);
        assert_eq!(s.program_day_pct, 0.0);
        assert!(s.no_course_data);
    }

    #[test]
    fn test_book_and_page_totals_saturate() {
        let records = vec![
            record("Irregular Warfare", 10.0, 10.0, u64::MAX, u64::MAX - 1),
            record("Space Power", 8.0, 0.0, 1, 300),
        ];
        let s = summarize(&records, &constants(), MissingPolicy::Zero, date(2026, 1, 1));
        assert_eq!(s.total_books, u64::MAX);
        assert_eq!(s.total_pages, u64::MAX);
    }

    #[test]
    fn test_program_day_pct_zero_required_days() {
        let records = vec![record("Space Power", 0.0, 0.0, 0, 0)];
        let s = summarize(&records, &constants(), MissingPolicy::Zero, date(2026, 1, 1));
        assert_eq!(s.program_day_pct, 0.0);
    }

    #[test]
    fn test_percentages_stay_in_range() {
        let records = vec![
            record("Irregular Warfare", 10.0, 10.0, 0, 0),
            record("Space Power", 4.0, 4.0, 0, 0),
        ];
        let s = summarize(&records, &constants(), MissingPolicy::Zero, date(2026, 1, 1));
        assert_eq!(s.completed_courses_pct, 100.0);
        assert_eq!(s.program_day_pct, 100.0);
    }

    #[test]
    fn test_missing_policy_exclude_drops_unreported_days() {
        let mut unreported = record("Space Power", 20.0, 0.0, 0, 0);
        unreported.completed_days = None;
        let records = vec![record("Irregular Warfare", 10.0, 5.0, 0, 0), unreported];

        let zero = summarize(&records, &constants(), MissingPolicy::Zero, date(2026, 1, 1));
        assert_eq!(zero.total_required_days, 30.0);
        assert_eq!(zero.program_day_pct, 16.7);

        let excluded = summarize(&records, &constants(), MissingPolicy::Exclude, date(2026, 1, 1));
        assert_eq!(excluded.total_required_days, 10.0);
        assert_eq!(excluded.program_day_pct, 50.0);
        // Status counts are unaffected by the policy.
        assert_eq!(excluded.total_courses, 2);
        assert_eq!(excluded.not_started_courses, 1);
    }

    #[test]
    fn test_calendar_pct_is_not_clamped() {
        let c = constants();
        assert_eq!(calendar_pct(&c, date(2025, 7, 1)), 0.0);
        assert_eq!(calendar_pct(&c, date(2026, 7, 1)), 100.0);
        assert!(calendar_pct(&c, date(2026, 10, 18)) > 100.0);
        assert!(calendar_pct(&c, date(2025, 6, 1)) < 0.0);
    }

    #[test]
    fn test_calendar_pct_empty_calendar() {
        let mut c = constants();
        c.program_end = c.program_start;
        assert_eq!(calendar_pct(&c, date(2026, 1, 1)), 0.0);
    }

    #[test]
    fn test_days_remaining() {
        let s = summarize(&[], &constants(), MissingPolicy::Zero, date(2026, 6, 21));
        assert_eq!(s.days_remaining, 10);
        let s = summarize(&[], &constants(), MissingPolicy::Zero, date(2026, 7, 11));
        assert_eq!(s.days_remaining, -10);
    }

    #[test]
    fn test_zero_milestone_totals() {
        let mut c = constants();
        c.theses_total = 0;
        c.comps_total = 0;
        let s = summarize(&[], &c, MissingPolicy::Zero, date(2026, 1, 1));
        assert_eq!(s.theses_pct, 0.0);
        assert_eq!(s.comps_pct, 0.0);
    }

    #[test]
    fn test_status_breakdown_skips_empty_statuses() {
        let records = vec![
            record("Irregular Warfare", 10.0, 10.0, 0, 0),
            record("Space Power", 4.0, 4.0, 0, 0),
            record("Foundations of Strategy", 4.0, 0.0, 0, 0),
        ];
        let breakdown = status_breakdown(&records);
        assert_eq!(
            breakdown,
            vec![
                StatusCount { status: Status::Completed, count: 2 },
                StatusCount { status: Status::NotStarted, count: 1 },
            ]
        );
    }

    #[test]
    fn test_milestone_slices() {
        let s = summarize(&[], &constants(), MissingPolicy::Zero, date(2026, 1, 1));
        let (theses, comps) = milestone_slices(&s);
        assert_eq!(theses, CompletionSlice { completed: 4, remaining: 41 });
        assert_eq!(comps, CompletionSlice { completed: 0, remaining: 45 });
    }
}
