//! Restricts records to the curriculum allow-list.

use std::collections::HashSet;
use tracing::debug;

use crate::course::CourseRecord;

/// Trimmed allow-list of course names.
pub struct Curriculum<'a> {
    allowed: HashSet<&'a str>,
}

impl<'a> Curriculum<'a> {
    pub fn new(allow_list: &'a [String]) -> Self {
        Self {
            allowed: allow_list.iter().map(|s| s.trim()).collect(),
        }
    }

    /// Exact match after trimming; no case folding, no partial names.
    pub fn contains(&self, course_name: &str) -> bool {
        self.allowed.contains(course_name.trim())
    }
}

/// Keeps records whose trimmed course name exactly matches a trimmed
/// allow-list entry. Anything else, electives included, is dropped.
pub fn filter_curriculum(records: Vec<CourseRecord>, allow_list: &[String]) -> Vec<CourseRecord> {
    let curriculum = Curriculum::new(allow_list);
    let before = records.len();

    let kept: Vec<CourseRecord> = records
        .into_iter()
        .filter(|r| curriculum.contains(&r.course_name))
        .collect();

    debug!(before, kept = kept.len(), "Curriculum filter applied");
    kept
}
