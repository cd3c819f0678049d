use serde::Serialize;
use std::fmt;

/// Progress state of a single course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Status {
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Not Started")]
    NotStarted,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Completed, Status::InProgress, Status::NotStarted];

    pub fn label(&self) -> &'static str {
        match self {
            Status::Completed => "Completed",
            Status::InProgress => "In Progress",
            Status::NotStarted => "Not Started",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies a course from its required and completed day counts.
///
/// | Condition                                   | Status      |
/// |---------------------------------------------|-------------|
/// | `completed >= required` and `required > 0`  | Completed   |
/// | `completed == 0`                            | Not Started |
/// | otherwise                                   | In Progress |
///
/// The Completed check runs first, so `(0, 0)` is Not Started and a course
/// with no required days but some completed days is In Progress.
pub fn classify(required_days: f64, completed_days: f64) -> Status {
    match (required_days, completed_days) {
        (r, c) if c >= r && r > 0.0 => Status::Completed,
        (_, c) if c == 0.0 => Status::NotStarted,
        _ => Status::InProgress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(10.0, 10.0), Status::Completed);
        assert_eq!(classify(10.0, 12.0), Status::Completed);
        assert_eq!(classify(10.0, 9.5), Status::InProgress);
        assert_eq!(classify(12.0, 6.0), Status::InProgress);
        assert_eq!(classify(8.0, 0.0), Status::NotStarted);
    }

    #[test]
    fn test_zero_required_is_never_completed() {
        assert_eq!(classify(0.0, 0.0), Status::NotStarted);
        assert_eq!(classify(0.0, 3.0), Status::InProgress);
    }

    #[test]
    fn test_classify_is_total() {
        for required in [0.0, 0.5, 1.0, 7.0, 30.0] {
            for completed in [0.0, 0.5, 1.0, 7.0, 30.0, 45.0] {
                let status = classify(required, completed);
                let matches = Status::ALL.iter().filter(|s| **s == status).count();
                assert_eq!(matches, 1);
            }
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(Status::InProgress.to_string(), "In Progress");
        assert_eq!(
            serde_json::to_string(&Status::NotStarted).unwrap(),
            "\"Not Started\""
        );
    }
}
