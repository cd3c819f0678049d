//! Dashboard configuration.
//!
//! Everything the original dashboard hardcoded lives here: the sheet URL,
//! where the header sits, which columns are numeric, the curriculum
//! allow-list, and the program constants. Stored as JSON on disk:
//!
//! ```json
//! {
//!   "source_url": "https://docs.google.com/.../pub?output=csv",
//!   "layout": { "header_row_index": 2, "data_start_index": 3 },
//!   "missing_numeric": "exclude",
//!   "constants": { "theses_completed": 6 }
//! }
//! ```
//!
//! Keys left out of the file keep their defaults.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::course::columns;

/// Environment variable that overrides [`DashboardConfig::source_url`].
pub const SOURCE_ENV_VAR: &str = "COURSE_PROGRESS_SOURCE";

const DEFAULT_SOURCE_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vTUoPJRLuSRN1Y2GOSunfe0YtIECq2AeRzpVRoTVbDWbJ0Zw3J7VPUpKZjSDlKEYIeoELN39pBFUZJB/pub?gid=1897265951&single=true&output=csv";

static DEFAULT_CURRICULUM: &[&str] = &[
    "Foundations of Strategy",
    "Foundations of Military Theory",
    "Air Power in the Age of Total War",
    "Foundations of Int'l Politics",
    "Air Power in the Age of Limited War",
    "Coercion in Theory and Practice",
    "Irregular Warfare",
    "Information and Cyber Power",
    "Space Power",
    "Technology and Military Innovation",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Published CSV URL or a local file path.
    pub source_url: String,
    /// Request timeout in seconds; `None` waits indefinitely.
    pub request_timeout_secs: Option<u64>,
    pub layout: SheetLayout,
    pub curriculum: Vec<String>,
    pub missing_numeric: MissingPolicy,
    pub constants: ProgramConstants,
}

/// Where the header and data rows sit in the raw grid, and how columns are
/// named and typed.
///
/// Indices count rows of the raw CSV, starting at 0 with the first line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    pub header_row_index: usize,
    pub data_start_index: usize,
    /// Raw header name → canonical column name.
    pub column_aliases: BTreeMap<String, String>,
    /// Canonical names of columns coerced to numbers.
    pub numeric_columns: Vec<String>,
}

/// What a missing numeric value means to the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Treat missing as zero progress.
    #[default]
    Zero,
    /// Leave records with missing day counts out of day-based ratios.
    Exclude,
}

/// Figures that do not come from the course sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramConstants {
    pub theses_total: u32,
    pub theses_completed: u32,
    pub comps_total: u32,
    pub comps_completed: u32,
    pub program_start: NaiveDate,
    pub program_end: NaiveDate,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            request_timeout_secs: Some(30),
            layout: SheetLayout::default(),
            curriculum: DEFAULT_CURRICULUM.iter().map(|s| s.to_string()).collect(),
            missing_numeric: MissingPolicy::default(),
            constants: ProgramConstants::default(),
        }
    }
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            header_row_index: 2,
            data_start_index: 3,
            column_aliases: BTreeMap::from([(
                "Course Title".to_string(),
                columns::COURSE.to_string(),
            )]),
            numeric_columns: vec![
                columns::REQUIRED_DAYS.to_string(),
                columns::COMPLETED_DAYS.to_string(),
                columns::COMPLETED_BOOKS.to_string(),
                columns::BOOK_PAGES.to_string(),
            ],
        }
    }
}

impl Default for ProgramConstants {
    fn default() -> Self {
        Self {
            theses_total: 45,
            theses_completed: 4,
            comps_total: 45,
            comps_completed: 0,
            program_start: NaiveDate::from_ymd_opt(2025, 7, 14).unwrap_or(NaiveDate::MIN),
            program_end: NaiveDate::from_ymd_opt(2026, 6, 12).unwrap_or(NaiveDate::MIN),
        }
    }
}

impl DashboardConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{path}'"))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file '{path}'"))?;
        debug!(path, "Loaded dashboard config");
        Ok(config)
    }

    /// Loads `path` when given, otherwise starts from the defaults, then
    /// applies environment overrides.
    pub fn resolve(path: Option<&str>) -> Result<Self> {
        let config = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    /// Applies [`SOURCE_ENV_VAR`] if it is set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(source) = std::env::var(SOURCE_ENV_VAR) {
            if !source.trim().is_empty() {
                debug!(source = %source, "Source overridden from environment");
                self.source_url = source;
            }
        }
        self
    }
}
