//! Course classification and program-level aggregation.
//!
//! This module derives a status for each course from its day counts and
//! reduces the filtered records, together with the program constants, into
//! a single [`types::ProgramSummary`].

pub mod aggregate;
pub mod status;
pub mod types;
pub mod utility;
