//! Upload report construction
//!
//! Aggregates the normalizer's skips and the reconciler's decisions into a
//! single report: counts for every kind of outcome plus an ordered list of
//! human-readable entries for everything a teacher should look at (skips,
//! conflicts, updates and warnings).
//!
//! ## Architecture
//!
//! - [`report`] - Report, counts and entry types with JSON and text output
//! - [`builder`] - Assembly and ordering of report entries

pub mod builder;
pub mod report;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use builder::ReportBuilder;
pub use report::{EntryKind, ReportCounts, ReportEntry, UploadReport};
