//! Row normalization for classified uploads
//!
//! Cleans the data rows of an upload once its layout is known: drops fully
//! blank rows and columns, validates identity cells, and turns every score
//! cell into either a numeric score, "not submitted", or a per-cell skip.
//!
//! Nothing here aborts an upload. Problems are recorded as row, cell or
//! column skips and carried forward to the upload report.
//!
//! ## Architecture
//!
//! - [`normalizer`] - Blank elimination, coverage threshold, per-row cleaning
//! - [`row`] - Normalized rows and skip records

pub mod normalizer;
pub mod row;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use normalizer::RowNormalizer;
pub use row::{CellSkip, ColumnSkip, NormalizedRow, NormalizedUpload, RowSkip, ScoreCell};
