//! Layout classification for gradebook uploads
//!
//! Decides which columns hold student identity (first name, last name, email)
//! and which hold assignment scores, and locates the due-date and max-points
//! sub-rows that ride beneath the assignment name row.
//!
//! Supported layouts are configuration records ([`crate::config::LayoutProfile`])
//! tried in preference order. The first profile whose identity matchers each
//! resolve to exactly one column wins; if none does, the upload is rejected
//! instead of guessing which column is which.
//!
//! ## Architecture
//!
//! - [`profile`] - Compiled header matchers and header normalization
//! - [`classifier`] - Profile selection, sub-row detection, assignment vetting
//! - [`layout`] - Classification result types

pub mod classifier;
pub mod layout;
pub mod profile;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use classifier::LayoutClassifier;
pub use layout::{AssignmentColumn, ClassifiedLayout, IdentityColumns, LayoutWarning, RejectedColumn};
pub use profile::{CompiledProfile, normalize_header};
