//! Entity reconciliation for normalized uploads
//!
//! Maps normalized rows onto students, assignments and grades, deciding per
//! grade cell whether to create, update or leave the stored record alone.
//! Identity always comes from cell content: students by normalized email,
//! assignments by (name, due date), grades by (student, assignment).
//!
//! Reads go through a staged overlay so later rows see what earlier rows
//! created, while the store itself is only written once, by the caller, from
//! the resulting [`ChangeSet`](crate::app::store::ChangeSet).
//!
//! ## Architecture
//!
//! - [`reconciler`] - Per-row, per-cell decision logic
//! - [`staging`] - Overlay of staged changes on top of the store
//! - [`decisions`] - Decision records handed to the report builder

pub mod decisions;
pub mod reconciler;
pub mod staging;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use decisions::{Decision, Reconciliation};
pub use reconciler::EntityReconciler;
pub use staging::StagedStore;
