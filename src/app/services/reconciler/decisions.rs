//! Reconciliation decisions

use crate::app::models::AssignmentKey;
use crate::app::store::ChangeSet;

/// One decision taken while reconciling an upload
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    StudentCreated {
        row: usize,
        email: String,
    },
    /// Names or student number overwritten (last write wins)
    StudentUpdated {
        row: usize,
        email: String,
        change: String,
    },
    AssignmentCreated {
        key: AssignmentKey,
        max_points: u32,
    },
    TagCreated {
        name: String,
    },
    GradeCreated {
        row: usize,
        index: usize,
        column: String,
        email: String,
        score: f64,
    },
    GradeUpdated {
        row: usize,
        index: usize,
        column: String,
        email: String,
        previous: f64,
        score: f64,
    },
    GradeUnchanged {
        row: usize,
        index: usize,
        column: String,
        email: String,
    },
    /// Stored max points differ from the upload's; the cell is skipped
    Conflict {
        row: usize,
        index: usize,
        column: String,
        email: String,
        stored_max_points: u32,
        incoming_max_points: u32,
    },
    /// Score stored, but above the assignment's max points
    ScoreAboveMax {
        row: usize,
        index: usize,
        column: String,
        email: String,
        score: f64,
        max_points: u32,
    },
}

/// Outcome of reconciling one upload
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Everything the store must write
    pub changes: ChangeSet,
    /// Decisions in file order
    pub decisions: Vec<Decision>,
    /// Rows that reached reconciliation
    pub processed_rows: usize,
}

impl Reconciliation {
    /// Number of decisions matching `predicate`
    pub fn count(&self, predicate: impl Fn(&Decision) -> bool) -> usize {
        self.decisions.iter().filter(|d| predicate(d)).count()
    }
}
