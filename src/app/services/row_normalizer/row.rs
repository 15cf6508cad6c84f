//! Normalized row types and skip records

use crate::app::services::layout_classifier::{AssignmentColumn, LayoutWarning};

/// Numeric score for one scorable assignment column
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCell {
    /// Position in [`NormalizedUpload::assignments`]
    pub assignment: usize,
    pub score: f64,
}

/// Data row that passed identity validation
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    /// 1-based file row
    pub row: usize,
    /// Trimmed, lower-cased email
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// `None` when the layout has no student number column or the cell is blank
    pub student_number: Option<String>,
    /// Non-empty, valid score cells in column order
    pub scores: Vec<ScoreCell>,
}

/// Data row dropped entirely
#[derive(Debug, Clone, PartialEq)]
pub struct RowSkip {
    pub row: usize,
    pub reason: String,
}

/// Score cell that could not be used; the rest of its row continues
#[derive(Debug, Clone, PartialEq)]
pub struct CellSkip {
    pub row: usize,
    /// 0-based file column
    pub index: usize,
    pub column: String,
    pub value: String,
    pub reason: String,
}

/// Assignment column excluded from reconciliation
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSkip {
    /// 0-based file column
    pub index: usize,
    pub column: String,
    pub reason: String,
}

/// Result of normalizing every data row of an upload
#[derive(Debug, Clone, Default)]
pub struct NormalizedUpload {
    /// Scorable assignment columns that carry data, in file order
    pub assignments: Vec<AssignmentColumn>,
    pub rows: Vec<NormalizedRow>,
    pub row_skips: Vec<RowSkip>,
    pub cell_skips: Vec<CellSkip>,
    pub column_skips: Vec<ColumnSkip>,
    /// Warnings raised while classifying the layout
    pub warnings: Vec<LayoutWarning>,
    /// Non-blank data rows seen
    pub total_rows: usize,
}

impl NormalizedUpload {
    /// Number of score cells ready for reconciliation
    pub fn score_count(&self) -> usize {
        self.rows.iter().map(|row| row.scores.len()).sum()
    }
}
