//! Classification result types

use crate::app::models::AssignmentKey;

/// Column indices of the identity fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityColumns {
    pub first_name: usize,
    pub last_name: usize,
    pub email: usize,
    pub student_number: Option<usize>,
}

impl IdentityColumns {
    /// Whether `index` is one of the identity columns
    pub fn contains(&self, index: usize) -> bool {
        index == self.first_name
            || index == self.last_name
            || index == self.email
            || self.student_number == Some(index)
    }
}

/// Scorable assignment column
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentColumn {
    pub index: usize,
    /// Header text as written in the file
    pub header: String,
    pub key: AssignmentKey,
    pub max_points: u32,
}

/// Assignment column excluded from reconciliation
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedColumn {
    pub index: usize,
    pub header: String,
    pub reason: String,
}

/// Non-fatal observation made while reading the sub-rows
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutWarning {
    /// 1-based file row
    pub row: usize,
    /// 0-based file column
    pub index: usize,
    pub column: String,
    pub message: String,
}

/// Result of classifying an upload's header rows
#[derive(Debug, Clone)]
pub struct ClassifiedLayout {
    /// Name of the winning layout profile
    pub layout_name: String,
    pub identity: IdentityColumns,
    pub assignments: Vec<AssignmentColumn>,
    pub rejected: Vec<RejectedColumn>,
    pub warnings: Vec<LayoutWarning>,
    /// 0-based index of the due-date row, if the file has one
    pub due_date_row: Option<usize>,
    /// 0-based index of the max-points row, if the file has one
    pub max_points_row: Option<usize>,
    /// 0-based index of the first data row
    pub data_start: usize,
}

impl ClassifiedLayout {
    /// Indices of every assignment column, scorable or not
    pub fn assignment_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.assignments
            .iter()
            .map(|column| column.index)
            .chain(self.rejected.iter().map(|column| column.index))
    }
}
