//! Upload report types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of report entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    RowSkipped,
    CellSkipped,
    AssignmentSkipped,
    Conflict,
    GradeUpdated,
    StudentUpdated,
    Warning,
}

impl EntryKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::RowSkipped => "row skipped",
            EntryKind::CellSkipped => "cell skipped",
            EntryKind::AssignmentSkipped => "assignment skipped",
            EntryKind::Conflict => "conflict",
            EntryKind::GradeUpdated => "grade updated",
            EntryKind::StudentUpdated => "student updated",
            EntryKind::Warning => "warning",
        }
    }

    /// Whether the entry means uploaded data was not stored
    pub fn is_problem(&self) -> bool {
        matches!(
            self,
            EntryKind::RowSkipped
                | EntryKind::CellSkipped
                | EntryKind::AssignmentSkipped
                | EntryKind::Conflict
        )
    }
}

/// One reportable outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub kind: EntryKind,

    /// 1-based file row; absent for whole-column entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,

    /// Assignment column header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,

    /// 0-based file column, used for ordering
    #[serde(skip)]
    pub column_index: Option<usize>,

    /// Normalized student email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<String>,

    pub reason: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ReportEntry {
    pub fn new(kind: EntryKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            row: None,
            column: None,
            column_index: None,
            student: None,
            reason: reason.into(),
            detail: None,
        }
    }

    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn in_column(mut self, index: usize, header: impl Into<String>) -> Self {
        self.column_index = Some(index);
        self.column = Some(header.into());
        self
    }

    pub fn for_student(mut self, email: impl Into<String>) -> Self {
        self.student = Some(email.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut location = Vec::new();
        if let Some(row) = self.row {
            location.push(format!("row {}", row));
        }
        if let Some(column) = &self.column {
            location.push(format!("'{}'", column));
        }
        if let Some(student) = &self.student {
            location.push(student.clone());
        }

        if location.is_empty() {
            write!(f, "[{}] {}", self.kind.label(), self.reason)?;
        } else {
            write!(f, "[{}] {}: {}", self.kind.label(), location.join(", "), self.reason)?;
        }
        if let Some(detail) = &self.detail {
            write!(f, " ({})", detail)?;
        }
        Ok(())
    }
}

/// Outcome counts for one upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCounts {
    pub new_students: usize,
    pub updated_students: usize,
    pub new_assignments: usize,
    pub new_tags: usize,
    pub new_grades: usize,
    pub updated_grades: usize,
    pub unchanged_grades: usize,
    pub skipped_rows: usize,
    pub skipped_cells: usize,
    pub skipped_assignments: usize,
    pub conflicts: usize,
    pub warnings: usize,
    /// Rows that reached reconciliation
    pub processed_rows: usize,
    /// Non-blank data rows in the file
    pub total_rows: usize,
}

/// Structured result of one upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReport {
    /// File the upload came from, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Layout the file was classified as
    pub layout: String,

    /// Whether the changes were left unapplied
    pub dry_run: bool,

    pub counts: ReportCounts,

    /// Entries ordered by file row, then column
    pub entries: Vec<ReportEntry>,
}

impl UploadReport {
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Whether any uploaded data was skipped or conflicted
    pub fn has_problems(&self) -> bool {
        self.entries.iter().any(|entry| entry.kind.is_problem())
    }

    /// Entries of one kind, in report order
    pub fn entries_of(&self, kind: EntryKind) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(move |entry| entry.kind == kind)
    }

    /// Get summary string for logging
    pub fn summary(&self) -> String {
        let c = &self.counts;
        format!(
            "Upload Summary: {}/{} rows processed | Students: {} new, {} updated | \
             Assignments: {} new | Grades: {} new, {} updated, {} unchanged | \
             Skipped: {} rows, {} cells, {} assignments | Conflicts: {} | Warnings: {}",
            c.processed_rows,
            c.total_rows,
            c.new_students,
            c.updated_students,
            c.new_assignments,
            c.new_grades,
            c.updated_grades,
            c.unchanged_grades,
            c.skipped_rows,
            c.skipped_cells,
            c.skipped_assignments,
            c.conflicts,
            c.warnings
        )
    }
}

impl fmt::Display for UploadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            writeln!(f, "{} ({} layout)", source, self.layout)?;
        } else {
            writeln!(f, "{} layout", self.layout)?;
        }
        if self.dry_run {
            writeln!(f, "Dry run: no changes were saved")?;
        }
        writeln!(f, "{}", self.summary())?;
        for entry in &self.entries {
            writeln!(f, "  {}", entry)?;
        }
        Ok(())
    }
}
