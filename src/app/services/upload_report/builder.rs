//! Report assembly

use super::report::{EntryKind, ReportCounts, ReportEntry, UploadReport};
use crate::app::services::reconciler::{Decision, Reconciliation};
use crate::app::services::row_normalizer::NormalizedUpload;
use crate::constants::reasons;

/// Builds an [`UploadReport`] from the normalizer and reconciler outputs
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    layout: String,
    dry_run: bool,
}

impl ReportBuilder {
    pub fn new(layout: impl Into<String>) -> Self {
        Self {
            layout: layout.into(),
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn build(self, upload: &NormalizedUpload, reconciliation: &Reconciliation) -> UploadReport {
        let mut counts = ReportCounts {
            skipped_rows: upload.row_skips.len(),
            skipped_cells: upload.cell_skips.len(),
            skipped_assignments: upload.column_skips.len(),
            warnings: upload.warnings.len(),
            processed_rows: reconciliation.processed_rows,
            total_rows: upload.total_rows,
            ..ReportCounts::default()
        };
        let mut entries = Vec::new();

        for skip in &upload.column_skips {
            entries.push(
                ReportEntry::new(EntryKind::AssignmentSkipped, &skip.reason)
                    .in_column(skip.index, &skip.column),
            );
        }

        for warning in &upload.warnings {
            entries.push(
                ReportEntry::new(EntryKind::Warning, &warning.message)
                    .at_row(warning.row)
                    .in_column(warning.index, &warning.column),
            );
        }

        for skip in &upload.row_skips {
            entries.push(ReportEntry::new(EntryKind::RowSkipped, &skip.reason).at_row(skip.row));
        }

        for skip in &upload.cell_skips {
            entries.push(
                ReportEntry::new(EntryKind::CellSkipped, &skip.reason)
                    .at_row(skip.row)
                    .in_column(skip.index, &skip.column)
                    .with_detail(format!("value '{}'", skip.value)),
            );
        }

        for decision in &reconciliation.decisions {
            if let Some(entry) = record(decision, &mut counts) {
                entries.push(entry);
            }
        }

        // Stable, so entries on the same cell keep their decision order
        entries.sort_by_key(|entry| (entry.row, entry.column_index));

        UploadReport {
            source: None,
            layout: self.layout,
            dry_run: self.dry_run,
            counts,
            entries,
        }
    }
}

/// Count a decision and turn it into an entry when it is worth listing
fn record(decision: &Decision, counts: &mut ReportCounts) -> Option<ReportEntry> {
    match decision {
        Decision::StudentCreated { .. } => {
            counts.new_students += 1;
            None
        }
        Decision::StudentUpdated { row, email, change } => {
            counts.updated_students += 1;
            Some(
                ReportEntry::new(EntryKind::StudentUpdated, change)
                    .at_row(*row)
                    .for_student(email),
            )
        }
        Decision::AssignmentCreated { .. } => {
            counts.new_assignments += 1;
            None
        }
        Decision::TagCreated { .. } => {
            counts.new_tags += 1;
            None
        }
        Decision::GradeCreated { .. } => {
            counts.new_grades += 1;
            None
        }
        Decision::GradeUnchanged { .. } => {
            counts.unchanged_grades += 1;
            None
        }
        Decision::GradeUpdated {
            row,
            index,
            column,
            email,
            previous,
            score,
        } => {
            counts.updated_grades += 1;
            Some(
                ReportEntry::new(
                    EntryKind::GradeUpdated,
                    format!("score changed {}→{}", previous, score),
                )
                .at_row(*row)
                .in_column(*index, column)
                .for_student(email),
            )
        }
        Decision::Conflict {
            row,
            index,
            column,
            email,
            stored_max_points,
            incoming_max_points,
        } => {
            counts.conflicts += 1;
            Some(
                ReportEntry::new(EntryKind::Conflict, reasons::ASSIGNMENT_CONFLICT)
                    .at_row(*row)
                    .in_column(*index, column)
                    .for_student(email)
                    .with_detail(format!(
                        "stored max points {}, upload has {}",
                        stored_max_points, incoming_max_points
                    )),
            )
        }
        Decision::ScoreAboveMax {
            row,
            index,
            column,
            email,
            score,
            max_points,
        } => {
            counts.warnings += 1;
            Some(
                ReportEntry::new(
                    EntryKind::Warning,
                    format!("score {} exceeds max points {}", score, max_points),
                )
                .at_row(*row)
                .in_column(*index, column)
                .for_student(email),
            )
        }
    }
}
