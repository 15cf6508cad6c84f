//! Data row cleaning

use std::collections::HashSet;

use regex::Regex;
use tracing::debug;

use super::row::{CellSkip, ColumnSkip, NormalizedRow, NormalizedUpload, RowSkip, ScoreCell};
use crate::Result;
use crate::app::models::{CellValue, normalize_email};
use crate::app::services::layout_classifier::{AssignmentColumn, ClassifiedLayout};
use crate::app::services::tabular_reader::SourceRow;
use crate::config::{DateFormats, IngestConfig};
use crate::constants::reasons;

/// Cleans data rows against a classified layout
#[derive(Debug, Clone)]
pub struct RowNormalizer {
    email_pattern: Regex,
    date_formats: DateFormats,
    min_column_coverage: f64,
}

/// Non-blank data row with its 1-based file row number
struct DataRow {
    row: usize,
    cells: Vec<String>,
}

impl DataRow {
    fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }
}

impl RowNormalizer {
    pub fn new(config: &IngestConfig) -> Result<Self> {
        Ok(Self {
            email_pattern: config.email_regex()?,
            date_formats: config.date_formats.clone(),
            min_column_coverage: config.min_column_coverage,
        })
    }

    /// Normalize the data rows of an upload
    ///
    /// `data_rows` yields the rows from `layout.data_start` onwards, each with
    /// its file line, which becomes the reported row number. The rows are
    /// buffered because blank-column elimination and the coverage
    /// threshold need every row before any can be emitted.
    pub fn normalize<I>(
        &self,
        layout: &ClassifiedLayout,
        data_rows: I,
    ) -> Result<NormalizedUpload>
    where
        I: IntoIterator<Item = Result<SourceRow>>,
    {
        let mut rows = Vec::new();
        for source in data_rows {
            let SourceRow { line, cells } = source?;
            if cells.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            rows.push(DataRow { row: line, cells });
        }

        let mut upload = NormalizedUpload {
            total_rows: rows.len(),
            warnings: layout.warnings.clone(),
            ..NormalizedUpload::default()
        };

        for rejected in &layout.rejected {
            if has_data(&rows, rejected.index) {
                upload.column_skips.push(ColumnSkip {
                    index: rejected.index,
                    column: rejected.header.clone(),
                    reason: rejected.reason.clone(),
                });
            } else {
                debug!("Dropping blank rejected column '{}'", rejected.header);
            }
        }

        for column in &layout.assignments {
            if !has_data(&rows, column.index) {
                debug!("Dropping blank column '{}'", column.header);
                continue;
            }
            if !self.meets_coverage(&rows, column) {
                upload.column_skips.push(ColumnSkip {
                    index: column.index,
                    column: column.header.clone(),
                    reason: reasons::INSUFFICIENT_DATA.to_string(),
                });
                continue;
            }
            upload.assignments.push(column.clone());
        }

        let mut scored = HashSet::new();
        for data_row in &rows {
            let normalized = self.normalize_row(
                layout,
                &upload.assignments,
                data_row,
                &mut scored,
                &mut upload.cell_skips,
            );
            match normalized {
                Some(row) => upload.rows.push(row),
                None => upload.row_skips.push(RowSkip {
                    row: data_row.row,
                    reason: reasons::INVALID_EMAIL.to_string(),
                }),
            }
        }

        debug!(
            "Normalized {} of {} rows: {} score cells, {} row skips, {} cell skips, {} column skips",
            upload.rows.len(),
            upload.total_rows,
            upload.score_count(),
            upload.row_skips.len(),
            upload.cell_skips.len(),
            upload.column_skips.len()
        );

        Ok(upload)
    }

    /// Clean one row; `None` when the row has no usable email
    ///
    /// `scored` holds the (email, assignment) pairs already scored by earlier
    /// rows; a repeat is a cell skip, so the first score in the file wins.
    fn normalize_row(
        &self,
        layout: &ClassifiedLayout,
        assignments: &[AssignmentColumn],
        data_row: &DataRow,
        scored: &mut HashSet<(String, usize)>,
        cell_skips: &mut Vec<CellSkip>,
    ) -> Option<NormalizedRow> {
        let email = normalize_email(data_row.cell(layout.identity.email));
        if !self.email_pattern.is_match(&email) {
            return None;
        }

        let student_number = layout
            .identity
            .student_number
            .map(|index| data_row.cell(index).trim().to_string())
            .filter(|value| !value.is_empty());

        let mut scores = Vec::new();
        for (position, column) in assignments.iter().enumerate() {
            let raw = data_row.cell(column.index);
            match CellValue::parse(raw, &self.date_formats) {
                CellValue::Empty => {}
                CellValue::Number(score) if score >= 0.0 => {
                    if scored.insert((email.clone(), position)) {
                        scores.push(ScoreCell {
                            assignment: position,
                            score,
                        });
                    } else {
                        debug!(
                            "Row {}: second score for {} in '{}'",
                            data_row.row, email, column.header
                        );
                        cell_skips.push(CellSkip {
                            row: data_row.row,
                            index: column.index,
                            column: column.header.clone(),
                            value: raw.trim().to_string(),
                            reason: reasons::DUPLICATE_SCORE.to_string(),
                        });
                    }
                }
                _ => cell_skips.push(CellSkip {
                    row: data_row.row,
                    index: column.index,
                    column: column.header.clone(),
                    value: raw.trim().to_string(),
                    reason: reasons::INVALID_SCORE.to_string(),
                }),
            }
        }

        Some(NormalizedRow {
            row: data_row.row,
            email,
            first_name: data_row.cell(layout.identity.first_name).trim().to_string(),
            last_name: data_row.cell(layout.identity.last_name).trim().to_string(),
            student_number,
            scores,
        })
    }

    /// Whether enough rows hold a numeric score in `column`
    fn meets_coverage(&self, rows: &[DataRow], column: &AssignmentColumn) -> bool {
        if self.min_column_coverage <= 0.0 || rows.is_empty() {
            return true;
        }

        let numeric = rows
            .iter()
            .filter(|row| {
                CellValue::parse(row.cell(column.index), &self.date_formats)
                    .as_number()
                    .is_some()
            })
            .count();
        let coverage = numeric as f64 / rows.len() as f64;

        if coverage < self.min_column_coverage {
            debug!(
                "Column '{}' has {:.1}% numeric scores, below the {:.1}% threshold",
                column.header,
                coverage * 100.0,
                self.min_column_coverage * 100.0
            );
            return false;
        }
        true
    }
}

fn has_data(rows: &[DataRow], index: usize) -> bool {
    rows.iter().any(|row| !row.cell(index).trim().is_empty())
}
