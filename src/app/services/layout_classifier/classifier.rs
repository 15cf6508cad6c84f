//! Layout selection and header-row interpretation

use std::collections::HashSet;

use regex::Regex;
use tracing::{debug, info};

use super::layout::{
    AssignmentColumn, ClassifiedLayout, IdentityColumns, LayoutWarning, RejectedColumn,
};
use super::profile::{CompiledProfile, matching_columns, normalize_header};
use crate::app::models::{AssignmentKey, CellValue};
use crate::config::{DateFormats, DueDateRow, IngestConfig};
use crate::constants::{LAYOUT_HEADER_ROWS, reasons};
use crate::{Error, Result};

/// Classifier for upload header rows
///
/// Holds the compiled layout profiles in preference order together with the
/// date formats and email pattern needed to read the sub-rows.
#[derive(Debug, Clone)]
pub struct LayoutClassifier {
    profiles: Vec<CompiledProfile>,
    date_formats: DateFormats,
    email_pattern: Regex,
}

/// Where the sub-rows sit for one upload
struct SubRows {
    due_date_row: Option<usize>,
    max_points_row: Option<usize>,
    data_start: usize,
}

impl LayoutClassifier {
    /// Compile every configured profile
    pub fn new(config: &IngestConfig) -> Result<Self> {
        let profiles = config
            .layouts
            .iter()
            .map(CompiledProfile::compile)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            profiles,
            date_formats: config.date_formats.clone(),
            email_pattern: config.email_regex()?,
        })
    }

    /// Classify an upload from its leading rows
    ///
    /// Only the first three rows are inspected: the header row and up to two
    /// sub-rows. Fails with an unrecognized-layout error when no profile
    /// resolves every identity column to exactly one column.
    pub fn classify(&self, rows: &[Vec<String>]) -> Result<ClassifiedLayout> {
        let header_row = rows
            .first()
            .ok_or_else(|| Error::malformed_file("file contains no rows"))?;
        let headers: Vec<String> = header_row.iter().map(|h| normalize_header(h)).collect();

        let mut attempts = Vec::new();
        for profile in &self.profiles {
            match resolve_identity(profile, &headers) {
                Ok(identity) => {
                    let leading = &rows[..rows.len().min(LAYOUT_HEADER_ROWS)];
                    let layout = self.build_layout(profile, identity, leading);
                    info!(
                        "Classified upload as '{}' layout: {} scorable assignments, {} rejected",
                        layout.layout_name,
                        layout.assignments.len(),
                        layout.rejected.len()
                    );
                    return Ok(layout);
                }
                Err(reason) => {
                    debug!("Layout '{}' rejected: {}", profile.name, reason);
                    attempts.push(format!("{}: {}", profile.name, reason));
                }
            }
        }

        Err(Error::unrecognized_layout(attempts))
    }

    fn build_layout(
        &self,
        profile: &CompiledProfile,
        identity: IdentityColumns,
        rows: &[Vec<String>],
    ) -> ClassifiedLayout {
        let header_row = &rows[0];
        let assignment_indices: Vec<usize> = header_row
            .iter()
            .enumerate()
            .filter(|(index, header)| !identity.contains(*index) && !header.trim().is_empty())
            .map(|(index, _)| index)
            .collect();

        let sub_rows = self.locate_sub_rows(profile, &identity, &assignment_indices, rows);

        let mut assignments = Vec::new();
        let mut rejected = Vec::new();
        let mut warnings = Vec::new();
        let mut seen_keys = HashSet::new();

        for index in assignment_indices {
            let header = header_row[index].trim().to_string();

            let due_date = sub_rows
                .due_date_row
                .and_then(|row| self.read_due_date(rows, row, index, &header, &mut warnings));

            let max_points = match sub_rows.max_points_row {
                Some(row) => read_max_points(cell(rows, row, index), &self.date_formats),
                None => Err(reasons::MISSING_MAX_POINTS),
            };

            let max_points = match max_points {
                Ok(points) => points,
                Err(reason) => {
                    debug!("Assignment column '{}' rejected: {}", header, reason);
                    rejected.push(RejectedColumn {
                        index,
                        header,
                        reason: reason.to_string(),
                    });
                    continue;
                }
            };

            let key = AssignmentKey::new(&header, due_date);
            if !seen_keys.insert(key.clone()) {
                rejected.push(RejectedColumn {
                    index,
                    header,
                    reason: reasons::DUPLICATE_COLUMN.to_string(),
                });
                continue;
            }

            assignments.push(AssignmentColumn {
                index,
                header,
                key,
                max_points,
            });
        }

        ClassifiedLayout {
            layout_name: profile.name.clone(),
            identity,
            assignments,
            rejected,
            warnings,
            due_date_row: sub_rows.due_date_row,
            max_points_row: sub_rows.max_points_row,
            data_start: sub_rows.data_start,
        }
    }

    /// Decide which of rows 2 and 3 are due-date and max-points rows
    ///
    /// A row whose email cell holds a valid email is student data, so the
    /// sub-rows end before it.
    fn locate_sub_rows(
        &self,
        profile: &CompiledProfile,
        identity: &IdentityColumns,
        assignment_indices: &[usize],
        rows: &[Vec<String>],
    ) -> SubRows {
        let sub_row_count = rows
            .iter()
            .skip(1)
            .take_while(|row| {
                let email = row.get(identity.email).map(|s| s.trim()).unwrap_or("");
                !self.email_pattern.is_match(email)
            })
            .count();

        let (due_date_row, max_points_row) = match (profile.due_date_row, sub_row_count) {
            (_, 0) => (None, None),
            (DueDateRow::Required, 1) => (Some(1), None),
            (DueDateRow::Required, _) => (Some(1), Some(2)),
            (DueDateRow::Optional, count) => {
                if self.looks_like_max_points(&rows[1], assignment_indices) {
                    (None, Some(1))
                } else if count >= 2 {
                    (Some(1), Some(2))
                } else {
                    (Some(1), None)
                }
            }
        };

        let data_start = 1 + max_points_row.or(due_date_row).unwrap_or(0);

        debug!(
            "Sub-rows for '{}': due_date_row={:?}, max_points_row={:?}, data_start={}",
            profile.name, due_date_row, max_points_row, data_start
        );

        SubRows {
            due_date_row,
            max_points_row,
            data_start,
        }
    }

    /// A row of positive numbers with no dates is a max-points row
    fn looks_like_max_points(&self, row: &[String], assignment_indices: &[usize]) -> bool {
        let values: Vec<CellValue> = assignment_indices
            .iter()
            .map(|&index| {
                let raw = row.get(index).map(String::as_str).unwrap_or("");
                CellValue::parse(raw, &self.date_formats)
            })
            .collect();

        let has_points = values
            .iter()
            .any(|value| matches!(value, CellValue::Number(n) if *n > 0.0));
        let has_dates = values
            .iter()
            .any(|value| matches!(value, CellValue::Date(_)));

        has_points && !has_dates
    }

    fn read_due_date(
        &self,
        rows: &[Vec<String>],
        row: usize,
        index: usize,
        header: &str,
        warnings: &mut Vec<LayoutWarning>,
    ) -> Option<chrono::NaiveDate> {
        match CellValue::parse(cell(rows, row, index), &self.date_formats) {
            CellValue::Date(date) => Some(date),
            CellValue::Empty => None,
            other => {
                warnings.push(LayoutWarning {
                    row: row + 1,
                    index,
                    column: header.to_string(),
                    message: format!(
                        "due date '{}' is not a date; assignment treated as undated",
                        other
                    ),
                });
                None
            }
        }
    }
}

/// Resolve every identity role of `profile` to exactly one column
fn resolve_identity(
    profile: &CompiledProfile,
    headers: &[String],
) -> std::result::Result<IdentityColumns, String> {
    let first_name = single_column(headers, &profile.first_name, "first name")?;
    let last_name = single_column(headers, &profile.last_name, "last name")?;
    let email = single_column(headers, &profile.email, "email")?;

    if first_name == last_name || first_name == email || last_name == email {
        return Err("one column matches more than one identity field".to_string());
    }

    let student_number = match &profile.student_number {
        Some(matcher) => {
            let matches: Vec<usize> = matching_columns(headers, matcher)
                .into_iter()
                .filter(|index| ![first_name, last_name, email].contains(index))
                .collect();
            match matches.as_slice() {
                [] => None,
                [index] => Some(*index),
                _ => return Err(ambiguous("student number", &matches)),
            }
        }
        None => None,
    };

    Ok(IdentityColumns {
        first_name,
        last_name,
        email,
        student_number,
    })
}

fn single_column(
    headers: &[String],
    matcher: &Regex,
    role: &str,
) -> std::result::Result<usize, String> {
    let matches = matching_columns(headers, matcher);
    match matches.as_slice() {
        [] => Err(format!("no column matches {}", role)),
        [index] => Ok(*index),
        _ => Err(ambiguous(role, &matches)),
    }
}

fn ambiguous(role: &str, indices: &[usize]) -> String {
    let columns: Vec<String> = indices.iter().map(|i| (i + 1).to_string()).collect();
    format!("{} is ambiguous (columns {})", role, columns.join(", "))
}

/// Validate a max-points cell: a positive whole number
fn read_max_points(
    raw: &str,
    date_formats: &DateFormats,
) -> std::result::Result<u32, &'static str> {
    match CellValue::parse(raw, date_formats) {
        CellValue::Empty => Err(reasons::MISSING_MAX_POINTS),
        CellValue::Number(value)
            if value > 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) =>
        {
            Ok(value as u32)
        }
        _ => Err(reasons::INVALID_MAX_POINTS),
    }
}

fn cell(rows: &[Vec<String>], row: usize, index: usize) -> &str {
    rows.get(row)
        .and_then(|cells| cells.get(index))
        .map(String::as_str)
        .unwrap_or("")
}
