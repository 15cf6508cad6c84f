//! Compiled layout profiles and header normalization

use crate::Result;
use crate::config::{DueDateRow, LayoutProfile, compile_pattern};
use regex::Regex;

/// Layout profile with its header matchers compiled
#[derive(Debug, Clone)]
pub struct CompiledProfile {
    pub name: String,
    pub first_name: Regex,
    pub last_name: Regex,
    pub email: Regex,
    pub student_number: Option<Regex>,
    pub due_date_row: DueDateRow,
}

impl CompiledProfile {
    pub fn compile(profile: &LayoutProfile) -> Result<Self> {
        let student_number = match &profile.student_number {
            Some(pattern) => Some(compile_pattern(&profile.name, "student_number", pattern)?),
            None => None,
        };

        Ok(Self {
            name: profile.name.clone(),
            first_name: compile_pattern(&profile.name, "first_name", &profile.first_name)?,
            last_name: compile_pattern(&profile.name, "last_name", &profile.last_name)?,
            email: compile_pattern(&profile.name, "email", &profile.email)?,
            student_number,
            due_date_row: profile.due_date_row,
        })
    }
}

/// Normalize header text for matching
///
/// Trims, lower-cases, treats underscores as spaces and collapses runs of
/// whitespace, so `" First_Name "` and `"first  name"` both become `"first name"`.
pub fn normalize_header(header: &str) -> String {
    header
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Indices of headers the matcher accepts
pub(crate) fn matching_columns(headers: &[String], matcher: &Regex) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .filter(|(_, header)| !header.is_empty() && matcher.is_match(header))
        .map(|(index, _)| index)
        .collect()
}
