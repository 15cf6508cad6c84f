//! Data models for gradebook ingestion
//!
//! This module contains the persistent entities (students, assignments, grades
//! and tags) and the tagged cell value produced for every parsed spreadsheet cell.

use crate::config::DateFormats;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// Student
// =============================================================================

/// Student record, identified by normalized email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Lower-cased, trimmed email; immutable once created
    pub email: String,

    pub first_name: String,

    pub last_name: String,

    /// Optional school-issued identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_number: Option<String>,
}

impl Student {
    /// Create a student, normalizing the email key
    pub fn new(
        email: &str,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: normalize_email(email),
            first_name: first_name.into(),
            last_name: last_name.into(),
            student_number: None,
        }
    }

    /// Full display name ("First Last")
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Normalize an email into its identity form
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// =============================================================================
// Assignment
// =============================================================================

/// Identity of an assignment: name plus optional due date
///
/// Two assignments with the same name but different or absent due dates are
/// distinct entities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssignmentKey {
    pub name: String,
    pub due_date: Option<NaiveDate>,
}

impl AssignmentKey {
    pub fn new(name: &str, due_date: Option<NaiveDate>) -> Self {
        Self {
            name: name.trim().to_string(),
            due_date,
        }
    }
}

impl fmt::Display for AssignmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.due_date {
            Some(date) => write!(f, "'{}' ({})", self.name, date),
            None => write!(f, "'{}' (undated)", self.name),
        }
    }
}

/// Assignment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Fixed at creation; later uploads with a different value are conflicts
    pub max_points: u32,

    /// Tag names attached to this assignment
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

impl Assignment {
    pub fn new(key: &AssignmentKey, max_points: u32) -> Self {
        Self {
            name: key.name.clone(),
            due_date: key.due_date,
            max_points,
            tags: BTreeSet::new(),
        }
    }

    /// Identity key of this assignment
    pub fn key(&self) -> AssignmentKey {
        AssignmentKey {
            name: self.name.clone(),
            due_date: self.due_date,
        }
    }
}

// =============================================================================
// Grade
// =============================================================================

/// Grade record, owned by a (student, assignment) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub student_email: String,
    pub assignment: AssignmentKey,
    pub score: f64,
    pub last_updated: DateTime<Utc>,
}

impl Grade {
    /// Whether `score` matches the stored score
    pub fn has_score(&self, score: f64) -> bool {
        (self.score - score).abs() <= crate::constants::SCORE_EPSILON
    }
}

// =============================================================================
// Tag
// =============================================================================

/// Tag record; names match case-insensitively
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

impl Tag {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
        }
    }

    /// Lookup key for case-insensitive matching
    pub fn lookup_key(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

// =============================================================================
// Cell Values
// =============================================================================

/// Parsed spreadsheet cell
///
/// Every cell read from an upload is classified once, so downstream stages
/// switch on the variant instead of re-inspecting raw strings.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty or whitespace-only
    Empty,
    /// Finite number
    Number(f64),
    /// Calendar date in one of the configured formats
    Date(NaiveDate),
    /// Anything else, trimmed
    Text(String),
}

impl CellValue {
    /// Classify a raw cell
    pub fn parse(raw: &str, date_formats: &DateFormats) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if let Ok(value) = trimmed.parse::<f64>() {
            if value.is_finite() {
                return CellValue::Number(value);
            }
        }

        match date_formats.parse(trimmed) {
            Some(date) => CellValue::Date(date),
            None => CellValue::Text(trimmed.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric value, if this cell is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(value) => write!(f, "{}", value),
            CellValue::Date(date) => write!(f, "{}", date),
            CellValue::Text(text) => write!(f, "{}", text),
        }
    }
}
