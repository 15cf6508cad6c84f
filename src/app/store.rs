//! Storage collaborator interface
//!
//! The pipeline reads existing entities through [`GradeStore`] lookups and
//! writes everything an upload decided in one [`GradeStore::apply`] call.

use crate::Result;
use crate::app::models::{Assignment, AssignmentKey, Grade, Student, Tag};
use serde::{Deserialize, Serialize};

/// Persistent store of students, assignments, grades and tags
///
/// Lookups take identity keys in normalized form: lower-cased emails and
/// trimmed assignment names. Tag lookups are case-insensitive.
pub trait GradeStore {
    fn find_student_by_email(&self, email: &str) -> Result<Option<Student>>;

    fn find_assignment_by_identity(&self, key: &AssignmentKey) -> Result<Option<Assignment>>;

    fn find_grade(&self, student_email: &str, assignment: &AssignmentKey) -> Result<Option<Grade>>;

    fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>>;

    /// Write a change set as one unit; either every change lands or none does
    fn apply(&mut self, changes: ChangeSet) -> Result<()>;

    /// All students, ordered by email
    fn students(&self) -> Result<Vec<Student>>;

    /// All assignments, ordered by identity
    fn assignments(&self) -> Result<Vec<Assignment>>;

    /// All grades, ordered by student then assignment
    fn grades(&self) -> Result<Vec<Grade>>;

    /// All tags, ordered by lookup key
    fn tags(&self) -> Result<Vec<Tag>>;
}

/// Entities created or updated by one upload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Students to insert or overwrite by email
    pub students: Vec<Student>,

    /// Assignments to create
    pub assignments: Vec<Assignment>,

    /// Tags to create
    pub tags: Vec<Tag>,

    /// Grades to insert or overwrite by (student, assignment)
    pub grades: Vec<Grade>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
            && self.assignments.is_empty()
            && self.tags.is_empty()
            && self.grades.is_empty()
    }

    /// One-line summary for logging
    pub fn summary(&self) -> String {
        format!(
            "{} students, {} assignments, {} tags, {} grades",
            self.students.len(),
            self.assignments.len(),
            self.tags.len(),
            self.grades.len()
        )
    }
}
