//! In-memory grade store
//!
//! Backs the JSON file store and doubles as the store used in tests.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::models::{Assignment, AssignmentKey, Grade, Student, Tag};
use crate::app::store::{ChangeSet, GradeStore};
use crate::{Error, Result};

/// Grade store held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    students: BTreeMap<String, Student>,
    assignments: BTreeMap<AssignmentKey, Assignment>,
    grades: BTreeMap<(String, AssignmentKey), Grade>,
    /// Keyed by [`Tag::lookup_key`]
    tags: BTreeMap<String, Tag>,
}

/// Serializable form of a store's contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub grades: Vec<Grade>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a snapshot, checking referential integrity
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self> {
        let mut store = Self::new();
        store.apply(ChangeSet {
            students: snapshot.students,
            assignments: snapshot.assignments,
            tags: snapshot.tags,
            grades: snapshot.grades,
        })?;
        Ok(store)
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            students: self.students.values().cloned().collect(),
            assignments: self.assignments.values().cloned().collect(),
            grades: self.grades.values().cloned().collect(),
            tags: self.tags.values().cloned().collect(),
        }
    }

    /// Reject change sets that would break the store's invariants
    ///
    /// Runs before anything is written so a rejected change set leaves the
    /// store untouched.
    fn validate(&self, changes: &ChangeSet) -> Result<()> {
        let mut incoming_assignments = BTreeSet::new();
        for assignment in &changes.assignments {
            let key = assignment.key();
            if assignment.max_points == 0 {
                return Err(Error::storage(format!(
                    "assignment {} has no max points",
                    key
                )));
            }
            if let Some(existing) = self.assignments.get(&key) {
                if existing.max_points != assignment.max_points {
                    return Err(Error::storage(format!(
                        "assignment {} already exists with max points {}",
                        key, existing.max_points
                    )));
                }
            }
            incoming_assignments.insert(key);
        }

        let incoming_tags: BTreeSet<String> = changes
            .tags
            .iter()
            .map(|tag| Tag::lookup_key(&tag.name))
            .collect();
        for assignment in &changes.assignments {
            for tag in &assignment.tags {
                let lookup = Tag::lookup_key(tag);
                if !self.tags.contains_key(&lookup) && !incoming_tags.contains(&lookup) {
                    return Err(Error::storage(format!(
                        "assignment {} references unknown tag '{}'",
                        assignment.key(),
                        tag
                    )));
                }
            }
        }

        let incoming_students: BTreeSet<&str> = changes
            .students
            .iter()
            .map(|student| student.email.as_str())
            .collect();
        for grade in &changes.grades {
            let student_known = self.students.contains_key(&grade.student_email)
                || incoming_students.contains(grade.student_email.as_str());
            if !student_known {
                return Err(Error::storage(format!(
                    "grade references unknown student '{}'",
                    grade.student_email
                )));
            }

            let assignment_known = self.assignments.contains_key(&grade.assignment)
                || incoming_assignments.contains(&grade.assignment);
            if !assignment_known {
                return Err(Error::storage(format!(
                    "grade references unknown assignment {}",
                    grade.assignment
                )));
            }
        }

        Ok(())
    }
}

impl GradeStore for InMemoryStore {
    fn find_student_by_email(&self, email: &str) -> Result<Option<Student>> {
        Ok(self.students.get(email).cloned())
    }

    fn find_assignment_by_identity(&self, key: &AssignmentKey) -> Result<Option<Assignment>> {
        Ok(self.assignments.get(key).cloned())
    }

    fn find_grade(&self, student_email: &str, assignment: &AssignmentKey) -> Result<Option<Grade>> {
        Ok(self
            .grades
            .get(&(student_email.to_string(), assignment.clone()))
            .cloned())
    }

    fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
        Ok(self.tags.get(&Tag::lookup_key(name)).cloned())
    }

    fn apply(&mut self, changes: ChangeSet) -> Result<()> {
        self.validate(&changes)?;
        debug!("Applying change set: {}", changes.summary());

        for tag in changes.tags {
            self.tags.entry(Tag::lookup_key(&tag.name)).or_insert(tag);
        }
        for student in changes.students {
            self.students.insert(student.email.clone(), student);
        }
        for assignment in changes.assignments {
            self.assignments.entry(assignment.key()).or_insert(assignment);
        }
        for grade in changes.grades {
            let key = (grade.student_email.clone(), grade.assignment.clone());
            self.grades.insert(key, grade);
        }

        Ok(())
    }

    fn students(&self) -> Result<Vec<Student>> {
        Ok(self.students.values().cloned().collect())
    }

    fn assignments(&self) -> Result<Vec<Assignment>> {
        Ok(self.assignments.values().cloned().collect())
    }

    fn grades(&self) -> Result<Vec<Grade>> {
        Ok(self.grades.values().cloned().collect())
    }

    fn tags(&self) -> Result<Vec<Tag>> {
        Ok(self.tags.values().cloned().collect())
    }
}
