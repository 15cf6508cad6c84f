//! Staged overlay over a grade store

use std::collections::BTreeMap;

use crate::Result;
use crate::app::models::{Assignment, AssignmentKey, Grade, Student, Tag};
use crate::app::store::{ChangeSet, GradeStore};

/// Read-through view of a store plus the changes staged by one upload
///
/// Lookups consult the staged entities first and fall back to the store, so
/// every decision sees one consistent state. The store is never written.
pub struct StagedStore<'s, S: GradeStore + ?Sized> {
    store: &'s S,
    students: BTreeMap<String, Student>,
    assignments: BTreeMap<AssignmentKey, Assignment>,
    grades: BTreeMap<(String, AssignmentKey), Grade>,
    /// Keyed by [`Tag::lookup_key`], in creation order
    tags: Vec<(String, Tag)>,
}

impl<'s, S: GradeStore + ?Sized> StagedStore<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            students: BTreeMap::new(),
            assignments: BTreeMap::new(),
            grades: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    pub fn student(&self, email: &str) -> Result<Option<Student>> {
        match self.students.get(email) {
            Some(student) => Ok(Some(student.clone())),
            None => self.store.find_student_by_email(email),
        }
    }

    pub fn assignment(&self, key: &AssignmentKey) -> Result<Option<Assignment>> {
        match self.assignments.get(key) {
            Some(assignment) => Ok(Some(assignment.clone())),
            None => self.store.find_assignment_by_identity(key),
        }
    }

    pub fn grade(&self, email: &str, key: &AssignmentKey) -> Result<Option<Grade>> {
        match self.grades.get(&(email.to_string(), key.clone())) {
            Some(grade) => Ok(Some(grade.clone())),
            None => self.store.find_grade(email, key),
        }
    }

    pub fn tag(&self, name: &str) -> Result<Option<Tag>> {
        let lookup = Tag::lookup_key(name);
        match self.tags.iter().find(|(key, _)| *key == lookup) {
            Some((_, tag)) => Ok(Some(tag.clone())),
            None => self.store.find_tag_by_name(name),
        }
    }

    pub fn stage_student(&mut self, student: Student) {
        self.students.insert(student.email.clone(), student);
    }

    pub fn stage_assignment(&mut self, assignment: Assignment) {
        self.assignments.insert(assignment.key(), assignment);
    }

    pub fn stage_grade(&mut self, grade: Grade) {
        let key = (grade.student_email.clone(), grade.assignment.clone());
        self.grades.insert(key, grade);
    }

    pub fn stage_tag(&mut self, tag: Tag) {
        let lookup = Tag::lookup_key(&tag.name);
        if !self.tags.iter().any(|(key, _)| *key == lookup) {
            self.tags.push((lookup, tag));
        }
    }

    /// Consume the overlay, keeping only the staged changes
    pub fn into_change_set(self) -> ChangeSet {
        ChangeSet {
            students: self.students.into_values().collect(),
            assignments: self.assignments.into_values().collect(),
            tags: self.tags.into_iter().map(|(_, tag)| tag).collect(),
            grades: self.grades.into_values().collect(),
        }
    }
}
