//! JSON file backed grade store
//!
//! Loads the whole store into memory on open and rewrites the file after
//! every applied change set. Writes go to a temporary file in the same
//! directory which is then renamed over the store, so an interrupted write
//! never leaves a truncated store behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::memory_store::{InMemoryStore, StoreSnapshot};
use crate::app::models::{Assignment, AssignmentKey, Grade, Student, Tag};
use crate::app::store::{ChangeSet, GradeStore};
use crate::{Error, Result};

/// Grade store persisted as a single JSON document
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: InMemoryStore,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let inner = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                Error::io(format!("Failed to read store {}", path.display()), e)
            })?;
            let snapshot: StoreSnapshot = serde_json::from_str(&content).map_err(|e| {
                Error::serialization(format!("Failed to parse store {}", path.display()), e)
            })?;
            InMemoryStore::from_snapshot(snapshot)?
        } else {
            debug!("Store {} does not exist yet, starting empty", path.display());
            InMemoryStore::new()
        };

        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, store: &InMemoryStore) -> Result<()> {
        let json = serde_json::to_string_pretty(&store.snapshot()).map_err(|e| {
            Error::serialization(format!("Failed to encode store {}", self.path.display()), e)
        })?;

        write_atomic(&self.path, json.as_bytes()).map_err(|e| {
            Error::storage(format!("Failed to write store {}: {}", self.path.display(), e))
        })
    }
}

impl GradeStore for JsonFileStore {
    fn find_student_by_email(&self, email: &str) -> Result<Option<Student>> {
        self.inner.find_student_by_email(email)
    }

    fn find_assignment_by_identity(&self, key: &AssignmentKey) -> Result<Option<Assignment>> {
        self.inner.find_assignment_by_identity(key)
    }

    fn find_grade(&self, student_email: &str, assignment: &AssignmentKey) -> Result<Option<Grade>> {
        self.inner.find_grade(student_email, assignment)
    }

    fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
        self.inner.find_tag_by_name(name)
    }

    /// Apply to a copy, persist it, then swap it in
    fn apply(&mut self, changes: ChangeSet) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut updated = self.inner.clone();
        updated.apply(changes)?;
        self.save(&updated)?;
        self.inner = updated;

        info!("Saved store to {}", self.path.display());
        Ok(())
    }

    fn students(&self) -> Result<Vec<Student>> {
        self.inner.students()
    }

    fn assignments(&self) -> Result<Vec<Assignment>> {
        self.inner.assignments()
    }

    fn grades(&self) -> Result<Vec<Grade>> {
        self.inner.grades()
    }

    fn tags(&self) -> Result<Vec<Tag>> {
        self.inner.tags()
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
