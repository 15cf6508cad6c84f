//! End-to-end upload reconciliation tests
//!
//! These tests drive whole files through the public pipeline against the
//! in-memory and JSON file stores and check both the stored state and the
//! upload report.

use chrono::{NaiveDate, TimeZone, Utc};
use gradebook_ingest::app::adapters::json_store::JsonFileStore;
use gradebook_ingest::app::adapters::memory_store::InMemoryStore;
use gradebook_ingest::app::services::upload_report::EntryKind;
use gradebook_ingest::constants::reasons;
use gradebook_ingest::{
    AssignmentKey, Error, GradeStore, IngestConfig, UploadOptions, UploadPipeline, UploadReport,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const JANE_FIRST_UPLOAD: &str = "\
First Name,Last Name,Email,Quiz 1
,,,2024-01-10
,,,25
Jane,Doe,jane@x.com,20
";

const JANE_SECOND_UPLOAD: &str = "\
First Name,Last Name,Email,Quiz 1
,,,2024-01-10
,,,25
Jane,Doe,jane@x.com,22
";

fn options() -> UploadOptions {
    UploadOptions::new(Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap())
}

fn pipeline() -> UploadPipeline {
    UploadPipeline::new(IngestConfig::default()).unwrap()
}

fn ingest<S: GradeStore>(store: &mut S, file: &str) -> UploadReport {
    pipeline().ingest(file.as_bytes(), &options(), store).unwrap()
}

fn quiz_1() -> AssignmentKey {
    AssignmentKey::new("Quiz 1", NaiveDate::from_ymd_opt(2024, 1, 10))
}

fn stored_score<S: GradeStore>(store: &S, email: &str, key: &AssignmentKey) -> Option<f64> {
    store.find_grade(email, key).unwrap().map(|grade| grade.score)
}

/// First upload creates the student, assignment and grade
#[test]
fn test_first_upload_creates_entities() {
    let mut store = InMemoryStore::new();

    let report = ingest(&mut store, JANE_FIRST_UPLOAD);

    assert_eq!(report.layout, "template");
    assert_eq!(report.counts.new_students, 1);
    assert_eq!(report.counts.new_assignments, 1);
    assert_eq!(report.counts.new_grades, 1);
    assert_eq!(report.counts.processed_rows, 1);
    assert!(!report.has_problems());

    let student = store.find_student_by_email("jane@x.com").unwrap().unwrap();
    assert_eq!(student.display_name(), "Jane Doe");
    let assignment = store.find_assignment_by_identity(&quiz_1()).unwrap().unwrap();
    assert_eq!(assignment.max_points, 25);
    assert_eq!(stored_score(&store, "jane@x.com", &quiz_1()), Some(20.0));
}

/// A changed score is updated and reported with old and new values
#[test]
fn test_changed_score_is_reported() {
    let mut store = InMemoryStore::new();
    ingest(&mut store, JANE_FIRST_UPLOAD);

    let report = ingest(&mut store, JANE_SECOND_UPLOAD);

    assert_eq!(report.counts.updated_grades, 1);
    assert_eq!(report.counts.new_students, 0);
    assert_eq!(report.counts.new_assignments, 0);

    let updates: Vec<_> = report.entries_of(EntryKind::GradeUpdated).collect();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].reason, "score changed 20→22");
    assert_eq!(updates[0].row, Some(4));
    assert_eq!(updates[0].student.as_deref(), Some("jane@x.com"));
    assert_eq!(stored_score(&store, "jane@x.com", &quiz_1()), Some(22.0));
}

/// Uploading the same file twice changes nothing the second time
#[test]
fn test_reupload_is_idempotent() {
    let mut store = InMemoryStore::new();
    ingest(&mut store, JANE_FIRST_UPLOAD);
    let before = store.snapshot();

    let report = ingest(&mut store, JANE_FIRST_UPLOAD);

    assert_eq!(report.counts.new_students, 0);
    assert_eq!(report.counts.updated_students, 0);
    assert_eq!(report.counts.new_assignments, 0);
    assert_eq!(report.counts.new_grades, 0);
    assert_eq!(report.counts.updated_grades, 0);
    assert_eq!(report.counts.unchanged_grades, 1);
    assert!(report.entries.is_empty());
    assert_eq!(store.snapshot(), before);
}

/// Uploads with disjoint assignments add up rather than replace
#[test]
fn test_disjoint_uploads_merge() {
    let mut store = InMemoryStore::new();
    ingest(&mut store, JANE_FIRST_UPLOAD);

    let report = ingest(
        &mut store,
        "First Name,Last Name,Email,Essay\n,,,\n,,,100\nJane,Doe,jane@x.com,88\nRaj,Patel,raj@x.com,91\n",
    );

    assert_eq!(report.counts.new_students, 1);
    assert_eq!(report.counts.new_assignments, 1);
    assert_eq!(report.counts.new_grades, 2);

    assert_eq!(store.students().unwrap().len(), 2);
    assert_eq!(store.assignments().unwrap().len(), 2);
    assert_eq!(store.grades().unwrap().len(), 3);
    assert_eq!(stored_score(&store, "jane@x.com", &quiz_1()), Some(20.0));
    assert_eq!(
        stored_score(&store, "raj@x.com", &AssignmentKey::new("Essay", None)),
        Some(91.0)
    );
}

/// A different max points for an existing assignment never overwrites it
#[test]
fn test_conflicting_max_points_preserve_store() {
    let mut store = InMemoryStore::new();
    ingest(&mut store, JANE_FIRST_UPLOAD);

    let report = ingest(
        &mut store,
        "First Name,Last Name,Email,Quiz 1\n,,,2024-01-10\n,,,30\nJane,Doe,jane@x.com,22\n",
    );

    assert_eq!(report.counts.conflicts, 1);
    assert_eq!(report.counts.updated_grades, 0);
    let conflict = report.entries_of(EntryKind::Conflict).next().unwrap();
    assert_eq!(conflict.reason, reasons::ASSIGNMENT_CONFLICT);
    assert_eq!(
        conflict.detail.as_deref(),
        Some("stored max points 25, upload has 30")
    );

    let assignment = store.find_assignment_by_identity(&quiz_1()).unwrap().unwrap();
    assert_eq!(assignment.max_points, 25);
    assert_eq!(stored_score(&store, "jane@x.com", &quiz_1()), Some(20.0));
}

/// One bad row is skipped without affecting its neighbours
#[test]
fn test_invalid_row_is_isolated() {
    let mut file = String::from("First Name,Last Name,Email,Quiz 1\n,,,2024-01-10\n,,,25\n");
    for i in 0..10 {
        if i == 5 {
            file.push_str("Broken,Row,not-an-email,12\n");
        }
        file.push_str(&format!("Student,{i},student{i}@x.com,{}\n", 10 + i));
    }

    let mut store = InMemoryStore::new();
    let report = ingest(&mut store, &file);

    assert_eq!(report.counts.total_rows, 11);
    assert_eq!(report.counts.processed_rows, 10);
    assert_eq!(report.counts.skipped_rows, 1);
    assert_eq!(report.counts.new_grades, 10);

    let skipped = report.entries_of(EntryKind::RowSkipped).next().unwrap();
    assert_eq!(skipped.row, Some(9));
    assert_eq!(skipped.reason, reasons::INVALID_EMAIL);
    assert_eq!(store.students().unwrap().len(), 10);
}

/// Skipped rows are reported by their line in the file, blank lines included
#[test]
fn test_row_numbers_count_blank_lines() {
    let mut store = InMemoryStore::new();

    let report = ingest(
        &mut store,
        "First Name,Last Name,Email,Quiz 1\n,,,2024-01-10\n,,,25\n\nBroken,Row,not-an-email,12\n",
    );

    let skipped = report.entries_of(EntryKind::RowSkipped).next().unwrap();
    assert_eq!(skipped.row, Some(5));
}

/// A template upload may leave out the due-date row
#[test]
fn test_template_without_due_row() {
    let mut store = InMemoryStore::new();

    let report = ingest(
        &mut store,
        "First,Last,Email,Quiz 1\n,,,25\nJane,Doe,jane@x.com,20\n",
    );

    assert_eq!(report.layout, "template");
    assert_eq!(report.counts.new_grades, 1);
    assert_eq!(
        stored_score(&store, "jane@x.com", &AssignmentKey::new("Quiz 1", None)),
        Some(20.0)
    );
}

/// A second score for the same student and assignment is skipped, first wins
#[test]
fn test_duplicate_student_rows_keep_first_score() {
    let file = "\
First Name,Last Name,Email,Quiz 1
,,,2024-01-10
,,,25
Jane,Doe,jane@x.com,20
Jane,Doe,jane@x.com,22
";
    let mut store = InMemoryStore::new();

    let first = ingest(&mut store, file);
    assert_eq!(first.counts.new_grades, 1);
    assert_eq!(first.counts.updated_grades, 0);
    assert_eq!(first.counts.skipped_cells, 1);
    let skipped = first.entries_of(EntryKind::CellSkipped).next().unwrap();
    assert_eq!(skipped.reason, reasons::DUPLICATE_SCORE);
    assert_eq!(skipped.row, Some(5));
    assert_eq!(stored_score(&store, "jane@x.com", &quiz_1()), Some(20.0));

    let before = store.snapshot();
    let second = ingest(&mut store, file);
    assert_eq!(second.counts.updated_grades, 0);
    assert_eq!(second.counts.unchanged_grades, 1);
    assert_eq!(store.snapshot(), before);
}

/// A column with data but no max points is skipped, the rest still load
#[test]
fn test_blank_max_points_skips_only_that_column() {
    let mut store = InMemoryStore::new();

    let report = ingest(
        &mut store,
        "First Name,Last Name,Email,Quiz 1,Bonus\n,,,2024-01-10,\n,,,25,\nJane,Doe,jane@x.com,20,5\n",
    );

    assert_eq!(report.counts.skipped_assignments, 1);
    assert_eq!(report.counts.new_grades, 1);
    let skipped = report.entries_of(EntryKind::AssignmentSkipped).next().unwrap();
    assert_eq!(skipped.column.as_deref(), Some("Bonus"));
    assert_eq!(skipped.reason, reasons::MISSING_MAX_POINTS);

    assert_eq!(store.assignments().unwrap().len(), 1);
}

/// Google Classroom exports are recognized with their own header names
#[test]
fn test_classroom_export() {
    let mut store = InMemoryStore::new();

    let report = ingest(
        &mut store,
        "Last Name,First Name,Email Address,Essay\n,,,\"Jan 10, 2024\"\n,,,100\nDoe,Jane,Jane@X.com,88\n",
    );

    assert_eq!(report.layout, "classroom");
    assert_eq!(report.counts.new_grades, 1);

    let student = store.find_student_by_email("jane@x.com").unwrap().unwrap();
    assert_eq!(student.first_name, "Jane");
    assert_eq!(student.last_name, "Doe");
    let essay = AssignmentKey::new("Essay", NaiveDate::from_ymd_opt(2024, 1, 10));
    assert_eq!(stored_score(&store, "jane@x.com", &essay), Some(88.0));
}

/// Latin-1, UTF-16 and semicolon-separated uploads all load
#[test]
fn test_encodings_and_delimiters() {
    let mut latin1 = b"First Name,Last Name,Email,Quiz 1\n,,,2024-01-10\n,,,25\nZo".to_vec();
    latin1.push(0xEB);
    latin1.extend_from_slice(b",Doe,zoe@x.com,19\n");

    let mut utf16 = vec![0xFF, 0xFE];
    utf16.extend(
        "First Name,Last Name,Email,Quiz 1\n,,,2024-01-10\n,,,25\nRaj,Patel,raj@x.com,21\n"
            .encode_utf16()
            .flat_map(|unit| unit.to_le_bytes()),
    );

    let semicolon =
        b"First Name;Last Name;Email;Quiz 1\n;;;2024-01-10\n;;;25\nJane;Doe;jane@x.com;20\n";

    let pipeline = pipeline();
    let mut store = InMemoryStore::new();
    for bytes in [latin1.as_slice(), utf16.as_slice(), semicolon.as_slice()] {
        let report = pipeline.ingest(bytes, &options(), &mut store).unwrap();
        assert_eq!(report.counts.new_grades, 1);
    }

    let zoe = store.find_student_by_email("zoe@x.com").unwrap().unwrap();
    assert_eq!(zoe.first_name, "Zoë");
    assert_eq!(store.assignments().unwrap().len(), 1);
    assert_eq!(store.grades().unwrap().len(), 3);
}

/// Dry runs report the same outcome without writing
#[test]
fn test_dry_run_reports_without_saving() {
    let mut store = InMemoryStore::new();

    let report = pipeline()
        .ingest(
            JANE_FIRST_UPLOAD.as_bytes(),
            &options().with_dry_run(true),
            &mut store,
        )
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.counts.new_grades, 1);
    assert!(store.students().unwrap().is_empty());
    assert!(store.grades().unwrap().is_empty());
}

/// Unreadable files are rejected before anything is stored
#[test]
fn test_unrecognized_file_is_rejected() {
    let mut store = InMemoryStore::new();

    let result = pipeline().ingest(b"Name,Score\nJane,20\n", &options(), &mut store);

    assert!(matches!(result, Err(Error::UnrecognizedLayout { .. })));
    assert!(store.students().unwrap().is_empty());
}

/// The JSON file store keeps state across reopen
#[test]
fn test_json_store_persists_between_uploads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("grades.json");

    {
        let mut store = JsonFileStore::open(&path).unwrap();
        ingest(&mut store, JANE_FIRST_UPLOAD);
    }

    let mut store = JsonFileStore::open(&path).unwrap();
    assert_eq!(stored_score(&store, "jane@x.com", &quiz_1()), Some(20.0));

    let report = ingest(&mut store, JANE_SECOND_UPLOAD);
    assert_eq!(report.counts.updated_grades, 1);

    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(stored_score(&reopened, "jane@x.com", &quiz_1()), Some(22.0));
}
