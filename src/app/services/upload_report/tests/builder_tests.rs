//! Tests for report counts and entry ordering

use super::*;
use crate::app::services::upload_report::{EntryKind, ReportCounts};
use crate::constants::reasons;
use pretty_assertions::assert_eq;

const HEADER: &[&str] = &["First", "Last", "Email", "Quiz 1"];
const DUE: &[&str] = &["", "", "", "2024-01-10"];
const MAX: &[&str] = &["", "", "", "25"];

#[test]
fn test_first_upload_counts() {
    let mut store = InMemoryStore::new();
    let report = report_for(&mut store, &[HEADER, DUE, MAX, &["Jane", "Doe", "jane@x.com", "20"]]);

    assert_eq!(
        report.counts,
        ReportCounts {
            new_students: 1,
            new_assignments: 1,
            new_grades: 1,
            processed_rows: 1,
            total_rows: 1,
            ..ReportCounts::default()
        }
    );
    assert!(report.entries.is_empty());
    assert_eq!(report.layout, "template");
}

#[test]
fn test_updated_grade_reason() {
    let mut store = InMemoryStore::new();
    report_for(&mut store, &[HEADER, DUE, MAX, &["Jane", "Doe", "jane@x.com", "20"]]);
    let report = report_for(&mut store, &[HEADER, DUE, MAX, &["Jane", "Doe", "jane@x.com", "22"]]);

    assert_eq!(report.counts.new_students, 0);
    assert_eq!(report.counts.new_grades, 0);
    assert_eq!(report.counts.updated_grades, 1);
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].kind, EntryKind::GradeUpdated);
    assert_eq!(report.entries[0].reason, "score changed 20→22");
    assert_eq!(report.entries[0].row, Some(4));
}

#[test]
fn test_unscorable_column_reported_without_grades() {
    let mut store = InMemoryStore::new();
    let report = report_for(
        &mut store,
        &[HEADER, DUE, &["", "", "", ""], &["Jane", "Doe", "jane@x.com", "20"]],
    );

    assert_eq!(report.counts.skipped_assignments, 1);
    assert_eq!(report.counts.new_grades, 0);
    assert_eq!(report.counts.new_assignments, 0);
    assert_eq!(report.entries[0].kind, EntryKind::AssignmentSkipped);
    assert_eq!(report.entries[0].reason, reasons::MISSING_MAX_POINTS);
    assert_eq!(report.entries[0].column.as_deref(), Some("Quiz 1"));
    assert!(store.grades().unwrap().is_empty());
}

#[test]
fn test_entries_ordered_by_row_then_column() {
    let mut store = InMemoryStore::new();
    let report = report_for(
        &mut store,
        &[
            &["First", "Last", "Email", "Quiz 1", "Quiz 2", "Quiz 3"],
            &["", "", "", "2024-01-10", "later", "2024-01-24"],
            &["", "", "", "25", "10", ""],
            &["Jane", "Doe", "jane@x.com", "x", "30", "5"],
            &["Rick", "Roe", "bad-email", "1", "2", "3"],
            &["Ann", "Lee", "ann@x.com", "-1", "oops", ""],
        ],
    );

    let order: Vec<(Option<usize>, Option<&str>, EntryKind)> = report
        .entries
        .iter()
        .map(|e| (e.row, e.column.as_deref(), e.kind))
        .collect();
    assert_eq!(
        order,
        vec![
            (None, Some("Quiz 3"), EntryKind::AssignmentSkipped),
            (Some(2), Some("Quiz 2"), EntryKind::Warning),
            (Some(4), Some("Quiz 1"), EntryKind::CellSkipped),
            (Some(4), Some("Quiz 2"), EntryKind::Warning),
            (Some(5), None, EntryKind::RowSkipped),
            (Some(6), Some("Quiz 1"), EntryKind::CellSkipped),
            (Some(6), Some("Quiz 2"), EntryKind::CellSkipped),
        ]
    );
    assert_eq!(report.counts.skipped_rows, 1);
    assert_eq!(report.counts.skipped_cells, 3);
    assert_eq!(report.counts.warnings, 2);
    assert_eq!(report.counts.total_rows, 3);
    assert_eq!(report.counts.processed_rows, 2);
}

#[test]
fn test_row_isolation() {
    let mut data: Vec<Vec<String>> = vec![
        HEADER.iter().map(|s| s.to_string()).collect(),
        DUE.iter().map(|s| s.to_string()).collect(),
        MAX.iter().map(|s| s.to_string()).collect(),
    ];
    for i in 0..10 {
        data.push(vec![
            format!("Student{}", i),
            "Test".to_string(),
            format!("s{}@x.com", i),
            "20".to_string(),
        ]);
    }
    data.insert(7, vec![
        "No".to_string(),
        "Email".to_string(),
        "".to_string(),
        "20".to_string(),
    ]);
    let borrowed: Vec<Vec<&str>> = data
        .iter()
        .map(|row| row.iter().map(String::as_str).collect())
        .collect();
    let slices: Vec<&[&str]> = borrowed.iter().map(Vec::as_slice).collect();

    let mut store = InMemoryStore::new();
    let report = report_for(&mut store, &slices);

    assert_eq!(report.counts.processed_rows, 10);
    assert_eq!(report.counts.skipped_rows, 1);
    assert_eq!(report.counts.new_grades, 10);
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].row, Some(8));
}
