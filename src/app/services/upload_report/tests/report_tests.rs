//! Tests for report output formats

use crate::app::services::upload_report::{EntryKind, ReportCounts, ReportEntry, UploadReport};

fn sample_report() -> UploadReport {
    UploadReport {
        source: Some("period3.csv".to_string()),
        layout: "template".to_string(),
        dry_run: true,
        counts: ReportCounts {
            updated_grades: 1,
            conflicts: 1,
            processed_rows: 2,
            total_rows: 2,
            ..ReportCounts::default()
        },
        entries: vec![
            ReportEntry::new(EntryKind::GradeUpdated, "score changed 20→22")
                .at_row(4)
                .in_column(3, "Quiz 1")
                .for_student("jane@x.com"),
            ReportEntry::new(EntryKind::Conflict, "assignment_conflict")
                .at_row(5)
                .in_column(3, "Quiz 1")
                .with_detail("stored max points 25, upload has 30"),
        ],
    }
}

#[test]
fn test_entry_display() {
    let report = sample_report();

    assert_eq!(
        report.entries[0].to_string(),
        "[grade updated] row 4, 'Quiz 1', jane@x.com: score changed 20→22"
    );
    assert_eq!(
        report.entries[1].to_string(),
        "[conflict] row 5, 'Quiz 1': assignment_conflict (stored max points 25, upload has 30)"
    );
    assert_eq!(
        ReportEntry::new(EntryKind::AssignmentSkipped, "insufficient data").to_string(),
        "[assignment skipped] insufficient data"
    );
}

#[test]
fn test_report_display_mentions_dry_run_and_summary() {
    let text = sample_report().to_string();

    assert!(text.starts_with("period3.csv (template layout)\n"));
    assert!(text.contains("Dry run: no changes were saved"));
    assert!(text.contains("2/2 rows processed"));
    assert!(text.contains("Conflicts: 1"));
}

#[test]
fn test_json_shape() {
    let json = serde_json::to_value(sample_report()).unwrap();

    assert_eq!(json["counts"]["updated_grades"], 1);
    assert_eq!(json["entries"][0]["kind"], "grade_updated");
    assert_eq!(json["entries"][0]["column"], "Quiz 1");
    assert!(json["entries"][0].get("column_index").is_none());
    assert!(json["entries"][0].get("detail").is_none());
    assert_eq!(json["entries"][1]["detail"], "stored max points 25, upload has 30");
}

#[test]
fn test_has_problems() {
    let report = sample_report();
    assert!(report.has_problems());
    assert_eq!(report.entries_of(EntryKind::Conflict).count(), 1);

    let mut clean = sample_report();
    clean.entries.truncate(1);
    assert!(!clean.has_problems());
}
