//! Inspect command implementation
//!
//! Summarizes what the grade store currently holds: entity counts and,
//! with `--detailed`, every assignment with its due date, max points,
//! graded-student count and tags.

use super::shared::{RunStats, load_configuration, resolve_store_path, setup_logging};
use crate::app::adapters::json_store::JsonFileStore;
use crate::app::store::GradeStore;
use crate::cli::args::{InspectArgs, ReportFormat};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

/// Store contents summary
#[derive(Debug, Clone, Serialize)]
pub struct StoreOverview {
    pub store: String,
    pub students: usize,
    pub assignments: usize,
    pub grades: usize,
    pub tags: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_details: Option<Vec<AssignmentOverview>>,
}

/// One assignment line in the detailed overview
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentOverview {
    pub name: String,
    pub due_date: Option<String>,
    pub max_points: u32,
    pub graded: usize,
    pub tags: Vec<String>,
}

/// Inspect command runner
pub fn run_inspect(args: InspectArgs) -> Result<RunStats> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), false)?;
    debug!("Inspect arguments: {:?}", args);

    if let Some(config_file) = &args.config_file {
        if !config_file.exists() {
            return Err(Error::configuration(format!(
                "Config file does not exist: {}",
                config_file.display()
            )));
        }
    }

    let config = load_configuration(args.config_file.as_deref())?;
    let store_path = resolve_store_path(args.store.as_deref(), &config)?;
    info!("Inspecting store: {}", store_path.display());

    let store = JsonFileStore::open(&store_path)?;
    let overview = build_overview(&store, store_path.display().to_string(), args.detailed)?;

    let output = match args.format {
        ReportFormat::Human => render_human(&overview),
        ReportFormat::Json => serde_json::to_string_pretty(&overview)
            .map_err(|e| Error::serialization("Failed to encode store overview", e))?,
    };
    println!("{}", output);

    let stats = RunStats {
        elapsed: start_time.elapsed(),
        ..RunStats::default()
    };
    debug!("{}", stats.summary());
    Ok(stats)
}

/// Collect counts, and per-assignment details when `detailed` is set
pub fn build_overview<S: GradeStore + ?Sized>(
    store: &S,
    label: String,
    detailed: bool,
) -> Result<StoreOverview> {
    let assignments = store.assignments()?;
    let grades = store.grades()?;

    let assignment_details = if detailed {
        let mut graded: HashMap<_, usize> = HashMap::new();
        for grade in &grades {
            *graded.entry(grade.assignment.clone()).or_default() += 1;
        }

        Some(
            assignments
                .iter()
                .map(|assignment| AssignmentOverview {
                    name: assignment.name.clone(),
                    due_date: assignment.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
                    max_points: assignment.max_points,
                    graded: graded.get(&assignment.key()).copied().unwrap_or(0),
                    tags: assignment.tags.iter().cloned().collect(),
                })
                .collect(),
        )
    } else {
        None
    };

    Ok(StoreOverview {
        store: label,
        students: store.students()?.len(),
        assignments: assignments.len(),
        grades: grades.len(),
        tags: store.tags()?.len(),
        assignment_details,
    })
}

fn render_human(overview: &StoreOverview) -> String {
    let mut output = format!(
        "📚 Grade Store Overview\n\
         ======================\n\
         📁 Store: {}\n\
         👩‍🎓 Students: {}\n\
         📝 Assignments: {}\n\
         ✅ Grades: {}\n\
         🏷️  Tags: {}\n",
        overview.store,
        overview.students,
        overview.assignments,
        overview.grades,
        overview.tags
    );

    if let Some(details) = &overview.assignment_details {
        output.push_str("\nAssignments:\n");
        if details.is_empty() {
            output.push_str("   (none)\n");
        }
        for assignment in details {
            output.push_str(&format!(
                "   • {} (due {}) | max {} | {} graded",
                assignment.name,
                assignment.due_date.as_deref().unwrap_or("none"),
                assignment.max_points,
                assignment.graded
            ));
            if !assignment.tags.is_empty() {
                output.push_str(&format!(" | tags: {}", assignment.tags.join(", ")));
            }
            output.push('\n');
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::adapters::memory_store::InMemoryStore;
    use crate::app::models::{Assignment, AssignmentKey, Grade, Student, Tag};
    use crate::app::store::ChangeSet;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn populated_store() -> InMemoryStore {
        let key = AssignmentKey::new("Quiz 1", NaiveDate::from_ymd_opt(2024, 1, 10));
        let mut assignment = Assignment::new(&key, 25);
        assignment.tags.insert("Quizzes".to_string());

        let mut changes = ChangeSet::new();
        changes.students.push(Student::new("jane@x.com", "Jane", "Doe"));
        changes.students.push(Student::new("raj@x.com", "Raj", "Patel"));
        changes.tags.push(Tag::new("Quizzes"));
        changes.assignments.push(assignment);
        changes.grades.push(Grade {
            student_email: "jane@x.com".to_string(),
            assignment: key,
            score: 20.0,
            last_updated: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
        });

        let mut store = InMemoryStore::new();
        store.apply(changes).unwrap();
        store
    }

    #[test]
    fn test_overview_counts() {
        let overview = build_overview(&populated_store(), "memory".to_string(), false).unwrap();

        assert_eq!(overview.students, 2);
        assert_eq!(overview.assignments, 1);
        assert_eq!(overview.grades, 1);
        assert_eq!(overview.tags, 1);
        assert!(overview.assignment_details.is_none());
    }

    #[test]
    fn test_detailed_overview() {
        let overview = build_overview(&populated_store(), "memory".to_string(), true).unwrap();
        let details = overview.assignment_details.as_ref().unwrap();

        assert_eq!(details.len(), 1);
        assert_eq!(details[0].due_date.as_deref(), Some("2024-01-10"));
        assert_eq!(details[0].graded, 1);
        assert_eq!(details[0].tags, vec!["Quizzes".to_string()]);

        let text = render_human(&overview);
        assert!(text.contains("Quiz 1 (due 2024-01-10) | max 25 | 1 graded | tags: Quizzes"));
    }

    #[test]
    fn test_empty_store_json_omits_details() {
        let overview = build_overview(&InMemoryStore::new(), "memory".to_string(), false).unwrap();
        let json = serde_json::to_value(&overview).unwrap();

        assert_eq!(json["students"], 0);
        assert!(json.get("assignment_details").is_none());
    }
}
