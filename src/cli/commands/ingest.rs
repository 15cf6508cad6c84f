//! Ingest command implementation
//!
//! Runs every input file through the upload pipeline against the JSON store,
//! one file at a time, and prints one report per file.

use super::shared::{
    RunStats, create_progress_bar, expand_inputs, load_configuration, resolve_store_path,
    setup_logging,
};
use crate::app::adapters::json_store::JsonFileStore;
use crate::app::services::pipeline::{UploadOptions, UploadPipeline};
use crate::app::services::upload_report::{EntryKind, UploadReport};
use crate::cli::args::{IngestArgs, ReportFormat};
use crate::{Error, Result};
use chrono::Utc;
use colored::*;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Outcome of one input file
enum FileOutcome {
    Ingested(UploadReport),
    Rejected { file: String, error: String },
}

/// Ingest command runner
pub fn run_ingest(args: IngestArgs) -> Result<RunStats> {
    setup_logging(args.get_log_level(), args.quiet)?;
    debug!("Command line arguments: {:?}", args);

    let (stats, outcomes) = ingest_files(&args)?;
    info!("{}", stats.summary());

    match args.format {
        ReportFormat::Human => {
            print_human_reports(&outcomes, args.dry_run);
            if !args.quiet {
                println!("{}", stats.summary().bold());
            }
        }
        ReportFormat::Json => print_json_reports(&outcomes)?,
    }

    Ok(stats)
}

/// Run every input file through the pipeline
///
/// Unreadable, malformed or unrecognized files are recorded as rejected and
/// the run continues; configuration and storage failures stop it.
fn ingest_files(args: &IngestArgs) -> Result<(RunStats, Vec<FileOutcome>)> {
    let start_time = Instant::now();
    args.validate()?;

    let mut config = load_configuration(args.config_file.as_deref())?;
    if let Some(delimiter) = args.delimiter {
        config = config.with_delimiter(delimiter.into());
    }

    let files = expand_inputs(&args.files)
        .map_err(|e| Error::configuration(format!("{:#}", e)))?;
    let store_path = resolve_store_path(args.store.as_deref(), &config)?;
    info!(
        "Ingesting {} files into {}",
        files.len(),
        store_path.display()
    );

    let mut store = JsonFileStore::open(&store_path)?;
    let pipeline = UploadPipeline::new(config)?;
    let options = UploadOptions::new(Utc::now())
        .with_tags(args.tags.clone())
        .with_dry_run(args.dry_run);

    let mut stats = RunStats::default();
    let mut outcomes = Vec::new();

    for file in &files {
        let source_name = file.display().to_string();

        if !pipeline.config().is_allowed_extension(file) {
            warn!("Skipping {}: extension not allowed", source_name);
            stats.files_rejected += 1;
            outcomes.push(FileOutcome::Rejected {
                error: format!(
                    "extension not allowed (expected one of: {})",
                    pipeline.config().allowed_extensions.join(", ")
                ),
                file: source_name,
            });
            continue;
        }

        let bytes = match read_upload(file) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Rejected {}: {}", source_name, e);
                stats.files_rejected += 1;
                outcomes.push(FileOutcome::Rejected {
                    file: source_name,
                    error: e.to_string(),
                });
                continue;
            }
        };

        let progress = args
            .show_progress()
            .then(|| create_progress_bar(&source_name));
        match pipeline.ingest_with_progress(&bytes, &options, &mut store, progress.as_ref()) {
            Ok(report) => {
                stats.files_processed += 1;
                stats.grades_written += report.counts.new_grades + report.counts.updated_grades;
                stats.problems += report.entries.iter().filter(|e| e.kind.is_problem()).count();
                outcomes.push(FileOutcome::Ingested(report.with_source(source_name)));
            }
            Err(e) if e.is_fatal_upload_error() => {
                error!("Rejected {}: {}", source_name, e);
                stats.files_rejected += 1;
                outcomes.push(FileOutcome::Rejected {
                    file: source_name,
                    error: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    stats.elapsed = start_time.elapsed();
    Ok((stats, outcomes))
}

/// Read one upload into memory
fn read_upload(file: &Path) -> Result<Vec<u8>> {
    std::fs::read(file).map_err(|e| Error::io(format!("Failed to read {}", file.display()), e))
}

/// Print colored per-file reports
fn print_human_reports(outcomes: &[FileOutcome], dry_run: bool) {
    for outcome in outcomes {
        match outcome {
            FileOutcome::Ingested(report) => print_human_report(report),
            FileOutcome::Rejected { file, error } => {
                println!("{} {}", "✗".red().bold(), file.bold());
                println!("   {}", error.red());
                println!();
            }
        }
    }

    if dry_run {
        println!("{}", "Dry run: nothing was saved to the store".yellow());
    }
}

fn print_human_report(report: &UploadReport) {
    let c = &report.counts;
    let marker = if report.has_problems() {
        "!".yellow().bold()
    } else {
        "✓".green().bold()
    };

    println!(
        "{} {} ({} layout)",
        marker,
        report.source.as_deref().unwrap_or("upload").bold(),
        report.layout
    );
    println!("   • Rows processed: {}/{}", c.processed_rows, c.total_rows);
    println!(
        "   • Students: {} new, {} updated",
        c.new_students, c.updated_students
    );
    println!(
        "   • Assignments: {} new, {} skipped (tags created: {})",
        c.new_assignments, c.skipped_assignments, c.new_tags
    );
    println!(
        "   • Grades: {} new, {} updated, {} unchanged",
        c.new_grades, c.updated_grades, c.unchanged_grades
    );
    if c.skipped_rows + c.skipped_cells + c.conflicts > 0 {
        println!(
            "   • Skipped: {} rows, {} cells | Conflicts: {}",
            c.skipped_rows, c.skipped_cells, c.conflicts
        );
    }

    for entry in &report.entries {
        let line = entry.to_string();
        let line = match entry.kind {
            EntryKind::Conflict | EntryKind::RowSkipped => line.red(),
            EntryKind::CellSkipped | EntryKind::AssignmentSkipped | EntryKind::Warning => {
                line.yellow()
            }
            EntryKind::GradeUpdated | EntryKind::StudentUpdated => line.normal(),
        };
        println!("     {}", line);
    }
    println!();
}

/// Print all outcomes as one JSON document
fn print_json_reports(outcomes: &[FileOutcome]) -> Result<()> {
    let files: Vec<serde_json::Value> = outcomes
        .iter()
        .map(|outcome| match outcome {
            FileOutcome::Ingested(report) => serde_json::json!({
                "status": "ingested",
                "report": report,
            }),
            FileOutcome::Rejected { file, error } => serde_json::json!({
                "status": "rejected",
                "source": file,
                "error": error,
            }),
        })
        .collect();

    let json = serde_json::to_string_pretty(&serde_json::json!({ "files": files }))
        .map_err(|e| Error::serialization("Failed to encode upload reports", e))?;
    println!("{}", json);
    Ok(())
}
