//! Template command implementation
//!
//! Writes the blank upload template: the header row, the due-date row and
//! the max-points row, ready for a teacher to fill in.

use super::shared::{RunStats, setup_logging};
use crate::cli::args::TemplateArgs;
use crate::constants::{TEMPLATE_IDENTITY_HEADERS, TEMPLATE_PLACEHOLDER_ASSIGNMENTS};
use crate::{Error, Result};
use colored::*;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Labels written in the first column of the two sub-rows
const DUE_DATE_LABEL: &str = "Due Date";
const MAX_POINTS_LABEL: &str = "Max Points";

/// Template command runner
pub fn run_template(args: TemplateArgs) -> Result<RunStats> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), false)?;
    args.validate()?;

    let rows = template_rows(&args.assignments);
    write_template(&args.output, &rows)?;
    info!("Wrote upload template to {}", args.output.display());

    println!(
        "{} Template written to {}",
        "✓".green().bold(),
        args.output.display().to_string().bold()
    );
    println!("   Fill in due dates (e.g. 2024-01-10) and max points before adding students.");

    let stats = RunStats {
        files_processed: 1,
        elapsed: start_time.elapsed(),
        ..RunStats::default()
    };
    info!("{}", stats.summary());
    Ok(stats)
}

/// Build the three template rows
///
/// Without named assignments, placeholder columns are written instead.
pub fn template_rows(assignments: &[String]) -> Vec<Vec<String>> {
    let names: Vec<String> = if assignments.is_empty() {
        TEMPLATE_PLACEHOLDER_ASSIGNMENTS
            .iter()
            .map(|s| s.to_string())
            .collect()
    } else {
        assignments.iter().map(|s| s.trim().to_string()).collect()
    };

    let width = TEMPLATE_IDENTITY_HEADERS.len() + names.len();
    let mut header: Vec<String> = TEMPLATE_IDENTITY_HEADERS
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend(names);

    let mut due_row = vec![String::new(); width];
    due_row[0] = DUE_DATE_LABEL.to_string();
    let mut max_row = vec![String::new(); width];
    max_row[0] = MAX_POINTS_LABEL.to_string();

    vec![header, due_row, max_row]
}

fn write_template(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::io(format!("Failed to create directory {}", parent.display()), e)
        })?;
    }

    let write_error = |e: std::io::Error| Error::io(format!("Failed to write {}", path.display()), e);

    let file = std::fs::File::create(path).map_err(write_error)?;
    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| write_error(e.into()))?;
    }
    writer.flush().map_err(write_error)
}
