//! Command-line argument definitions for gradebook ingestion
//!
//! This module defines the complete CLI interface using the clap derive API.

use crate::config::DelimiterChoice;
use crate::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the gradebook ingester
///
/// Reconciles teacher-submitted gradebook spreadsheets against a persistent
/// store of students, assignments and grades.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gradebook-ingest",
    version,
    about = "Reconcile gradebook spreadsheets into a persistent grade store",
    long_about = "Reads gradebook uploads in the fixed template layout or as Google Classroom \
                  exports, matches students by email and assignments by name and due date, and \
                  records new and changed grades without creating duplicates or overwriting \
                  stored max points. Every skipped row, skipped cell and conflict is reported."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Ingest one or more gradebook files into the store
    Ingest(IngestArgs),
    /// Write a blank upload template
    Template(TemplateArgs),
    /// Show what the store currently holds
    Inspect(InspectArgs),
}

/// Arguments for the ingest command
#[derive(Debug, Clone, Parser)]
pub struct IngestArgs {
    /// Files or glob patterns to ingest
    ///
    /// Each file is a separate upload; a rejected file does not stop the others.
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<String>,

    /// Path to the JSON grade store
    ///
    /// Defaults to the `store_path` configuration value, then to the user data
    /// directory (gradebook-ingest/store.json).
    #[arg(
        short = 's',
        long = "store",
        value_name = "FILE",
        help = "Path to the JSON grade store"
    )]
    pub store: Option<PathBuf>,

    /// Field delimiter; sniffed from the file when not given
    #[arg(
        short = 'd',
        long = "delimiter",
        value_enum,
        help = "Field delimiter (default: sniffed from the file)"
    )]
    pub delimiter: Option<DelimiterArg>,

    /// Tag attached to every assignment the upload creates (repeatable)
    #[arg(
        short = 't',
        long = "tag",
        value_name = "NAME",
        help = "Tag attached to newly created assignments (repeatable)"
    )]
    pub tags: Vec<String>,

    /// Reconcile and report without saving anything
    #[arg(long = "dry-run", help = "Report what would change without saving")]
    pub dry_run: bool,

    /// Report output format
    #[arg(
        short = 'f',
        long = "format",
        value_enum,
        default_value = "human",
        help = "Output format for upload reports"
    )]
    pub format: ReportFormat,

    /// Path to configuration file
    ///
    /// TOML configuration file. If not specified, looks for
    /// gradebook-ingest/config.toml in the user config directory.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the template command
#[derive(Debug, Clone, Parser)]
pub struct TemplateArgs {
    /// Where to write the template
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Assignment column to include (repeatable)
    #[arg(
        short = 'a',
        long = "assignment",
        value_name = "NAME",
        help = "Assignment column to include (repeatable)"
    )]
    pub assignments: Vec<String>,

    /// Overwrite an existing file
    #[arg(long = "force", help = "Overwrite an existing file")]
    pub force: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

/// Arguments for the inspect command
#[derive(Debug, Clone, Parser)]
pub struct InspectArgs {
    /// Path to the JSON grade store
    #[arg(
        short = 's',
        long = "store",
        value_name = "FILE",
        help = "Path to the JSON grade store"
    )]
    pub store: Option<PathBuf>,

    /// Path to configuration file
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Output format
    #[arg(
        short = 'f',
        long = "format",
        value_enum,
        default_value = "human",
        help = "Output format for store contents"
    )]
    pub format: ReportFormat,

    /// List every assignment, not just counts
    #[arg(long = "detailed", help = "List every assignment")]
    pub detailed: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

/// Delimiter choices accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DelimiterArg {
    Auto,
    Comma,
    Semicolon,
    Tab,
    Pipe,
}

impl From<DelimiterArg> for DelimiterChoice {
    fn from(arg: DelimiterArg) -> Self {
        match arg {
            DelimiterArg::Auto => DelimiterChoice::Auto,
            DelimiterArg::Comma => DelimiterChoice::Comma,
            DelimiterArg::Semicolon => DelimiterChoice::Semicolon,
            DelimiterArg::Tab => DelimiterChoice::Tab,
            DelimiterArg::Pipe => DelimiterChoice::Pipe,
        }
    }
}

/// Map verbosity flags onto a tracing level name
fn log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

impl IngestArgs {
    /// Validate the ingest arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if self.files.iter().all(|f| f.trim().is_empty()) {
            return Err(Error::configuration("No input files given"));
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        if self.tags.iter().any(|tag| tag.trim().is_empty()) {
            return Err(Error::configuration("Tag names cannot be blank"));
        }

        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, self.quiet)
    }

    /// Progress bars only in interactive human output
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.format == ReportFormat::Human
    }
}

impl TemplateArgs {
    /// Validate the template arguments
    pub fn validate(&self) -> Result<()> {
        if self.output.exists() && !self.force {
            return Err(Error::configuration(format!(
                "Output file already exists: {} (use --force to overwrite)",
                self.output.display()
            )));
        }

        if self.assignments.iter().any(|name| name.trim().is_empty()) {
            return Err(Error::configuration("Assignment names cannot be blank"));
        }

        Ok(())
    }

    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, false)
    }
}

impl InspectArgs {
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, false)
    }
}
