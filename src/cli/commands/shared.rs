//! Shared components for CLI commands
//!
//! Logging setup, configuration loading, input discovery and progress bars
//! used by more than one command.

use crate::config::IngestConfig;
use crate::{Error, Result};
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Run statistics reported back to `main`
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Files ingested (or written, for the template command)
    pub files_processed: usize,
    /// Files rejected as malformed, unrecognized, or with a disallowed extension
    pub files_rejected: usize,
    /// Grades created or updated across all files
    pub grades_written: usize,
    /// Skipped rows, skipped cells, skipped assignments and conflicts across all files
    pub problems: usize,
    pub elapsed: std::time::Duration,
}

impl RunStats {
    /// Whether every input was accepted
    pub fn is_clean(&self) -> bool {
        self.files_rejected == 0
    }

    /// One-line summary of the whole run
    pub fn summary(&self) -> String {
        format!(
            "Run Summary: {} files processed, {} rejected | Grades written: {} | Problems: {} | Time: {:.2}s",
            self.files_processed,
            self.files_rejected,
            self.grades_written,
            self.problems,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Set up structured logging
///
/// `RUST_LOG` overrides the level derived from the verbosity flags.
pub fn setup_logging(log_level: &str, quiet: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gradebook_ingest={}", log_level)));

    if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration from `--config`, else the default location if present
pub fn load_configuration(config_file: Option<&Path>) -> Result<IngestConfig> {
    let default_config_path = if config_file.is_none() {
        IngestConfig::default_config_path().ok()
    } else {
        None
    };

    let config_file = config_file.or_else(|| {
        default_config_path
            .as_deref()
            .filter(|path| path.exists())
    });

    let config = match config_file {
        Some(path) => {
            info!("Using config file: {}", path.display());
            IngestConfig::load_from_file(path)?
        }
        None => {
            info!("No config file found, using defaults");
            IngestConfig::default()
        }
    };

    config.validate()?;
    Ok(config)
}

/// Pick the store path: CLI flag, then configuration, then the data directory
pub fn resolve_store_path(flag: Option<&Path>, config: &IngestConfig) -> Result<PathBuf> {
    match (flag, &config.store_path) {
        (Some(path), _) => Ok(path.to_path_buf()),
        (None, Some(path)) => Ok(path.clone()),
        (None, None) => IngestConfig::default_store_path(),
    }
}

/// Expand paths and glob patterns into a sorted, de-duplicated file list
///
/// Plain paths are kept even when missing so the caller can report them.
pub fn expand_inputs(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        if !is_glob(pattern) {
            files.push(PathBuf::from(pattern));
            continue;
        }

        let matches =
            glob::glob(pattern).with_context(|| format!("Invalid glob pattern '{}'", pattern))?;
        let mut found = 0;
        for entry in matches {
            let path = entry.with_context(|| format!("Failed to read match for '{}'", pattern))?;
            if path.is_file() {
                files.push(path);
                found += 1;
            }
        }

        if found == 0 {
            anyhow::bail!("No files match '{}'", pattern);
        }
        debug!("Pattern '{}' matched {} files", pattern, found);
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(message: &str) -> ProgressBar {
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}
