//! End-to-end upload pipeline
//!
//! Runs one uploaded file through every stage, strictly in order:
//! bytes → rows → classified layout → normalized rows → decisions → report.
//! The store is read throughout but written at most once, after the whole
//! file has been reconciled, so a fatal error leaves it untouched.

use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use crate::app::services::layout_classifier::LayoutClassifier;
use crate::app::services::reconciler::EntityReconciler;
use crate::app::services::row_normalizer::RowNormalizer;
use crate::app::services::tabular_reader::TabularReader;
use crate::app::services::upload_report::{ReportBuilder, UploadReport};
use crate::app::store::GradeStore;
use crate::config::IngestConfig;
use crate::constants::{LAYOUT_HEADER_ROWS, PROGRESS_ROW_THRESHOLD};
use crate::{Error, Result};

/// Per-upload options
#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Tags attached to assignments this upload creates
    pub tags: Vec<String>,
    /// Reconcile and report without applying anything
    pub dry_run: bool,
    /// Timestamp recorded on created and updated grades
    pub now: DateTime<Utc>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl UploadOptions {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            tags: Vec::new(),
            dry_run: false,
            now,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Ingestion pipeline built once from configuration and reused per upload
#[derive(Debug, Clone)]
pub struct UploadPipeline {
    config: IngestConfig,
    classifier: LayoutClassifier,
    normalizer: RowNormalizer,
}

impl UploadPipeline {
    /// Validate `config` and compile its matchers
    pub fn new(config: IngestConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            classifier: LayoutClassifier::new(&config)?,
            normalizer: RowNormalizer::new(&config)?,
            config,
        })
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Ingest one file into `store`
    pub fn ingest<S: GradeStore + ?Sized>(
        &self,
        bytes: &[u8],
        options: &UploadOptions,
        store: &mut S,
    ) -> Result<UploadReport> {
        self.ingest_with_progress(bytes, options, store, None)
    }

    /// Ingest one file, advancing `progress` per reconciled row on large uploads
    pub fn ingest_with_progress<S: GradeStore + ?Sized>(
        &self,
        bytes: &[u8],
        options: &UploadOptions,
        store: &mut S,
        progress: Option<&ProgressBar>,
    ) -> Result<UploadReport> {
        let reader =
            TabularReader::from_bytes(bytes, self.config.delimiter, self.config.max_file_size)
                .inspect_err(|e| warn!("Upload rejected: {}", e))?;

        let mut rows = reader.numbered_rows();
        let leading = rows
            .by_ref()
            .take(LAYOUT_HEADER_ROWS)
            .collect::<Result<Vec<_>>>()
            .inspect_err(|e| warn!("Upload rejected: {}", e))?;
        if leading.is_empty() {
            return Err(Error::malformed_file("file contains no rows"));
        }

        let header_rows: Vec<Vec<String>> = leading.iter().map(|row| row.cells.clone()).collect();
        let mut layout = self
            .classifier
            .classify(&header_rows)
            .inspect_err(|e| warn!("Upload rejected: {}", e))?;

        // Warnings count records; report them by file line
        for warning in &mut layout.warnings {
            if let Some(source) = warning.row.checked_sub(1).and_then(|i| leading.get(i)) {
                warning.row = source.line;
            }
        }

        let buffered = leading.get(layout.data_start..).unwrap_or_default().to_vec();
        let upload = self
            .normalizer
            .normalize(&layout, buffered.into_iter().map(Ok).chain(rows))
            .inspect_err(|e| warn!("Upload rejected: {}", e))?;

        let mut tags = options.tags.clone();
        tags.extend(self.config.default_tags.iter().cloned());

        let progress = progress.filter(|_| upload.rows.len() >= PROGRESS_ROW_THRESHOLD);
        if let Some(pb) = progress {
            pb.set_length(upload.rows.len() as u64);
        }

        let reconciliation = EntityReconciler::new(&*store, options.now)
            .with_tags(tags)
            .reconcile(&upload, progress)?;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        let report = ReportBuilder::new(layout.layout_name.clone())
            .dry_run(options.dry_run)
            .build(&upload, &reconciliation);

        if options.dry_run {
            debug!(
                "Dry run: leaving {} unapplied",
                reconciliation.changes.summary()
            );
        } else if !reconciliation.changes.is_empty() {
            store.apply(reconciliation.changes)?;
        }

        info!("{}", report.summary());
        Ok(report)
    }
}
