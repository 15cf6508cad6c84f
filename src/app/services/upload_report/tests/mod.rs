//! Tests for upload report construction

pub mod builder_tests;
pub mod report_tests;

use super::{ReportBuilder, UploadReport};
use crate::app::adapters::memory_store::InMemoryStore;
use crate::app::services::layout_classifier::LayoutClassifier;
use crate::app::services::reconciler::EntityReconciler;
use crate::app::services::row_normalizer::RowNormalizer;
use crate::app::services::tabular_reader::SourceRow;
use crate::app::store::GradeStore;
use crate::config::IngestConfig;
use chrono::{TimeZone, Utc};

/// Run every stage on `data`, apply the changes, and build the report
pub fn report_for(store: &mut InMemoryStore, data: &[&[&str]]) -> UploadReport {
    let config = IngestConfig::default();
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    let layout = LayoutClassifier::new(&config).unwrap().classify(&rows).unwrap();
    let upload = RowNormalizer::new(&config)
        .unwrap()
        .normalize(
            &layout,
            rows.iter().enumerate().skip(layout.data_start).map(|(index, cells)| {
                Ok(SourceRow {
                    line: index + 1,
                    cells: cells.clone(),
                })
            }),
        )
        .unwrap();
    let now = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
    let reconciliation = EntityReconciler::new(&*store, now)
        .reconcile(&upload, None)
        .unwrap();
    store.apply(reconciliation.changes.clone()).unwrap();

    ReportBuilder::new(layout.layout_name.clone()).build(&upload, &reconciliation)
}
