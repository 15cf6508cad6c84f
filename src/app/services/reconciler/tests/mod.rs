//! Tests for entity reconciliation


use super::{EntityReconciler, Reconciliation};
use crate::app::adapters::memory_store::InMemoryStore;
use crate::app::services::layout_classifier::LayoutClassifier;
use crate::app::services::row_normalizer::{NormalizedUpload, RowNormalizer};
use crate::app::services::tabular_reader::SourceRow;
use crate::app::store::GradeStore;
use crate::config::IngestConfig;
use chrono::{DateTime, TimeZone, Utc};

/// Fixed reconciliation clock
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap()
}

/// Classify and normalize string rows with the default configuration
pub fn normalized(data: &[&[&str]]) -> NormalizedUpload {
    let config = IngestConfig::default();
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    let layout = LayoutClassifier::new(&config).unwrap().classify(&rows).unwrap();
    RowNormalizer::new(&config)
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
        .unwrap()
}

/// Reconcile `data` against `store` and apply the result
pub fn upload(store: &mut InMemoryStore, data: &[&[&str]], tags: &[&str]) -> Reconciliation {
    let upload = normalized(data);
    let outcome = EntityReconciler::new(&*store, now())
        .with_tags(tags.iter().map(|t| t.to_string()).collect())
        .reconcile(&upload, None)
        .unwrap();
    store.apply(outcome.changes.clone()).unwrap();
    outcome
}
