//! Tests for row normalization


use super::{NormalizedUpload, RowNormalizer};
use crate::app::services::layout_classifier::LayoutClassifier;
use crate::app::services::tabular_reader::SourceRow;
use crate::config::IngestConfig;

/// Classify and normalize `data` as one upload
pub fn normalize_with(config: &IngestConfig, data: &[&[&str]]) -> NormalizedUpload {
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    let layout = LayoutClassifier::new(config).unwrap().classify(&rows).unwrap();
    let data_rows = rows
        .iter()
        .enumerate()
        .skip(layout.data_start)
        .map(|(index, cells)| {
            Ok(SourceRow {
                line: index + 1,
                cells: cells.clone(),
            })
        });

    RowNormalizer::new(config)
        .unwrap()
        .normalize(&layout, data_rows)
        .unwrap()
}

/// Normalize with the default configuration
pub fn normalize(data: &[&[&str]]) -> NormalizedUpload {
    normalize_with(&IngestConfig::default(), data)
}
