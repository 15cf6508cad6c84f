//! Tests for layout classification


use super::{ClassifiedLayout, LayoutClassifier};
use crate::config::IngestConfig;

/// Build string rows from string slices
pub fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
    data.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

/// Classify with the default template and classroom profiles
pub fn classify(data: &[&[&str]]) -> crate::Result<ClassifiedLayout> {
    let classifier = LayoutClassifier::new(&IngestConfig::default()).unwrap();
    classifier.classify(&rows(data))
}
