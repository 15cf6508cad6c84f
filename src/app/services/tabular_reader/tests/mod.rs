//! Tests for the tabular reader


use super::TabularReader;
use crate::config::DelimiterChoice;

/// Read every row of `content` with sniffed delimiter and a generous size limit
pub fn read_all(content: &[u8]) -> crate::Result<Vec<Vec<String>>> {
    let reader = TabularReader::from_bytes(content, DelimiterChoice::Auto, 1024 * 1024)?;
    reader.rows().collect()
}
