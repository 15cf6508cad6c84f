//! Lazy row iteration over decoded upload text

use super::decoding::{SourceEncoding, decode_text};
use super::delimiter::sniff_delimiter;
use crate::config::DelimiterChoice;
use crate::{Error, Result};
use csv::{ReaderBuilder, StringRecordsIntoIter};
use tracing::debug;

/// Reader over one uploaded file
///
/// Decoding and delimiter selection happen up front; rows are produced lazily
/// by [`TabularReader::rows`].
#[derive(Debug, Clone)]
pub struct TabularReader {
    text: String,
    delimiter: u8,
    encoding: SourceEncoding,
}

impl TabularReader {
    /// Decode `bytes` and settle the delimiter
    ///
    /// Rejects uploads larger than `max_file_size`, undecodable content and
    /// files without any rows.
    pub fn from_bytes(
        bytes: &[u8],
        delimiter: DelimiterChoice,
        max_file_size: usize,
    ) -> Result<Self> {
        if bytes.len() > max_file_size {
            return Err(Error::malformed_file(format!(
                "file is {} bytes, larger than the {} byte limit",
                bytes.len(),
                max_file_size
            )));
        }

        let decoded = decode_text(bytes)?;
        if decoded.text.trim().is_empty() {
            return Err(Error::malformed_file("file contains no rows"));
        }

        let delimiter = delimiter
            .as_byte()
            .unwrap_or_else(|| sniff_delimiter(&decoded.text));

        debug!(
            "Decoded upload as {:?}, delimiter {:?}",
            decoded.encoding, delimiter as char
        );

        Ok(Self {
            text: decoded.text,
            delimiter,
            encoding: decoded.encoding,
        })
    }

    /// Delimiter in use
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Encoding the upload was decoded from
    pub fn encoding(&self) -> SourceEncoding {
        self.encoding
    }

    /// Lazily iterate rows, padding each to the widest row seen so far
    pub fn rows(&self) -> impl Iterator<Item = Result<Vec<String>>> + '_ {
        self.numbered_rows().map(|row| row.map(|row| row.cells))
    }

    /// Like [`TabularReader::rows`], keeping each row's file line number
    ///
    /// Blank lines produce no row but still count towards line numbers.
    pub fn numbered_rows(&self) -> RowIter<'_> {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(self.text.as_bytes());

        RowIter {
            records: reader.into_records(),
            width: 0,
            last_line: 0,
        }
    }
}

/// One row of an upload with its 1-based file line
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    pub line: usize,
    pub cells: Vec<String>,
}

/// Iterator over upload rows
pub struct RowIter<'a> {
    records: StringRecordsIntoIter<&'a [u8]>,
    width: usize,
    last_line: usize,
}

impl Iterator for RowIter<'_> {
    type Item = Result<SourceRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(Error::from(e))),
        };

        let line = record
            .position()
            .map_or(self.last_line + 1, |position| position.line() as usize);
        self.last_line = line;

        let mut cells: Vec<String> = record.iter().map(|cell| cell.to_string()).collect();
        self.width = self.width.max(cells.len());
        cells.resize(self.width, String::new());

        Some(Ok(SourceRow { line, cells }))
    }
}
