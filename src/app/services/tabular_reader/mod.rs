//! Tabular reader for uploaded gradebook files
//!
//! Turns raw uploaded bytes into an ordered sequence of rows of string cells.
//! The reader tolerates the quirks of spreadsheet exports: byte-order marks,
//! UTF-16 text, Latin-1 text, and comma, semicolon, tab or pipe delimiters.
//!
//! ## Architecture
//!
//! - [`decoding`] - Byte to text decoding with encoding fallback
//! - [`delimiter`] - Delimiter sniffing
//! - [`reader`] - Lazy row iteration with width alignment
//!
//! ## Usage
//!
//! ```rust
//! use gradebook_ingest::app::services::tabular_reader::TabularReader;
//! use gradebook_ingest::config::DelimiterChoice;
//!
//! # fn example() -> gradebook_ingest::Result<()> {
//! let reader = TabularReader::from_bytes(b"First,Last,Email\n", DelimiterChoice::Auto, 1024)?;
//! for row in reader.rows() {
//!     println!("{:?}", row?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod decoding;
pub mod delimiter;
pub mod reader;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use decoding::{DecodedText, SourceEncoding, decode_text};
pub use delimiter::sniff_delimiter;
pub use reader::{RowIter, SourceRow, TabularReader};
