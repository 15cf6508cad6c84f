//! Byte to text decoding for uploaded files
//!
//! Spreadsheet exports arrive as UTF-8 (often with a BOM), UTF-16 from some
//! Windows tools, or legacy Latin-1. Decoding tries them in that order.

use crate::{Error, Result};
use encoding_rs::{UTF_16BE, UTF_16LE, WINDOWS_1252};
use tracing::debug;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Encoding the upload was decoded from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    /// Windows-1252 fallback for non-UTF-8 bytes
    Latin1,
}

/// Decoded upload text
#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    pub encoding: SourceEncoding,
}

/// Decode uploaded bytes into text
///
/// Fails with a malformed-file error for empty input and for binary content
/// (NUL bytes without a UTF-16 byte-order mark).
pub fn decode_text(bytes: &[u8]) -> Result<DecodedText> {
    if bytes.is_empty() {
        return Err(Error::malformed_file("file is empty"));
    }

    if let Some(rest) = bytes.strip_prefix(UTF16LE_BOM) {
        return decode_utf16(rest, SourceEncoding::Utf16Le);
    }
    if let Some(rest) = bytes.strip_prefix(UTF16BE_BOM) {
        return decode_utf16(rest, SourceEncoding::Utf16Be);
    }

    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    if body.contains(&0) {
        return Err(Error::malformed_file(
            "file contains binary data and cannot be read as text",
        ));
    }

    match std::str::from_utf8(body) {
        Ok(text) => Ok(DecodedText {
            text: text.to_string(),
            encoding: SourceEncoding::Utf8,
        }),
        Err(e) => {
            debug!("Upload is not valid UTF-8 ({}), decoding as Windows-1252", e);
            let (text, _, _) = WINDOWS_1252.decode(body);
            Ok(DecodedText {
                text: text.into_owned(),
                encoding: SourceEncoding::Latin1,
            })
        }
    }
}

fn decode_utf16(body: &[u8], encoding: SourceEncoding) -> Result<DecodedText> {
    let codec = match encoding {
        SourceEncoding::Utf16Be => UTF_16BE,
        _ => UTF_16LE,
    };

    let (text, had_errors) = codec.decode_without_bom_handling(body);
    if had_errors {
        return Err(Error::malformed_file(format!(
            "file declares {:?} but contains invalid code units",
            encoding
        )));
    }

    Ok(DecodedText {
        text: text.into_owned(),
        encoding,
    })
}
